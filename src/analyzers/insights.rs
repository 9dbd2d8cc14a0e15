use crate::analyzers::types::{BoroughProfile, MarketInsights, NeighbourhoodAggregate};
use crate::analyzers::utility::{mean, quantile, ratio, sample_stddev};
use crate::analyzers::view::{BoroughFilter, SortField, extreme, filter_by_borough, kpis, top_n};
use crate::error::{RaterError, Result};
use std::cmp::Ordering;

/// Rows shown in each borough leaderboard.
const BOROUGH_TOP: usize = 8;
/// Rows shown in the high-demand list.
const HIGH_DEMAND_TOP: usize = 3;

/// Builds the drill-down for one borough of the full aggregate table.
///
/// # Errors
///
/// [`RaterError::UnknownBorough`] if no neighbourhood belongs to `borough`.
pub fn explore_borough(rows: &[NeighbourhoodAggregate], borough: &str) -> Result<BoroughProfile> {
    let view = filter_by_borough(rows, &BoroughFilter::Borough(borough.to_string()));

    let best_value = extreme(&view, SortField::ValueScore, Ordering::Greater)
        .ok_or_else(|| RaterError::UnknownBorough(borough.to_string()))?;
    let most_expensive = extreme(&view, SortField::AvgPrice, Ordering::Greater)
        .ok_or_else(|| RaterError::UnknownBorough(borough.to_string()))?;

    Ok(BoroughProfile {
        borough: borough.to_string(),
        kpis: kpis(&view),
        top_by_value: owned(top_n(&view, SortField::ValueScore, BOROUGH_TOP)),
        top_by_listings: owned(top_n(&view, SortField::Listings, BOROUGH_TOP)),
        best_value: best_value.clone(),
        most_expensive: most_expensive.clone(),
    })
}

/// Market figures for a filtered view. Returns `None` for an empty view.
pub fn market_insights(view: &[&NeighbourhoodAggregate]) -> Option<MarketInsights> {
    let best_value = extreme(view, SortField::ValueScore, Ordering::Greater)?;
    let worst_value = extreme(view, SortField::ValueScore, Ordering::Less)?;
    let most_expensive = extreme(view, SortField::AvgPrice, Ordering::Greater)?;
    let most_affordable = extreme(view, SortField::AvgPrice, Ordering::Less)?;

    let scores: Vec<f64> = view.iter().map(|r| r.value_score).collect();
    let mut sorted_scores = scores.clone();
    sorted_scores.sort_by(f64::total_cmp);
    let q3 = quantile(&sorted_scores, 0.75);

    let prices: Vec<f64> = view.iter().map(|r| r.avg_price).collect();
    let mean_price = mean(&prices);
    let price_variation_pct = ratio(sample_stddev(&prices, mean_price), mean_price) * 100.0;

    Some(MarketInsights {
        best_value: best_value.clone(),
        worst_value: worst_value.clone(),
        most_expensive: most_expensive.clone(),
        most_affordable: most_affordable.clone(),
        price_range: most_expensive.avg_price - most_affordable.avg_price,
        high_demand: owned(top_n(view, SortField::ReviewsPerListing, HIGH_DEMAND_TOP)),
        mean_value_score: mean(&scores),
        premium_value_areas: scores.iter().filter(|&&s| s > q3).count(),
        price_variation_pct,
    })
}

fn owned(rows: Vec<&NeighbourhoodAggregate>) -> Vec<NeighbourhoodAggregate> {
    rows.into_iter().cloned().collect()
}
