//! Data types produced by the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-neighbourhood metrics, one row per `(borough, neighbourhood)` pair.
///
/// Field order is the column order of the rankings export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighbourhoodAggregate {
    #[serde(rename = "neighbourhood_group")]
    pub borough: String,
    pub neighbourhood: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_availability: f64,
    pub total_reviews: u64,
    pub listings: usize,
    pub room_type_diversity: usize,
    pub avg_minimum_nights: f64,
    pub reviews_per_listing: f64,
    pub value_score: f64,
    pub value_percentile: f64,
}

/// Per-borough roll-up of a (possibly filtered) aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughSummary {
    #[serde(rename = "neighbourhood_group")]
    pub borough: String,
    pub listings: usize,
    pub avg_price: f64,
    pub value_score: f64,
}

/// Headline figures of a filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewKpis {
    pub neighbourhoods: usize,
    pub listings: usize,
    pub mean_avg_price: f64,
    pub mean_avg_availability: f64,
    pub mean_value_score: f64,
}

/// Drill-down for a single borough.
#[derive(Debug, Clone, Serialize)]
pub struct BoroughProfile {
    pub borough: String,
    pub kpis: ViewKpis,
    pub top_by_value: Vec<NeighbourhoodAggregate>,
    pub top_by_listings: Vec<NeighbourhoodAggregate>,
    pub best_value: NeighbourhoodAggregate,
    pub most_expensive: NeighbourhoodAggregate,
}

/// Narrative market figures over a filtered view.
#[derive(Debug, Clone, Serialize)]
pub struct MarketInsights {
    pub best_value: NeighbourhoodAggregate,
    pub worst_value: NeighbourhoodAggregate,
    pub most_expensive: NeighbourhoodAggregate,
    pub most_affordable: NeighbourhoodAggregate,
    pub price_range: f64,
    pub high_demand: Vec<NeighbourhoodAggregate>,
    pub mean_value_score: f64,
    pub premium_value_areas: usize,
    pub price_variation_pct: f64,
}

/// JSON rankings report written by the export command.
#[derive(Debug, Serialize)]
pub struct RankingReport {
    pub generated_at: DateTime<Utc>,
    pub borough: String,
    pub max_reviews_per_listing: f64,
    pub neighbourhoods: Vec<NeighbourhoodAggregate>,
}
