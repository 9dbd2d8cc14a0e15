//! Read-only views over the aggregate table: borough filter, sorting and
//! per-borough roll-ups.

use crate::analyzers::types::{BoroughSummary, NeighbourhoodAggregate, ViewKpis};
use crate::analyzers::utility::mean;
use clap::ValueEnum;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Borough selector; `all` (any case) passes every row through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BoroughFilter {
    #[default]
    All,
    Borough(String),
}

impl BoroughFilter {
    pub fn matches(&self, row: &NeighbourhoodAggregate) -> bool {
        match self {
            BoroughFilter::All => true,
            BoroughFilter::Borough(name) => row.borough == *name,
        }
    }
}

impl FromStr for BoroughFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(BoroughFilter::All)
        } else {
            Ok(BoroughFilter::Borough(s.to_string()))
        }
    }
}

impl fmt::Display for BoroughFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoroughFilter::All => f.write_str("All"),
            BoroughFilter::Borough(name) => f.write_str(name),
        }
    }
}

/// Numeric columns of the aggregate table usable as a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortField {
    AvgPrice,
    MinPrice,
    MaxPrice,
    AvgAvailability,
    TotalReviews,
    Listings,
    RoomTypeDiversity,
    AvgMinimumNights,
    ReviewsPerListing,
    ValueScore,
    ValuePercentile,
}

impl SortField {
    pub fn value(self, row: &NeighbourhoodAggregate) -> f64 {
        match self {
            SortField::AvgPrice => row.avg_price,
            SortField::MinPrice => row.min_price,
            SortField::MaxPrice => row.max_price,
            SortField::AvgAvailability => row.avg_availability,
            SortField::TotalReviews => row.total_reviews as f64,
            SortField::Listings => row.listings as f64,
            SortField::RoomTypeDiversity => row.room_type_diversity as f64,
            SortField::AvgMinimumNights => row.avg_minimum_nights,
            SortField::ReviewsPerListing => row.reviews_per_listing,
            SortField::ValueScore => row.value_score,
            SortField::ValuePercentile => row.value_percentile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Rows matching `filter`, in table order.
pub fn filter_by_borough<'a>(
    rows: &'a [NeighbourhoodAggregate],
    filter: &BoroughFilter,
) -> Vec<&'a NeighbourhoodAggregate> {
    rows.iter().filter(|r| filter.matches(r)).collect()
}

/// Stable sort: rows with equal keys keep their relative order.
pub fn sort_rows(rows: &mut [&NeighbourhoodAggregate], field: SortField, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ord = field.value(a).total_cmp(&field.value(b));
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
}

/// The `n` largest rows by `field`, largest first.
pub fn top_n<'a>(
    rows: &[&'a NeighbourhoodAggregate],
    field: SortField,
    n: usize,
) -> Vec<&'a NeighbourhoodAggregate> {
    let mut sorted = rows.to_vec();
    sort_rows(&mut sorted, field, SortOrder::Descending);
    sorted.truncate(n);
    sorted
}

/// First row holding the largest (or smallest) value of `field`.
pub fn extreme<'a>(
    rows: &[&'a NeighbourhoodAggregate],
    field: SortField,
    want: Ordering,
) -> Option<&'a NeighbourhoodAggregate> {
    rows.iter().copied().reduce(|best, row| {
        if field.value(row).total_cmp(&field.value(best)) == want {
            row
        } else {
            best
        }
    })
}

/// Distinct borough names, sorted.
pub fn boroughs(rows: &[NeighbourhoodAggregate]) -> Vec<&str> {
    let mut names: Vec<&str> = rows.iter().map(|r| r.borough.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    names
}

pub fn kpis(rows: &[&NeighbourhoodAggregate]) -> ViewKpis {
    let column = |field: SortField| rows.iter().map(|r| field.value(r)).collect::<Vec<_>>();

    ViewKpis {
        neighbourhoods: rows.len(),
        listings: rows.iter().map(|r| r.listings).sum(),
        mean_avg_price: mean(&column(SortField::AvgPrice)),
        mean_avg_availability: mean(&column(SortField::AvgAvailability)),
        mean_value_score: mean(&column(SortField::ValueScore)),
    }
}

/// Per-borough totals of a view: summed listings, mean `avg_price` and mean
/// `value_score`, ordered by borough.
pub fn borough_summaries(rows: &[&NeighbourhoodAggregate]) -> Vec<BoroughSummary> {
    let mut by_borough: BTreeMap<&str, Vec<&NeighbourhoodAggregate>> = BTreeMap::new();
    for row in rows {
        by_borough.entry(row.borough.as_str()).or_default().push(row);
    }

    by_borough
        .into_iter()
        .map(|(borough, group)| {
            let k = kpis(&group);
            BoroughSummary {
                borough: borough.to_string(),
                listings: k.listings,
                avg_price: k.mean_avg_price,
                value_score: k.mean_value_score,
            }
        })
        .collect()
}
