//! Listing-level statistics over the cleaned table.

use crate::analyzers::utility::{mean, quantile, sample_stddev};
use crate::listing::Listing;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Five-number summary of nightly prices.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PriceDistribution {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl PriceDistribution {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Headline figures for the whole cleaned dataset.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_listings: usize,
    pub neighbourhoods: usize,
    pub boroughs: usize,
    pub mean_price: f64,
    pub price: PriceDistribution,
    pub price_stddev: f64,
    pub mean_availability: f64,
    pub reviews_per_listing: f64,
    pub most_common_room_type: Option<String>,
    pub total_reviews: u64,
}

impl DatasetSummary {
    pub fn from_listings(listings: &[Listing]) -> Self {
        let mut prices: Vec<f64> = listings.iter().filter_map(|l| l.price).collect();
        prices.sort_by(f64::total_cmp);

        let availability: Vec<f64> = listings
            .iter()
            .filter_map(|l| l.availability.map(f64::from))
            .collect();

        let neighbourhoods: BTreeSet<&str> = listings
            .iter()
            .filter_map(|l| l.neighbourhood.as_deref())
            .collect();
        let boroughs: BTreeSet<&str> = listings
            .iter()
            .filter_map(|l| l.borough.as_deref())
            .collect();

        let total_reviews: u64 = listings.iter().filter_map(|l| l.reviews).sum();
        let mean_price = mean(&prices);

        DatasetSummary {
            total_listings: listings.len(),
            neighbourhoods: neighbourhoods.len(),
            boroughs: boroughs.len(),
            mean_price,
            price: PriceDistribution {
                min: quantile(&prices, 0.0),
                q1: quantile(&prices, 0.25),
                median: quantile(&prices, 0.5),
                q3: quantile(&prices, 0.75),
                max: quantile(&prices, 1.0),
            },
            price_stddev: sample_stddev(&prices, mean_price),
            mean_availability: mean(&availability),
            reviews_per_listing: Self::per_listing(total_reviews, listings.len()),
            most_common_room_type: most_common_room_type(listings),
            total_reviews,
        }
    }

    pub fn per_listing(part: u64, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            part as f64 / total as f64
        }
    }
}

/// Most frequent room type; ties go to the alphabetically first name.
fn most_common_room_type(listings: &[Listing]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for room_type in listings.iter().filter_map(|l| l.room_type.as_deref()) {
        *counts.entry(room_type).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_name, a_count), (b_name, b_count)| {
            a_count.cmp(b_count).then_with(|| b_name.cmp(a_name))
        })
        .map(|(name, _)| name.to_string())
}

/// Listing-level roll-up for one borough.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughBreakdown {
    pub borough: String,
    pub listings: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_availability: f64,
    pub total_reviews: u64,
}

impl BoroughBreakdown {
    /// One entry per borough, sorted by name. Listings without a borough are
    /// left out.
    pub fn from_listings(listings: &[Listing]) -> Vec<Self> {
        let mut by_borough: BTreeMap<&str, Vec<&Listing>> = BTreeMap::new();
        for listing in listings {
            if let Some(borough) = listing.borough.as_deref() {
                by_borough.entry(borough).or_default().push(listing);
            }
        }

        by_borough
            .into_iter()
            .map(|(borough, group)| {
                let prices: Vec<f64> = group.iter().filter_map(|l| l.price).collect();
                let availability: Vec<f64> = group
                    .iter()
                    .filter_map(|l| l.availability.map(f64::from))
                    .collect();

                BoroughBreakdown {
                    borough: borough.to_string(),
                    listings: group.len(),
                    avg_price: mean(&prices),
                    min_price: prices.iter().copied().reduce(f64::min).unwrap_or(0.0),
                    max_price: prices.iter().copied().reduce(f64::max).unwrap_or(0.0),
                    avg_availability: mean(&availability),
                    total_reviews: group.iter().filter_map(|l| l.reviews).sum(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(borough: &str, neighbourhood: &str, price: f64, room_type: &str) -> Listing {
        Listing {
            id: None,
            borough: Some(borough.to_string()),
            neighbourhood: Some(neighbourhood.to_string()),
            price: Some(price),
            availability: Some(100),
            reviews: Some(4),
            minimum_nights: Some(1),
            room_type: Some(room_type.to_string()),
            extra: vec![],
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("Brooklyn", "Bushwick", 50.0, "Private room"),
            listing("Brooklyn", "Bushwick", 70.0, "Entire home/apt"),
            listing("Manhattan", "Harlem", 100.0, "Private room"),
            listing("Manhattan", "Chelsea", 180.0, "Entire home/apt"),
            listing("Queens", "Chelsea", 200.0, "Shared room"),
        ]
    }

    #[test]
    fn test_per_listing_with_zero_total() {
        assert_eq!(DatasetSummary::per_listing(10, 0), 0.0);
        assert_eq!(DatasetSummary::per_listing(10, 4), 2.5);
    }

    #[test]
    fn test_summary_from_listings() {
        let summary = DatasetSummary::from_listings(&sample());

        assert_eq!(summary.total_listings, 5);
        assert_eq!(summary.neighbourhoods, 3);
        assert_eq!(summary.boroughs, 3);
        assert_eq!(summary.mean_price, 120.0);
        assert_eq!(summary.price.min, 50.0);
        assert_eq!(summary.price.q1, 70.0);
        assert_eq!(summary.price.median, 100.0);
        assert_eq!(summary.price.q3, 180.0);
        assert_eq!(summary.price.max, 200.0);
        assert_eq!(summary.price.iqr(), 110.0);
        assert_eq!(summary.total_reviews, 20);
        assert_eq!(summary.reviews_per_listing, 4.0);
        assert_eq!(summary.mean_availability, 100.0);
    }

    #[test]
    fn test_most_common_room_type_tie_breaks_alphabetically() {
        let summary = DatasetSummary::from_listings(&sample());
        assert_eq!(
            summary.most_common_room_type.as_deref(),
            Some("Entire home/apt")
        );
    }

    #[test]
    fn test_summary_empty() {
        let summary = DatasetSummary::from_listings(&[]);
        assert_eq!(summary, DatasetSummary::default());
    }

    #[test]
    fn test_borough_breakdown() {
        let breakdown = BoroughBreakdown::from_listings(&sample());

        assert_eq!(breakdown.len(), 3);
        let brooklyn = &breakdown[0];
        assert_eq!(brooklyn.borough, "Brooklyn");
        assert_eq!(brooklyn.listings, 2);
        assert_eq!(brooklyn.avg_price, 60.0);
        assert_eq!(brooklyn.min_price, 50.0);
        assert_eq!(brooklyn.max_price, 70.0);
        assert_eq!(brooklyn.total_reviews, 8);
        assert_eq!(breakdown[2].borough, "Queens");
    }
}
