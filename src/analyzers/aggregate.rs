use crate::analyzers::rank::percentile_ranks;
use crate::analyzers::score::value_score;
use crate::analyzers::types::NeighbourhoodAggregate;
use crate::analyzers::utility::{mean, ratio};
use crate::listing::Listing;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Running per-group state collected in a single pass over the listings.
#[derive(Default)]
struct GroupAccumulator<'a> {
    rows: usize,
    prices: Vec<f64>,
    availability: Vec<f64>,
    minimum_nights: Vec<f64>,
    total_reviews: u64,
    room_types: BTreeSet<&'a str>,
}

impl<'a> GroupAccumulator<'a> {
    fn push(&mut self, listing: &'a Listing) {
        self.rows += 1;

        if let Some(price) = listing.price {
            self.prices.push(price);
        }
        if let Some(days) = listing.availability {
            self.availability.push(f64::from(days));
        }
        if let Some(nights) = listing.minimum_nights {
            self.minimum_nights.push(f64::from(nights));
        }
        self.total_reviews += listing.reviews.unwrap_or(0);
        if let Some(room_type) = listing.room_type.as_deref() {
            self.room_types.insert(room_type);
        }
    }

    fn finish(self, borough: &str, neighbourhood: &str) -> NeighbourhoodAggregate {
        let min_price = self.prices.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let max_price = self.prices.iter().copied().reduce(f64::max).unwrap_or(0.0);

        NeighbourhoodAggregate {
            borough: borough.to_string(),
            neighbourhood: neighbourhood.to_string(),
            avg_price: mean(&self.prices),
            min_price,
            max_price,
            avg_availability: mean(&self.availability),
            total_reviews: self.total_reviews,
            listings: self.rows,
            room_type_diversity: self.room_types.len(),
            avg_minimum_nights: mean(&self.minimum_nights),
            reviews_per_listing: ratio(self.total_reviews as f64, self.rows as f64),
            value_score: 0.0,
            value_percentile: 0.0,
        }
    }
}

/// Aggregates cleaned listings into one [`NeighbourhoodAggregate`] per
/// `(borough, neighbourhood)` pair, then scores and ranks every row.
///
/// Rows come out ordered by borough, then neighbourhood. Sums are reduced in
/// listing order within each group. Listings missing either grouping key are
/// skipped; missing numeric cells are left out of the statistics they feed.
#[tracing::instrument(skip_all, fields(listings = listings.len()))]
pub fn aggregate(listings: &[Listing]) -> Vec<NeighbourhoodAggregate> {
    let mut groups: BTreeMap<(&str, &str), GroupAccumulator> = BTreeMap::new();
    let mut ungrouped = 0usize;

    for listing in listings {
        match listing.group_key() {
            Some(key) => groups.entry(key).or_default().push(listing),
            None => ungrouped += 1,
        }
    }

    if ungrouped > 0 {
        warn!(ungrouped, "Skipped listings without borough or neighbourhood");
    }

    let mut rows: Vec<NeighbourhoodAggregate> = groups
        .into_iter()
        .map(|((borough, neighbourhood), acc)| acc.finish(borough, neighbourhood))
        .collect();

    score(&mut rows);

    debug!(groups = rows.len(), "Neighbourhoods aggregated");
    rows
}

/// Largest `reviews_per_listing` across all rows, 0.0 for an empty table.
pub fn max_reviews_per_listing(rows: &[NeighbourhoodAggregate]) -> f64 {
    rows.iter()
        .map(|r| r.reviews_per_listing)
        .fold(0.0, f64::max)
}

/// Fills `value_score` against the table-wide demand maximum, then
/// `value_percentile` over the same table.
fn score(rows: &mut [NeighbourhoodAggregate]) {
    let max_rpl = max_reviews_per_listing(rows);
    if max_rpl == 0.0 && !rows.is_empty() {
        warn!("No reviews in any neighbourhood, every value score is zero");
    }

    for row in rows.iter_mut() {
        if row.avg_price <= 0.0 {
            warn!(
                borough = %row.borough,
                neighbourhood = %row.neighbourhood,
                "Neighbourhood has no positive price, scoring as zero"
            );
        }
        row.value_score = value_score(
            row.avg_availability,
            row.reviews_per_listing,
            max_rpl,
            row.avg_price,
        );
    }

    let scores: Vec<f64> = rows.iter().map(|r| r.value_score).collect();
    for (row, pct) in rows.iter_mut().zip(percentile_ranks(&scores)) {
        row.value_percentile = pct;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(
        borough: &str,
        neighbourhood: &str,
        price: f64,
        availability: u32,
        reviews: u64,
    ) -> Listing {
        Listing {
            id: None,
            borough: Some(borough.to_string()),
            neighbourhood: Some(neighbourhood.to_string()),
            price: Some(price),
            availability: Some(availability),
            reviews: Some(reviews),
            minimum_nights: Some(1),
            room_type: Some("Entire home/apt".to_string()),
            extra: vec![],
        }
    }

    fn find<'a>(rows: &'a [NeighbourhoodAggregate], n: &str) -> &'a NeighbourhoodAggregate {
        rows.iter().find(|r| r.neighbourhood == n).unwrap()
    }

    #[test]
    fn test_scenario_two_groups() {
        let rows = aggregate(&[
            listing("boroughA", "neigh1", 100.0, 200, 20),
            listing("boroughA", "neigh1", 120.0, 250, 30),
            listing("boroughA", "neigh2", 300.0, 50, 2),
        ]);

        assert_eq!(rows.len(), 2);

        let n1 = find(&rows, "neigh1");
        assert_eq!(n1.avg_price, 110.0);
        assert_eq!(n1.min_price, 100.0);
        assert_eq!(n1.max_price, 120.0);
        assert_eq!(n1.avg_availability, 225.0);
        assert_eq!(n1.total_reviews, 50);
        assert_eq!(n1.listings, 2);
        assert_eq!(n1.reviews_per_listing, 25.0);
        assert!((n1.value_score - 560.3985).abs() < 1e-3);
        assert_eq!(n1.value_percentile, 100.0);

        let n2 = find(&rows, "neigh2");
        assert_eq!(n2.avg_price, 300.0);
        assert_eq!(n2.avg_availability, 50.0);
        assert_eq!(n2.reviews_per_listing, 2.0);
        assert_eq!(n2.listings, 1);
        assert!((n2.value_score - 3.653).abs() < 1e-3);
        assert_eq!(n2.value_percentile, 50.0);
    }

    #[test]
    fn test_reviews_per_listing_exact() {
        let rows = aggregate(&[
            listing("B", "N", 100.0, 10, 10),
            listing("B", "N", 100.0, 10, 0),
            listing("B", "N", 100.0, 10, 5),
        ]);

        assert_eq!(rows[0].reviews_per_listing, 5.0);
    }

    #[test]
    fn test_zero_reviews_everywhere_scores_zero() {
        let rows = aggregate(&[
            listing("A", "x", 50.0, 100, 0),
            listing("A", "y", 70.0, 365, 0),
            listing("B", "z", 90.0, 0, 0),
        ]);

        for row in &rows {
            assert_eq!(row.value_score, 0.0);
            assert!((row.value_percentile - 200.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalizer_is_global_across_boroughs() {
        let rows = aggregate(&[
            listing("A", "busy", 100.0, 365, 100),
            listing("B", "quiet", 100.0, 365, 10),
        ]);

        let quiet = find(&rows, "quiet");
        let expected = value_score(365.0, 10.0, 100.0, 100.0);
        assert_eq!(quiet.value_score, expected);
        assert!((quiet.value_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_neighbourhood_name_in_two_boroughs() {
        let rows = aggregate(&[
            listing("Queens", "Chelsea", 100.0, 10, 1),
            listing("Manhattan", "Chelsea", 200.0, 10, 1),
        ]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].borough, "Manhattan");
        assert_eq!(rows[1].borough, "Queens");
    }

    #[test]
    fn test_room_type_diversity_and_missing_values() {
        let mut a = listing("A", "x", 40.0, 100, 2);
        a.room_type = Some("Private room".to_string());
        let mut b = listing("A", "x", 60.0, 300, 2);
        b.room_type = Some("Shared room".to_string());
        b.minimum_nights = Some(5);
        let mut c = listing("A", "x", 80.0, 0, 2);
        c.room_type = None;
        c.availability = None;
        c.reviews = None;
        let d = listing("A", "x", 100.0, 200, 2);

        let rows = aggregate(&[a, b, c, d]);
        let x = &rows[0];

        assert_eq!(x.room_type_diversity, 3);
        assert_eq!(x.listings, 4);
        assert_eq!(x.avg_availability, 200.0);
        assert_eq!(x.total_reviews, 6);
        assert_eq!(x.reviews_per_listing, 1.5);
        assert_eq!(x.avg_minimum_nights, 2.0);
    }

    #[test]
    fn test_ungrouped_listings_are_skipped() {
        let mut orphan = listing("A", "x", 40.0, 100, 2);
        orphan.borough = None;

        let rows = aggregate(&[orphan, listing("A", "y", 50.0, 100, 1)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].neighbourhood, "y");
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let input = vec![
            listing("A", "x", 33.3, 120, 7),
            listing("A", "x", 71.9, 15, 2),
            listing("B", "y", 250.0, 300, 40),
        ];

        assert_eq!(aggregate(&input), aggregate(&input));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
        assert_eq!(max_reviews_per_listing(&[]), 0.0);
    }
}
