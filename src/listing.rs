//! Listing rows and the cleaning pass applied before aggregation.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// A single listing row from the source table.
///
/// Empty cells are `None`. Columns that are not mapped to a semantic field are
/// kept verbatim in `extra` so duplicate detection sees the whole row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub id: Option<String>,
    pub borough: Option<String>,
    pub neighbourhood: Option<String>,
    pub price: Option<f64>,
    pub availability: Option<u32>,
    pub reviews: Option<u64>,
    pub minimum_nights: Option<u32>,
    pub room_type: Option<String>,
    pub extra: Vec<String>,
}

// The parser rejects non-finite prices, so equality is reflexive on loaded rows.
impl Eq for Listing {}

impl Hash for Listing {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.borough.hash(state);
        self.neighbourhood.hash(state);
        // 0.0 and -0.0 compare equal and must hash equal
        self.price
            .map(|p| if p == 0.0 { 0 } else { p.to_bits() })
            .hash(state);
        self.availability.hash(state);
        self.reviews.hash(state);
        self.minimum_nights.hash(state);
        self.room_type.hash(state);
        self.extra.hash(state);
    }
}

impl Listing {
    /// Returns the `(borough, neighbourhood)` grouping key, if both are present.
    pub fn group_key(&self) -> Option<(&str, &str)> {
        Some((self.borough.as_deref()?, self.neighbourhood.as_deref()?))
    }

    fn has_positive_price(&self) -> bool {
        self.price.is_some_and(|p| p > 0.0)
    }
}

/// Drops rows without a strictly positive price, then collapses exact
/// duplicates to their first occurrence. Relative order is preserved.
pub fn clean(listings: Vec<Listing>) -> Vec<Listing> {
    let raw = listings.len();
    let mut seen = HashSet::with_capacity(raw);

    let priced: Vec<Listing> = listings
        .into_iter()
        .filter(Listing::has_positive_price)
        .collect();
    let priced_count = priced.len();

    let cleaned: Vec<Listing> = priced
        .into_iter()
        .filter(|l| seen.insert(l.clone()))
        .collect();

    debug!(
        raw,
        dropped_price = raw - priced_count,
        dropped_duplicates = priced_count - cleaned.len(),
        kept = cleaned.len(),
        "Listings cleaned"
    );

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, price: Option<f64>) -> Listing {
        Listing {
            id: Some(id.to_string()),
            borough: Some("Brooklyn".to_string()),
            neighbourhood: Some("Williamsburg".to_string()),
            price,
            availability: Some(100),
            reviews: Some(3),
            minimum_nights: Some(2),
            room_type: Some("Private room".to_string()),
            extra: vec![],
        }
    }

    #[test]
    fn test_clean_drops_non_positive_and_missing_prices() {
        let rows = vec![
            listing("1", Some(100.0)),
            listing("2", Some(0.0)),
            listing("3", Some(-5.0)),
            listing("4", None),
            listing("5", Some(0.01)),
        ];

        let cleaned = clean(rows);
        let ids: Vec<_> = cleaned.iter().map(|l| l.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["1", "5"]);
    }

    #[test]
    fn test_clean_collapses_duplicates_to_first_occurrence() {
        let a = listing("1", Some(100.0));
        let b = listing("2", Some(80.0));
        let rows = vec![a.clone(), b.clone(), a.clone(), a.clone(), b.clone()];

        let cleaned = clean(rows);
        assert_eq!(cleaned, vec![a, b]);
    }

    #[test]
    fn test_rows_differing_in_extra_columns_are_not_duplicates() {
        let mut a = listing("1", Some(100.0));
        a.extra = vec!["host-a".to_string()];
        let mut b = a.clone();
        b.extra = vec!["host-b".to_string()];

        assert_eq!(clean(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let rows = vec![
            listing("1", Some(100.0)),
            listing("1", Some(100.0)),
            listing("2", Some(0.0)),
            listing("3", Some(55.5)),
        ];

        let once = clean(rows);
        let twice = clean(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_group_key_requires_both_parts() {
        let mut l = listing("1", Some(10.0));
        assert_eq!(l.group_key(), Some(("Brooklyn", "Williamsburg")));

        l.neighbourhood = None;
        assert_eq!(l.group_key(), None);
    }
}
