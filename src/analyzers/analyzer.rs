use crate::analyzers::aggregate::{aggregate, max_reviews_per_listing};
use crate::analyzers::types::NeighbourhoodAggregate;
use crate::config::ColumnMapping;
use crate::error::Result;
use crate::listing::{Listing, clean};
use crate::parser::load_listings;
use std::path::Path;
use tracing::info;

/// Result of one load: the cleaned listings and the scored aggregate table.
///
/// Immutable once built; filtered views borrow from it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub listings: Vec<Listing>,
    pub neighbourhoods: Vec<NeighbourhoodAggregate>,
    pub max_reviews_per_listing: f64,
}

impl Analysis {
    /// Cleans raw listings and aggregates them.
    pub fn from_listings(raw: Vec<Listing>) -> Self {
        let listings = clean(raw);
        let neighbourhoods = aggregate(&listings);
        let max_reviews_per_listing = max_reviews_per_listing(&neighbourhoods);

        Self {
            listings,
            neighbourhoods,
            max_reviews_per_listing,
        }
    }
}

/// Loads, cleans and aggregates the listing file at `path`.
pub fn analyze(path: impl AsRef<Path>, mapping: &ColumnMapping) -> Result<Analysis> {
    let raw = load_listings(path, mapping)?;
    let analysis = Analysis::from_listings(raw);

    info!(
        listings = analysis.listings.len(),
        neighbourhoods = analysis.neighbourhoods.len(),
        max_reviews_per_listing = analysis.max_reviews_per_listing,
        "Analysis complete"
    );
    Ok(analysis)
}
