//! Neighbourhood aggregation and value scoring.
//!
//! This module groups cleaned listings by borough and neighbourhood,
//! computes per-group statistics, scores each group against the busiest
//! neighbourhood in the dataset, and ranks the scores as percentiles.

pub mod aggregate;
pub mod analyzer;
pub mod insights;
pub mod rank;
pub mod score;
pub mod types;
pub mod utility;
pub mod view;
