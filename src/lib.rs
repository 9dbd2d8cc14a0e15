pub mod analyzers;
pub mod cache;
pub mod config;
pub mod error;
pub mod listing;
pub mod output;
pub mod parser;
pub mod stats;
