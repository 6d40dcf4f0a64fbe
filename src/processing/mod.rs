//! Record set processing.
//!
//! This module contains the pipeline stages between the sources and the writer:
//! - [`aggregate`] - union of the enabled sources per country
//! - [`dedup`] - exact duplicate removal and IPv4 generalization

mod aggregate;
mod dedup;

// Re-export public functions
pub use aggregate::{aggregate, aggregate_country};
pub use dedup::{drop_exact_duplicates, expand_ipv4};
