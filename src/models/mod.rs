//! Domain models for CIDR aggregation.
//!
//! This module contains the core data structures used throughout the application:
//! - [`CidrRecord`] - network/country row exchanged between all stages
//! - [`AggregatedSet`] - records split by address family
//! - [`AddressRange`] - start/end range and its CIDR summarization
//! - [`NetworkParts`] - network split into base address text and prefix length

mod ipv4;
mod range;
mod record;

// Re-export public types
pub use ipv4::{
    cut_addr, get_cidr_mask, NetworkParts, HOST_GENERALIZATION_LENGTH, MAX_IPV6_LENGTH,
    MAX_LENGTH,
};
pub use range::{summarize_range, AddressRange};
pub use record::{AddressFamily, AggregatedSet, CidrRecord};
