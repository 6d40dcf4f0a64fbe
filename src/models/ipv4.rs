//! IPv4 prefix utilities and network splitting for the de-duplication stage.
//!
//! [`NetworkParts`] keeps the base address as written; only dotted bases are
//! touched by host generalization.

use crate::error::{AggregateError, Result};
use std::net::Ipv4Addr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Maximum prefix length accepted for any family.
pub const MAX_IPV6_LENGTH: u8 = 128;

/// Prefix length that single hosts are widened to.
pub const HOST_GENERALIZATION_LENGTH: u8 = 24;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use geo_cidr_aggregate::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32> {
    if len > MAX_LENGTH {
        Err(too_long(len))
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

fn too_long(len: u8) -> AggregateError {
    AggregateError::malformed(&format!("/{len}"), "Network length is too long")
}

/// Network split into base address text and prefix length.
///
/// The base address is kept as written, it is not masked down to the
/// network address and not required to be IPv4.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct NetworkParts {
    pub base: String,
    pub mask: u8,
}

impl NetworkParts {
    /// Split a CIDR string (e.g. "10.0.0.0/24") on its '/' separator.
    pub fn new(network: &str) -> Result<NetworkParts> {
        let (base, mask) = network
            .trim()
            .split_once('/')
            .ok_or_else(|| AggregateError::malformed(network, "missing '/' separator"))?;
        let mask: u8 = mask.trim().parse().map_err(|_| {
            AggregateError::malformed(network, format!("invalid prefix length {mask}"))
        })?;
        if mask > MAX_IPV6_LENGTH {
            return Err(AggregateError::malformed(
                network,
                "Network length is too long",
            ));
        }
        Ok(NetworkParts {
            base: base.trim().to_string(),
            mask,
        })
    }

    /// Dotted bases are IPv4 text, everything else passes through untouched.
    pub fn is_dotted(&self) -> bool {
        self.base.contains('.')
    }

    /// Widen a dotted single host entry to its enclosing /24; other entries are unchanged.
    pub fn generalize(self) -> Result<NetworkParts> {
        if !self.is_dotted() || self.mask != MAX_LENGTH {
            return Ok(self);
        }
        let base = match self.base.parse::<Ipv4Addr>() {
            Ok(addr) => cut_addr(addr, HOST_GENERALIZATION_LENGTH)?.to_string(),
            // non-canonical text such as leading zeros: zero the last octet as written
            Err(_) => match self.base.rsplit_once('.') {
                Some((head, _)) => format!("{head}.0"),
                None => self.base,
            },
        };
        Ok(NetworkParts {
            base,
            mask: HOST_GENERALIZATION_LENGTH,
        })
    }
}

impl std::fmt::Display for NetworkParts {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.mask)
    }
}
