//! Start/end address ranges and their summarization into CIDR blocks.

use super::record::{AddressFamily, CidrRecord};
use crate::error::{AggregateError, Result};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Inclusive start/end range labelled with a country code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRange {
    pub start: IpAddr,
    pub end: IpAddr,
    pub country: String,
}

impl AddressRange {
    /// Parse a range from its text columns.
    pub fn parse(start: &str, end: &str, country: &str) -> Result<AddressRange> {
        let parse = |addr: &str| {
            addr.trim()
                .parse::<IpAddr>()
                .map_err(|_| invalid_range(start, end, format!("invalid address '{addr}'")))
        };
        Ok(AddressRange {
            start: parse(start)?,
            end: parse(end)?,
            country: country.trim().to_string(),
        })
    }

    pub fn family(&self) -> AddressFamily {
        match self.start {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    /// Summarize the range into records that cover it exactly.
    pub fn to_cidr_records(&self) -> Result<Vec<CidrRecord>> {
        Ok(summarize_range(self.start, self.end)?
            .into_iter()
            .map(|net| CidrRecord::from_net(net, &self.country))
            .collect())
    }
}

fn invalid_range(start: impl ToString, end: impl ToString, reason: impl Into<String>) -> AggregateError {
    AggregateError::InvalidRangeError {
        start: start.to_string(),
        end: end.to_string(),
        reason: reason.into(),
    }
}

/// Minimal ordered list of CIDR blocks whose union is exactly `[start, end]`.
///
/// # Examples
/// ```
/// use geo_cidr_aggregate::models::summarize_range;
/// let nets = summarize_range("1.0.0.0".parse().unwrap(), "1.0.0.4".parse().unwrap()).unwrap();
/// let nets: Vec<String> = nets.iter().map(|n| n.to_string()).collect();
/// assert_eq!(nets, vec!["1.0.0.0/30", "1.0.0.4/32"]);
/// ```
pub fn summarize_range(start: IpAddr, end: IpAddr) -> Result<Vec<IpNet>> {
    let (lo, hi, width) = match (start, end) {
        (IpAddr::V4(s), IpAddr::V4(e)) => (u32::from(s) as u128, u32::from(e) as u128, 32),
        (IpAddr::V6(s), IpAddr::V6(e)) => (u128::from(s), u128::from(e), 128),
        _ => return Err(invalid_range(start, end, "address families differ")),
    };
    if lo > hi {
        return Err(invalid_range(start, end, "start is after end"));
    }

    summarize_bits(lo, hi, width)
        .into_iter()
        .map(|(base, prefix)| to_net(base, prefix, width))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| invalid_range(start, end, e.to_string()))
}

/// Greedy summarization over the integer form of the addresses.
///
/// `width` is the address size in bits. Returns (base, prefix length) pairs.
fn summarize_bits(mut lo: u128, hi: u128, width: u32) -> Vec<(u128, u8)> {
    let mut blocks = Vec::new();
    loop {
        let align_bits = lo.trailing_zeros().min(width);
        // floor(log2(hi - lo + 1)), the count only overflows for the whole v6 space
        let span_bits = match (hi - lo).checked_add(1) {
            Some(count) => 127 - count.leading_zeros(),
            None => 128,
        };
        let bits = align_bits.min(span_bits);
        blocks.push((lo, (width - bits) as u8));

        let last = lo + last_offset(bits);
        if last >= hi {
            break;
        }
        lo = last + 1;
    }
    blocks
}

fn last_offset(bits: u32) -> u128 {
    if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

fn to_net(base: u128, prefix: u8, width: u32) -> std::result::Result<IpNet, ipnet::PrefixLenError> {
    if width == 32 {
        Ok(IpNet::V4(Ipv4Net::new(Ipv4Addr::from(base as u32), prefix)?))
    } else {
        Ok(IpNet::V6(Ipv6Net::new(Ipv6Addr::from(base), prefix)?))
    }
}
