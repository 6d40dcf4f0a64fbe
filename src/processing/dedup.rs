//! Duplicate removal and host generalization.
//!
//! Only the IPv4 set goes through [`expand_ipv4`]; the IPv6 set at most has
//! its exact duplicates dropped.

use crate::error::Result;
use crate::models::{CidrRecord, NetworkParts};
use itertools::Itertools;

/// Remove exact (network, country) duplicates, keeping the first occurrence.
pub fn drop_exact_duplicates(records: Vec<CidrRecord>) -> Vec<CidrRecord> {
    records.into_iter().unique().collect()
}

/// Generalize and de-duplicate an IPv4 record set.
///
/// 1. exact duplicates are dropped
/// 2. every dotted /32 becomes the enclosing /24, other bases pass as written
/// 3. per base address only the shortest prefix survives, the first one
///    encountered on a tie
/// 4. the result is sorted by country, stable
///
/// # Returns
/// * `Ok(Vec<CidrRecord>)` - at most one record per base address
/// * `Err` - `MalformedNetworkError` for a network without a valid prefix
pub fn expand_ipv4(records: Vec<CidrRecord>) -> Result<Vec<CidrRecord>> {
    log::info!("-> Dropping duplicates");
    let records = drop_exact_duplicates(records);

    log::info!("-> Converting /32 IPv4 subnets to /24 to be more expansive");
    let mut split: Vec<(NetworkParts, String)> = records
        .into_iter()
        .map(|r| -> Result<(NetworkParts, String)> {
            Ok((NetworkParts::new(&r.network)?.generalize()?, r.country))
        })
        .collect::<Result<_>>()?;

    log::info!("-> Dropping duplicate IPs but with higher subnets");
    // sort_by_key is stable, so ties keep input order
    split.sort_by_key(|(parts, _)| parts.mask);
    let before = split.len();
    let mut expanded: Vec<CidrRecord> = split
        .into_iter()
        .unique_by(|(parts, _)| parts.base.clone())
        .map(|(parts, country)| CidrRecord::new(parts.to_string(), country))
        .collect();
    log::debug!(
        "Dropped {} more specific duplicates",
        before - expanded.len()
    );

    expanded.sort_by(|a, b| a.country.cmp(&b.country));
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AggregateError;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn rec(network: &str, country: &str) -> CidrRecord {
        CidrRecord::new(network, country)
    }

    #[test]
    fn test_host_generalized_to_24() {
        let result = expand_ipv4(vec![rec("203.0.113.5/32", "IR")]).unwrap();
        assert_eq!(result, vec![rec("203.0.113.0/24", "IR")]);
    }

    #[test]
    fn test_least_specific_wins() {
        let result = expand_ipv4(vec![
            rec("198.51.100.0/28", "IR"),
            rec("198.51.100.0/24", "IR"),
        ])
        .unwrap();
        assert_eq!(result, vec![rec("198.51.100.0/24", "IR")]);
    }

    #[test]
    fn test_generalized_host_collides_with_network() {
        let result = expand_ipv4(vec![
            rec("10.0.0.0/25", "CN"),
            rec("10.0.0.77/32", "CN"),
            rec("10.0.0.78/32", "CN"),
        ])
        .unwrap();
        assert_eq!(result, vec![rec("10.0.0.0/24", "CN")]);
    }

    #[test]
    fn test_tie_keeps_first_encountered() {
        let result = expand_ipv4(vec![
            rec("192.0.2.0/24", "RU"),
            rec("192.0.2.0/24", "CN"),
        ])
        .unwrap();
        assert_eq!(result, vec![rec("192.0.2.0/24", "RU")]);
    }

    #[test]
    fn test_sorted_by_country() {
        let result = expand_ipv4(vec![
            rec("5.0.0.0/8", "RU"),
            rec("1.0.0.0/30", "IR"),
            rec("2.0.0.0/16", "CN"),
            rec("3.0.0.0/16", "IR"),
        ])
        .unwrap();
        assert_eq!(
            result,
            vec![
                rec("2.0.0.0/16", "CN"),
                rec("3.0.0.0/16", "IR"),
                rec("1.0.0.0/30", "IR"),
                rec("5.0.0.0/8", "RU"),
            ]
        );
    }

    #[test]
    fn test_exact_duplicates() {
        let records = vec![
            rec("2001:db8::/32", "IR"),
            rec("2001:db8::/32", "CN"),
            rec("2001:db8::/32", "IR"),
        ];
        assert_eq!(
            drop_exact_duplicates(records),
            vec![rec("2001:db8::/32", "IR"), rec("2001:db8::/32", "CN")]
        );
    }

    #[test]
    fn test_missing_separator() {
        let err = expand_ipv4(vec![rec("1.0.0.0/30", "IR"), rec("5.22.0.0", "IR")]).unwrap_err();
        assert!(matches!(err, AggregateError::MalformedNetworkError { .. }));
    }

    #[test]
    fn test_non_dotted_rows_pass_through() {
        let result = expand_ipv4(vec![
            rec("1.0.0.0/30", "IR"),
            rec("2a00::/16", "IR"),
            rec("2a00::/32", "IR"),
            rec("2a00::1/32", "IR"),
        ])
        .unwrap();
        assert_eq!(
            result,
            vec![
                rec("2a00::/16", "IR"),
                rec("1.0.0.0/30", "IR"),
                rec("2a00::1/32", "IR"),
            ]
        );
    }

    #[test]
    fn test_leading_zero_base_kept() {
        let result = expand_ipv4(vec![rec("010.0.0.0/24", "IR")]).unwrap();
        assert_eq!(result, vec![rec("010.0.0.0/24", "IR")]);
    }

    #[test]
    fn test_bad_prefix() {
        let err = expand_ipv4(vec![rec("1.0.0.0/abc", "IR")]).unwrap_err();
        assert!(matches!(err, AggregateError::MalformedNetworkError { .. }));
    }

    fn arb_record() -> impl Strategy<Value = CidrRecord> {
        (
            0u8..3,
            0u8..4,
            prop::sample::select(vec![0u8, 1, 5, 128]),
            prop::sample::select(vec![16u8, 24, 28, 30, 32]),
            prop::sample::select(vec!["IR", "CN", "RU"]),
        )
            .prop_map(|(b, c, d, mask, country)| {
                rec(&format!("10.{b}.{c}.{d}/{mask}"), country)
            })
    }

    proptest! {
        #[test]
        fn test_expand_is_idempotent(records in prop::collection::vec(arb_record(), 0..40)) {
            let once = expand_ipv4(records).unwrap();
            let twice = expand_ipv4(once.clone()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_one_entry_per_address(records in prop::collection::vec(arb_record(), 0..40)) {
            let result = expand_ipv4(records).unwrap();
            let mut seen = HashSet::new();
            for r in &result {
                let parts = NetworkParts::new(&r.network).unwrap();
                prop_assert!(parts.mask != 32);
                prop_assert!(seen.insert(parts.base), "duplicate {}", r.network);
            }
        }
    }
}
