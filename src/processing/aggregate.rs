//! Union of the enabled sources for one country.

use crate::config::CountryConfig;
use crate::error::Result;
use crate::models::{AddressFamily, AggregatedSet, CidrRecord};
use crate::sources::CidrSource;
use colored::Colorize;

/// Concatenate the output of every source for `country`, in source order.
///
/// Duplicates are kept; the first failing source aborts the union.
pub fn aggregate_country(
    sources: &[Box<dyn CidrSource>],
    country: &CountryConfig,
) -> Result<AggregatedSet> {
    let mut aggregated = AggregatedSet::new();
    for source in sources {
        log::info!("Loading {} database", source.name().on_blue());
        let set = source.fetch(country)?;
        log::info!("IPv4 entries found: {}", set.ipv4.len());
        log::info!("IPv6 entries found: {}", set.ipv6.len());
        aggregated.extend(set);
    }
    Ok(aggregated)
}

/// Union restricted to one address family.
pub fn aggregate(
    sources: &[Box<dyn CidrSource>],
    country: &CountryConfig,
    family: AddressFamily,
) -> Result<Vec<CidrRecord>> {
    Ok(aggregate_country(sources, country)?.into_family(family))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;
    use crate::error::AggregateError;

    struct Fixed(Vec<CidrRecord>);

    impl CidrSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(&self, _country: &CountryConfig) -> Result<AggregatedSet> {
            Ok(AggregatedSet::from_records(self.0.clone()))
        }
    }

    struct Failing;

    impl CidrSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, _country: &CountryConfig) -> Result<AggregatedSet> {
            Err(AggregateError::MissingFileError("gone.csv".into()))
        }
    }

    fn iran() -> CountryConfig {
        CountryConfig::new("Iran", "IR", &[SourceKind::Manual])
    }

    #[test]
    fn test_union_keeps_order_and_duplicates() {
        let sources: Vec<Box<dyn CidrSource>> = vec![
            Box::new(Fixed(vec![
                CidrRecord::new("1.0.0.0/30", "IR"),
                CidrRecord::new("2001:db8::/32", "IR"),
            ])),
            Box::new(Fixed(vec![
                CidrRecord::new("5.0.0.0/8", "IR"),
                CidrRecord::new("1.0.0.0/30", "IR"),
            ])),
        ];
        let ipv4 = aggregate(&sources, &iran(), AddressFamily::Ipv4).unwrap();
        assert_eq!(
            ipv4,
            vec![
                CidrRecord::new("1.0.0.0/30", "IR"),
                CidrRecord::new("5.0.0.0/8", "IR"),
                CidrRecord::new("1.0.0.0/30", "IR"),
            ]
        );
        let ipv6 = aggregate(&sources, &iran(), AddressFamily::Ipv6).unwrap();
        assert_eq!(ipv6, vec![CidrRecord::new("2001:db8::/32", "IR")]);
    }

    #[test]
    fn test_source_failure_propagates() {
        let sources: Vec<Box<dyn CidrSource>> = vec![
            Box::new(Fixed(vec![CidrRecord::new("1.0.0.0/30", "IR")])),
            Box::new(Failing),
        ];
        assert!(aggregate_country(&sources, &iran()).is_err());
    }

    #[test]
    fn test_no_sources() {
        assert!(aggregate_country(&[], &iran()).unwrap().is_empty());
    }
}
