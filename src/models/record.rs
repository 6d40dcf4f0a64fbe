//! Network-to-country record exchanged between all pipeline stages.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

/// Address family of a network or address string.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Detect the family from the text form: any `:` means IPv6.
    pub fn of(addr: &str) -> AddressFamily {
        if addr.contains(':') {
            AddressFamily::Ipv6
        } else {
            AddressFamily::Ipv4
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "IPv4"),
            AddressFamily::Ipv6 => write!(f, "IPv6"),
        }
    }
}

/// One CSV row: a network in "address/prefix" form and its country code.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CidrRecord {
    #[serde(rename = "Network")]
    pub network: String,
    #[serde(rename = "Country")]
    pub country: String,
}

impl CidrRecord {
    pub fn new(network: impl Into<String>, country: impl Into<String>) -> Self {
        CidrRecord {
            network: network.into(),
            country: country.into(),
        }
    }

    /// Build a record from a parsed network, in canonical text form.
    pub fn from_net(net: IpNet, country: &str) -> Self {
        CidrRecord::new(net.to_string(), country)
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.network)
    }
}

/// Records split by address family, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedSet {
    pub ipv4: Vec<CidrRecord>,
    pub ipv6: Vec<CidrRecord>,
}

impl AggregatedSet {
    pub fn new() -> Self {
        AggregatedSet::default()
    }

    /// Route records into the matching family list.
    pub fn from_records(records: impl IntoIterator<Item = CidrRecord>) -> Self {
        let mut set = AggregatedSet::new();
        for record in records {
            set.push(record);
        }
        set
    }

    pub fn push(&mut self, record: CidrRecord) {
        match record.family() {
            AddressFamily::Ipv4 => self.ipv4.push(record),
            AddressFamily::Ipv6 => self.ipv6.push(record),
        }
    }

    /// Append `other` after the records already held.
    pub fn extend(&mut self, other: AggregatedSet) {
        self.ipv4.extend(other.ipv4);
        self.ipv6.extend(other.ipv6);
    }

    pub fn family(&self, family: AddressFamily) -> &[CidrRecord] {
        match family {
            AddressFamily::Ipv4 => &self.ipv4,
            AddressFamily::Ipv6 => &self.ipv6,
        }
    }

    pub fn into_family(self, family: AddressFamily) -> Vec<CidrRecord> {
        match family {
            AddressFamily::Ipv4 => self.ipv4,
            AddressFamily::Ipv6 => self.ipv6,
        }
    }

    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
