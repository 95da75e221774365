// Address classification for outbound fetches
//
// Remote origins are only fetched when every address their host resolves to
// is public. Private, loopback, link-local, unspecified and the listed
// multicast ranges are always blocked; operators can add more ranges.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Ranges no remote fetch may reach
const BUILTIN_BLOCKED_RANGES: &[&str] = &[
    // IPv4
    "0.0.0.0/32",
    "10.0.0.0/8",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "224.0.0.0/24",
    // IPv6
    "::/128",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
    "ff02::/16",
];

/// Represents an IP range (single IP or CIDR network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpRange {
    Single(IpAddr),
    CidrV4 { network: Ipv4Addr, prefix_len: u8 },
    CidrV6 { network: Ipv6Addr, prefix_len: u8 },
}

impl IpRange {
    /// Parse an IP or CIDR string
    pub fn parse(s: &str) -> Result<Self, IpFilterError> {
        let s = s.trim();

        let Some((ip_str, prefix_str)) = s.split_once('/') else {
            let ip = IpAddr::from_str(s).map_err(|_| IpFilterError::InvalidIp(s.to_string()))?;
            return Ok(IpRange::Single(ip));
        };

        let prefix_len: u8 = prefix_str
            .parse()
            .map_err(|_| IpFilterError::InvalidCidr(s.to_string()))?;

        if let Ok(ipv4) = Ipv4Addr::from_str(ip_str) {
            if prefix_len > 32 {
                return Err(IpFilterError::InvalidCidr(s.to_string()));
            }
            Ok(IpRange::CidrV4 {
                network: Ipv4Addr::from(u32::from(ipv4) & v4_mask(prefix_len)),
                prefix_len,
            })
        } else if let Ok(ipv6) = Ipv6Addr::from_str(ip_str) {
            if prefix_len > 128 {
                return Err(IpFilterError::InvalidCidr(s.to_string()));
            }
            Ok(IpRange::CidrV6 {
                network: Ipv6Addr::from(u128::from(ipv6) & v6_mask(prefix_len)),
                prefix_len,
            })
        } else {
            Err(IpFilterError::InvalidIp(ip_str.to_string()))
        }
    }

    /// Check if an IP address matches this range
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (self, ip) {
            (IpRange::Single(range_ip), ip) => range_ip == ip,
            (
                IpRange::CidrV4 {
                    network,
                    prefix_len,
                },
                IpAddr::V4(ipv4),
            ) => u32::from(*ipv4) & v4_mask(*prefix_len) == u32::from(*network),
            (
                IpRange::CidrV6 {
                    network,
                    prefix_len,
                },
                IpAddr::V6(ipv6),
            ) => u128::from(*ipv6) & v6_mask(*prefix_len) == u128::from(*network),
            (IpRange::CidrV4 { .. }, IpAddr::V6(_)) => false,
            (IpRange::CidrV6 { .. }, IpAddr::V4(_)) => false,
        }
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        !0u32 << (32 - prefix_len)
    }
}

fn v6_mask(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        !0u128 << (128 - prefix_len)
    }
}

/// Decides whether an outbound connection to an address is allowed
#[derive(Debug, Clone)]
pub struct AddressPolicy {
    blocked: Vec<IpRange>,
}

impl Default for AddressPolicy {
    fn default() -> Self {
        Self {
            blocked: builtin_ranges(),
        }
    }
}

impl AddressPolicy {
    /// Built-in blocked ranges plus operator-configured extras
    pub fn with_extra_ranges(extra: &[String]) -> Result<Self, IpFilterError> {
        let mut blocked = builtin_ranges();
        for range in extra {
            blocked.push(IpRange::parse(range)?);
        }
        Ok(Self { blocked })
    }

    /// True if the address is routable on the public internet
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are judged by their
    /// embedded IPv4 address.
    pub fn is_public(&self, ip: &IpAddr) -> bool {
        let ip = match ip {
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => IpAddr::V4(v4),
                None => *ip,
            },
            IpAddr::V4(_) => *ip,
        };

        !self.blocked.iter().any(|range| range.contains(&ip))
    }

    /// First non-public address in a resolution result, if any
    pub fn first_blocked<'a>(&self, addresses: &'a [IpAddr]) -> Option<&'a IpAddr> {
        addresses.iter().find(|ip| !self.is_public(ip))
    }
}

fn builtin_ranges() -> Vec<IpRange> {
    BUILTIN_BLOCKED_RANGES
        .iter()
        .filter_map(|range| IpRange::parse(range).ok())
        .collect()
}

/// IP filter errors
#[derive(Debug, thiserror::Error)]
pub enum IpFilterError {
    #[error("Invalid IP address: {0}")]
    InvalidIp(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),
}
