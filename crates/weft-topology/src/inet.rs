//! Network-prefix matching for physical path policy.
//!
//! [`InetPrefix`] is a CIDR-style address range matcher over
//! [`std::net::IpAddr`]. The physical path policy table uses it to decide
//! which configuration entry applies to a given endpoint. Matching is
//! family-strict: an IPv4 prefix never matches an IPv6 address and vice
//! versa.

use crate::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// An address range expressed as network + prefix length
///
/// Host bits below the prefix are ignored when matching, so
/// `10.1.2.3/8` behaves exactly like `10.0.0.0/8`.
///
/// Deserialization goes through [`InetPrefix::new`], so a config file
/// carrying an out-of-range prefix length is rejected at load time with
/// the same error the constructor returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInetPrefix")]
pub struct InetPrefix {
    network: IpAddr,
    prefix_len: u8,
}

/// Unvalidated wire shape of [`InetPrefix`]
#[derive(Deserialize)]
struct RawInetPrefix {
    network: IpAddr,
    prefix_len: u8,
}

impl TryFrom<RawInetPrefix> for InetPrefix {
    type Error = TopologyError;

    fn try_from(raw: RawInetPrefix) -> Result<Self, Self::Error> {
        Self::new(raw.network, raw.prefix_len)
    }
}

impl InetPrefix {
    /// Create a prefix matcher
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidPrefixLength`] if `prefix_len`
    /// exceeds the address family's bit width (32 for IPv4, 128 for IPv6).
    pub fn new(network: IpAddr, prefix_len: u8) -> Result<Self, TopologyError> {
        let family_bits: u8 = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix_len > family_bits {
            return Err(TopologyError::InvalidPrefixLength {
                family_bits,
                given: prefix_len,
            });
        }
        Ok(Self {
            network,
            prefix_len,
        })
    }

    /// The network address of this prefix
    #[must_use]
    pub fn network(&self) -> IpAddr {
        self.network
    }

    /// The prefix length in bits
    #[must_use]
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Whether `ip` falls inside this range
    ///
    /// Address family mismatch is never a match.
    #[must_use]
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(host)) => {
                let mask = mask_bits_u32(self.prefix_len);
                (u32::from(net) & mask) == (u32::from(host) & mask)
            }
            (IpAddr::V6(net), IpAddr::V6(host)) => {
                let mask = mask_bits_u128(self.prefix_len);
                (u128::from(net) & mask) == (u128::from(host) & mask)
            }
            _ => false,
        }
    }

    /// Whether a socket address's IP falls inside this range
    #[must_use]
    pub fn contains_socket(&self, addr: &SocketAddr) -> bool {
        self.contains(addr.ip())
    }
}

fn mask_bits_u32(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len.min(32)))
    }
}

fn mask_bits_u128(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix_len.min(128)))
    }
}
