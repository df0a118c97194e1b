//! Error types for the topology directory.
//!
//! Nothing in this crate is fatal to the process: every failure is local and
//! recoverable by the caller. Absence (peer not found, path lookup miss) is
//! represented by `Option`, never by an error variant.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors returned by topology operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Physical path configuration exceeds the fixed table capacity
    #[error("physical path configuration has {given} entries, capacity is {max}")]
    PolicyCapacityExceeded {
        /// Number of entries supplied
        given: usize,
        /// Maximum the table can hold
        max: usize,
    },

    /// Prefix length does not fit the address family
    #[error("invalid prefix length {given} for a {family_bits}-bit address")]
    InvalidPrefixLength {
        /// Bit width of the address family (32 or 128)
        family_bits: u8,
        /// Prefix length that was supplied
        given: u8,
    },

    /// Remote endpoint cannot back a path (unspecified address or port 0)
    #[error("unusable remote endpoint: {0}")]
    UnusableEndpoint(SocketAddr),
}

/// Convenience result alias for topology operations
pub type Result<T> = std::result::Result<T, TopologyError>;
