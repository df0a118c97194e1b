//! Physical path trust and MTU policy.
//!
//! A small, fixed-capacity table of network-prefix overrides, consulted on
//! every inbound and outbound path decision. Lookup is a linear first-match
//! scan in insertion order, so order determines precedence among
//! overlapping ranges. That trade-off is deliberate: the table is tiny,
//! reconfigured rarely, and read constantly.
//!
//! Trusted path id 0 is reserved to mean "no trusted path" and never
//! matches an inbound trust check.

use crate::error::TopologyError;
use crate::inet::InetPrefix;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{PoisonError, RwLock};

/// Maximum number of configurable physical path entries
pub const MAX_CONFIGURED_PATHS: usize = 16;

/// Reserved trusted path id meaning "no trusted path"
pub const NO_TRUSTED_PATH: u64 = 0;

/// One physical path override: an address range and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalPathConfig {
    /// Address range this entry applies to
    pub network: InetPrefix,
    /// MTU to use for endpoints in range
    pub mtu: u32,
    /// Trusted path id, or [`NO_TRUSTED_PATH`] for an MTU-only override
    pub trusted_path_id: u64,
}

/// Parameters resolved for an outbound endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathInfo {
    /// Configured MTU for the matched range
    pub mtu: u32,
    /// Trusted path id for the matched range
    pub trusted_path_id: u64,
}

/// Fixed-capacity first-match table of physical path overrides
pub struct PhysicalPathPolicy {
    entries: RwLock<Vec<PhysicalPathConfig>>,
}

impl PhysicalPathPolicy {
    /// Create a policy with no overrides
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    fn scan<T>(&self, f: impl Fn(&PhysicalPathConfig) -> Option<T>) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().find_map(f)
    }

    /// Atomically replace the whole table
    ///
    /// Entry order is preserved and determines match precedence.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::PolicyCapacityExceeded`] if more than
    /// [`MAX_CONFIGURED_PATHS`] entries are supplied; the previous
    /// configuration stays in effect. Oversized input is rejected rather
    /// than truncated so the active overrides are never a surprise subset
    /// of what the operator supplied.
    pub fn set_configuration(&self, config: &[PhysicalPathConfig]) -> Result<(), TopologyError> {
        if config.len() > MAX_CONFIGURED_PATHS {
            return Err(TopologyError::PolicyCapacityExceeded {
                given: config.len(),
                max: MAX_CONFIGURED_PATHS,
            });
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        entries.extend_from_slice(config);
        tracing::debug!(entries = entries.len(), "physical path policy applied");
        Ok(())
    }

    /// Remove all overrides
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("physical path policy cleared");
    }

    /// Resolve MTU and trust for an outbound endpoint
    ///
    /// First matching entry wins. `None` means no override applies and
    /// the caller keeps its own defaults.
    #[must_use]
    pub fn outbound_path_info(&self, address: &SocketAddr) -> Option<PathInfo> {
        self.scan(|e| {
            e.network.contains_socket(address).then_some(PathInfo {
                mtu: e.mtu,
                trusted_path_id: e.trusted_path_id,
            })
        })
    }

    /// Trusted path id for an outbound endpoint, [`NO_TRUSTED_PATH`] if none
    #[must_use]
    pub fn outbound_path_trust(&self, address: &SocketAddr) -> u64 {
        self.scan(|e| e.network.contains_socket(address).then_some(e.trusted_path_id))
            .unwrap_or(NO_TRUSTED_PATH)
    }

    /// Whether an inbound packet claiming `trusted_path_id` should be trusted
    ///
    /// True only if some entry matches the originating address and carries
    /// exactly this id. Id 0 never matches: it is the reserved "no trust"
    /// value.
    #[must_use]
    pub fn should_trust_inbound(&self, address: &SocketAddr, trusted_path_id: u64) -> bool {
        if trusted_path_id == NO_TRUSTED_PATH {
            return false;
        }
        self.scan(|e| {
            (e.trusted_path_id == trusted_path_id && e.network.contains_socket(address))
                .then_some(())
        })
        .is_some()
    }

    /// Number of configured entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no overrides are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PhysicalPathPolicy {
    fn default() -> Self {
        Self::new()
    }
}
