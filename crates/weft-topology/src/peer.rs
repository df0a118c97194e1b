//! Shared peer handle.
//!
//! A [`Peer`] represents a remote participant in the overlay. The directory
//! stores peers behind [`Arc`](std::sync::Arc) and only manages their
//! existence and lookup; all mutable per-peer state (latency estimate,
//! activity stamp) lives in atomics inside the peer itself, so holders can
//! update it without touching any directory lock.

use crate::identity::{Address, Identity};
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

/// Sentinel latency meaning "no estimate yet"
///
/// Sorts after every real estimate, so unmeasured roots rank last.
pub const LATENCY_UNKNOWN: u32 = u32::MAX;

/// A remote overlay participant
///
/// Cheap to share: clone the surrounding `Arc`, never the peer itself.
/// Two peers with equal addresses are interchangeable as far as the
/// directory is concerned.
pub struct Peer {
    identity: Identity,
    address: Address,
    latency_ms: AtomicU32,
    last_receive: AtomicI64,
}

impl Peer {
    /// Create a peer for a verified identity
    ///
    /// The address is derived once and cached; lookups on the hot path
    /// never re-hash the public key. `now` (monotonic milliseconds)
    /// stamps creation as the initial activity time, so a peer added
    /// right before a maintenance sweep is not already stale.
    #[must_use]
    pub fn new(identity: Identity, now: i64) -> Self {
        let address = identity.address();
        Self {
            identity,
            address,
            latency_ms: AtomicU32::new(LATENCY_UNKNOWN),
            last_receive: AtomicI64::new(now),
        }
    }

    /// The peer's identity
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The peer's stable overlay address
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current apparent latency in milliseconds
    ///
    /// [`LATENCY_UNKNOWN`] until the first measurement arrives.
    #[must_use]
    pub fn latency_ms(&self) -> u32 {
        self.latency_ms.load(Ordering::Relaxed)
    }

    /// Record a fresh round-trip latency measurement
    pub fn record_latency(&self, millis: u32) {
        self.latency_ms.store(millis, Ordering::Relaxed);
    }

    /// Record packet receipt at `now` (monotonic milliseconds)
    pub fn record_receive(&self, now: i64) {
        self.last_receive.store(now, Ordering::Relaxed);
    }

    /// Timestamp of the last received packet, creation time if none yet
    #[must_use]
    pub fn last_receive(&self) -> i64 {
        self.last_receive.load(Ordering::Relaxed)
    }

    /// Whether the peer has been heard from within `timeout_ms` of `now`
    #[must_use]
    pub fn is_alive(&self, now: i64, timeout_ms: i64) -> bool {
        now - self.last_receive() <= timeout_ms
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("address", &self.address)
            .field("latency_ms", &self.latency_ms())
            .field("last_receive", &self.last_receive())
            .finish()
    }
}
