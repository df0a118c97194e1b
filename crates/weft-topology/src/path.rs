//! Canonical physical path handle and its composite key.
//!
//! A [`Path`] stands for one physical route: the pair of a local socket
//! identifier and a remote network address. The path table guarantees a
//! single live handle per [`PathKey`], so every peer sending over the same
//! physical route shares the same path object and its bookkeeping.

use crate::error::TopologyError;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};

/// Composite key identifying a physical route
///
/// Equality and hashing cover both fields; the same remote address reached
/// through two different local sockets is two distinct paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathKey {
    /// Local socket identifier, as assigned by the transport layer
    pub local_socket: i64,
    /// Remote endpoint (family + host + port)
    pub remote: SocketAddr,
}

impl PathKey {
    /// Build a key from its parts
    #[must_use]
    pub fn new(local_socket: i64, remote: SocketAddr) -> Self {
        Self {
            local_socket,
            remote,
        }
    }
}

/// A canonical physical route
///
/// Shared by all peers that communicate over the same (local socket,
/// remote address) pair. Activity is stamped by whoever moves packets over
/// the path; the directory only consults it during maintenance.
pub struct Path {
    key: PathKey,
    last_activity: AtomicI64,
}

impl Path {
    /// Construct a path for a usable remote endpoint
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnusableEndpoint`] if the remote address is
    /// unspecified or carries port 0 - such endpoints can never be sent to,
    /// so no table entry should exist for them.
    pub fn new(local_socket: i64, remote: SocketAddr) -> Result<Self, TopologyError> {
        if remote.ip().is_unspecified() || remote.port() == 0 {
            return Err(TopologyError::UnusableEndpoint(remote));
        }
        Ok(Self {
            key: PathKey::new(local_socket, remote),
            last_activity: AtomicI64::new(0),
        })
    }

    /// The key this path is canonicalized under
    #[must_use]
    pub fn key(&self) -> &PathKey {
        &self.key
    }

    /// Local socket identifier
    #[must_use]
    pub fn local_socket(&self) -> i64 {
        self.key.local_socket
    }

    /// Remote endpoint
    #[must_use]
    pub fn remote(&self) -> SocketAddr {
        self.key.remote
    }

    /// Record traffic over this path at `now` (monotonic milliseconds)
    pub fn record_activity(&self, now: i64) {
        self.last_activity.store(now, Ordering::Relaxed);
    }

    /// Timestamp of the last packet over this path, 0 if never
    #[must_use]
    pub fn last_activity(&self) -> i64 {
        self.last_activity.load(Ordering::Relaxed)
    }

    /// Whether traffic was seen within `timeout_ms` of `now`
    #[must_use]
    pub fn is_alive(&self, now: i64, timeout_ms: i64) -> bool {
        now - self.last_activity() <= timeout_ms
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Path")
            .field("local_socket", &self.key.local_socket)
            .field("remote", &self.key.remote)
            .field("last_activity", &self.last_activity())
            .finish()
    }
}
