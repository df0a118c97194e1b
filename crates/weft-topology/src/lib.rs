//! # Weft Topology
//!
//! The authoritative, concurrency-safe directory an overlay network node
//! uses to track who it knows (peers), how it reaches them (canonical
//! physical paths), and which peers it trusts as bootstrap/relay roots.
//!
//! This crate provides:
//! - Peer registration and lookup with insert-if-absent semantics
//! - Path canonicalization (one live handle per physical route)
//! - Root trust set with latency-based ranking and relay selection
//! - Physical path trust/MTU policy matching
//! - Periodic maintenance with a pluggable retention policy
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Topology (facade)                        │
//! ├──────────────────────────────┬────────────────┬─────────────────┤
//! │    PeerRegistry + roots      │   PathTable    │ PhysicalPath-   │
//! │  peer map ─ trust set ─      │  key → path    │ Policy          │
//! │  ranked roots (one RwLock)   │  (own RwLock)  │ (own RwLock)    │
//! └──────────────────────────────┴────────────────┴─────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Many packet worker threads call in concurrently. Reads (lookups,
//! enumeration, policy scans) take read locks; rare writes (discovery,
//! reconfiguration, maintenance) take write locks. No code path holds two
//! locks at once, and no lock is held across blocking calls - the one
//! documented exception is peer enumeration, whose visitor runs under the
//! read lock and must therefore be non-blocking and non-reentrant.
//!
//! Peer and path handles are reference counted. The directory is one
//! holder among several; removing an entry never invalidates handles held
//! elsewhere.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod identity;
pub mod inet;
pub mod path;
pub mod path_table;
pub mod peer;
pub mod policy;
pub mod registry;
mod roots;
pub mod topology;

pub use error::TopologyError;
pub use identity::{Address, Identity, PUBLIC_KEY_SIZE};
pub use inet::InetPrefix;
pub use path::{Path, PathKey};
pub use path_table::PathTable;
pub use peer::{LATENCY_UNKNOWN, Peer};
pub use policy::{
    MAX_CONFIGURED_PATHS, NO_TRUSTED_PATH, PathInfo, PhysicalPathConfig, PhysicalPathPolicy,
};
pub use registry::PeerRegistry;
pub use topology::{
    ActivityTimeout, PATH_ACTIVITY_TIMEOUT_MS, PEER_ACTIVITY_TIMEOUT_MS, RetentionPolicy, Topology,
};
