//! Topology facade: one entry point for the whole directory.
//!
//! Composes the peer registry (with its root directory), the canonical
//! path table, and the physical path policy behind a single type that
//! packet workers, the handshake layer, and the periodic driver all share.
//!
//! # Locking discipline
//!
//! Three independent locks (peers+roots, paths, policy) and no code path
//! ever holds two of them at once. Facade methods delegate to exactly one
//! component; maintenance sweeps each structure in turn, releasing one
//! lock before touching the next.

use crate::error::TopologyError;
use crate::identity::{Address, Identity};
use crate::path::Path;
use crate::path_table::PathTable;
use crate::peer::Peer;
use crate::policy::{PathInfo, PhysicalPathConfig, PhysicalPathPolicy};
use crate::registry::PeerRegistry;
use std::net::SocketAddr;
use std::sync::Arc;

/// Peers unheard from for this long are eligible for pruning
pub const PEER_ACTIVITY_TIMEOUT_MS: i64 = 500_000;

/// Paths idle for this long are eligible for pruning
pub const PATH_ACTIVITY_TIMEOUT_MS: i64 = 120_000;

/// Staleness policy consulted by [`Topology::do_periodic_tasks`]
///
/// Implementations must be cheap and non-blocking: predicates run under
/// the write lock of the structure being pruned.
pub trait RetentionPolicy: Send + Sync {
    /// Whether a peer should be kept at `now`
    fn keep_peer(&self, peer: &Peer, now: i64) -> bool;
    /// Whether a path should be kept at `now`
    fn keep_path(&self, path: &Path, now: i64) -> bool;
}

/// Default retention: keep whatever has shown activity recently
#[derive(Debug, Clone, Copy)]
pub struct ActivityTimeout {
    /// Peer staleness window in milliseconds
    pub peer_timeout_ms: i64,
    /// Path staleness window in milliseconds
    pub path_timeout_ms: i64,
}

impl Default for ActivityTimeout {
    fn default() -> Self {
        Self {
            peer_timeout_ms: PEER_ACTIVITY_TIMEOUT_MS,
            path_timeout_ms: PATH_ACTIVITY_TIMEOUT_MS,
        }
    }
}

impl RetentionPolicy for ActivityTimeout {
    fn keep_peer(&self, peer: &Peer, now: i64) -> bool {
        peer.is_alive(now, self.peer_timeout_ms)
    }

    fn keep_path(&self, path: &Path, now: i64) -> bool {
        path.is_alive(now, self.path_timeout_ms)
    }
}

/// The authoritative directory of peers, paths, roots, and path policy
///
/// One instance per node. All methods take `&self` and are safe under
/// concurrent access from packet worker threads; see the crate docs for
/// the consistency guarantees across components.
pub struct Topology {
    identity: Identity,
    peers: PeerRegistry,
    paths: PathTable,
    policy: PhysicalPathPolicy,
    retention: Box<dyn RetentionPolicy>,
}

impl Topology {
    /// Create a topology for the local node's identity
    ///
    /// Uses the default [`ActivityTimeout`] retention policy.
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self::with_retention(identity, Box::new(ActivityTimeout::default()))
    }

    /// Create a topology with a custom retention policy
    #[must_use]
    pub fn with_retention(identity: Identity, retention: Box<dyn RetentionPolicy>) -> Self {
        Self {
            identity,
            peers: PeerRegistry::new(),
            paths: PathTable::new(),
            policy: PhysicalPathPolicy::new(),
            retention,
        }
    }

    /// The local node's identity
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    // ---- peers ----

    /// Add a peer; returns the stored handle (existing entry wins)
    ///
    /// Callers must use the returned handle in place of their candidate.
    pub fn add_peer(&self, peer: Arc<Peer>) -> Arc<Peer> {
        self.peers.add(peer)
    }

    /// Look up a peer by overlay address
    #[must_use]
    pub fn get_peer(&self, address: Address) -> Option<Arc<Peer>> {
        self.peers.get(address)
    }

    /// Resolve an address to an identity, the local node included
    #[must_use]
    pub fn get_identity(&self, address: Address) -> Option<Identity> {
        self.peers.get_identity(&self.identity, address)
    }

    /// Visit every peer; `false` from the visitor stops the walk
    ///
    /// See [`PeerRegistry::each_peer`] for the visitor contract.
    pub fn each_peer<F>(&self, visitor: F)
    where
        F: FnMut(&Arc<Peer>) -> bool,
    {
        self.peers.each_peer(visitor);
    }

    /// Visit every peer with its current-root flag
    ///
    /// See [`PeerRegistry::each_peer_with_root`] for the visitor contract.
    pub fn each_peer_with_root<F>(&self, visitor: F)
    where
        F: FnMut(&Arc<Peer>, bool) -> bool,
    {
        self.peers.each_peer_with_root(visitor);
    }

    /// Snapshot of all current peer handles
    #[must_use]
    pub fn all_peers(&self) -> Vec<Arc<Peer>> {
        self.peers.all_peers()
    }

    /// Number of known peers
    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    // ---- roots ----

    /// Add an identity to the root trust set
    pub fn add_root(&self, identity: Identity) {
        self.peers.add_root(identity);
    }

    /// Remove an identity from the root trust set; true if it was present
    pub fn remove_root(&self, identity: &Identity) -> bool {
        self.peers.remove_root(identity)
    }

    /// Whether an identity is a trusted root
    #[must_use]
    pub fn is_root(&self, identity: &Identity) -> bool {
        self.peers.is_root(identity)
    }

    /// Re-rank roots by apparent latency; driven by the periodic timer
    pub fn rank_roots(&self, now: i64) {
        self.peers.rank_roots(now);
    }

    /// The current best ranked root, if any
    #[must_use]
    pub fn root(&self) -> Option<Arc<Peer>> {
        self.peers.best_root()
    }

    /// Best relay toward `destination` (currently destination-agnostic)
    #[must_use]
    pub fn find_relay_to(&self, now: i64, destination: &Identity) -> Option<Arc<Peer>> {
        self.peers.find_relay_to(now, destination)
    }

    // ---- paths ----

    /// Canonical path for (local socket, remote address), created lazily
    #[must_use]
    pub fn get_path(&self, local_socket: i64, remote: SocketAddr) -> Option<Arc<Path>> {
        self.paths.get_path(local_socket, remote)
    }

    /// Number of canonical paths currently held
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    // ---- physical path policy ----

    /// Atomically replace the physical path override table
    ///
    /// # Errors
    ///
    /// Rejects configurations larger than
    /// [`MAX_CONFIGURED_PATHS`](crate::policy::MAX_CONFIGURED_PATHS)
    /// without touching the active table.
    pub fn set_physical_path_configuration(
        &self,
        config: &[PhysicalPathConfig],
    ) -> Result<(), TopologyError> {
        self.policy.set_configuration(config)
    }

    /// Clear all physical path overrides
    pub fn clear_physical_path_configuration(&self) {
        self.policy.clear();
    }

    /// MTU and trust override for an outbound endpoint, if any
    #[must_use]
    pub fn outbound_path_info(&self, address: &SocketAddr) -> Option<PathInfo> {
        self.policy.outbound_path_info(address)
    }

    /// Trusted path id for an outbound endpoint, 0 if none
    #[must_use]
    pub fn outbound_path_trust(&self, address: &SocketAddr) -> u64 {
        self.policy.outbound_path_trust(address)
    }

    /// Whether an inbound packet claiming a trusted path id is trusted
    #[must_use]
    pub fn should_trust_inbound(&self, address: &SocketAddr, trusted_path_id: u64) -> bool {
        self.policy.should_trust_inbound(address, trusted_path_id)
    }

    // ---- maintenance ----

    /// Prune stale peers and paths per the retention policy
    ///
    /// Invoked by an external timer. Sweeps the peer map first, then the
    /// path table, write-locking one structure at a time; trusted roots
    /// are never pruned, and handles held outside the directory remain
    /// valid after removal. Safe to run concurrently with ranking and
    /// ordinary queries.
    pub fn do_periodic_tasks(&self, now: i64) {
        let peers_evicted = self.peers.retain_peers(|p| self.retention.keep_peer(p, now));
        let paths_evicted = self.paths.retain_paths(|p| self.retention.keep_path(p, now));
        if peers_evicted > 0 || paths_evicted > 0 {
            tracing::debug!(peers_evicted, paths_evicted, now, "periodic maintenance");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(byte: u8) -> Identity {
        Identity::from_public_key([byte; 32])
    }

    fn peer(byte: u8) -> Arc<Peer> {
        Arc::new(Peer::new(identity(byte), 0))
    }

    fn sock(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_get_identity_includes_self() {
        let me = identity(0xEE);
        let topology = Topology::new(me);
        assert_eq!(topology.get_identity(me.address()), Some(me));
        assert_eq!(topology.get_identity(identity(1).address()), None);
    }

    #[test]
    fn test_periodic_tasks_prune_stale_entries() {
        let topology = Topology::with_retention(
            identity(0xEE),
            Box::new(ActivityTimeout {
                peer_timeout_ms: 1_000,
                path_timeout_ms: 1_000,
            }),
        );

        let fresh = topology.add_peer(peer(1));
        let stale = topology.add_peer(peer(2));
        fresh.record_receive(10_000);
        stale.record_receive(2_000);

        let live_path = topology.get_path(1, sock("10.0.0.1:9993")).unwrap();
        let dead_path = topology.get_path(1, sock("10.0.0.2:9993")).unwrap();
        live_path.record_activity(10_000);
        dead_path.record_activity(1_000);

        topology.do_periodic_tasks(10_500);

        assert!(topology.get_peer(fresh.address()).is_some());
        assert!(topology.get_peer(stale.address()).is_none());
        assert_eq!(topology.path_count(), 1);
        // Evicted handles we still hold stay alive.
        assert_eq!(dead_path.remote(), sock("10.0.0.2:9993"));
    }

    #[test]
    fn test_freshly_added_peer_survives_first_sweep() {
        let topology = Topology::with_retention(
            identity(0xEE),
            Box::new(ActivityTimeout {
                peer_timeout_ms: 1_000,
                path_timeout_ms: 1_000,
            }),
        );

        // Added moments before the sweep, never stamped by traffic yet.
        let newcomer = topology.add_peer(Arc::new(Peer::new(identity(1), 9_900)));
        topology.do_periodic_tasks(10_000);
        assert!(topology.get_peer(newcomer.address()).is_some());

        // With no traffic since creation it eventually goes stale.
        topology.do_periodic_tasks(11_000);
        assert!(topology.get_peer(newcomer.address()).is_none());
    }

    #[test]
    fn test_periodic_tasks_spare_roots() {
        let topology = Topology::with_retention(
            identity(0xEE),
            Box::new(ActivityTimeout {
                peer_timeout_ms: 1_000,
                path_timeout_ms: 1_000,
            }),
        );
        let root = topology.add_peer(peer(1));
        topology.add_root(*root.identity());

        // Stale by any measure, but trusted.
        topology.do_periodic_tasks(1_000_000);
        assert!(topology.get_peer(root.address()).is_some());
    }

    #[test]
    fn test_facade_round_trip() {
        let topology = Topology::new(identity(0xEE));
        let p = topology.add_peer(peer(1));
        p.record_latency(25);
        topology.add_root(*p.identity());
        topology.rank_roots(0);

        assert!(Arc::ptr_eq(&topology.root().unwrap(), &p));
        assert!(Arc::ptr_eq(
            &topology.find_relay_to(0, &identity(9)).unwrap(),
            &p
        ));
        assert_eq!(topology.peer_count(), 1);
        assert!(topology.is_root(p.identity()));
    }
}
