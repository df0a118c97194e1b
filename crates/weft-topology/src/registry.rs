//! Peer registry: address-keyed storage of shared peer handles.
//!
//! One reader/writer lock guards three structures together: the peer map,
//! the root trust set, and the latency-ranked root list. They must stay
//! mutually consistent (removing a root touches two of them at once), so
//! splitting them across finer locks would reintroduce exactly the races a
//! single guard rules out. Root-side operations live in
//! [`roots`](crate::roots); they share this lock.
//!
//! # Thread safety
//!
//! All operations take `&self` and are safe to call from any number of
//! packet worker threads. Read paths (lookup, enumeration) take the read
//! lock; only insertion, root mutation, ranking, and pruning take the write
//! lock.

use crate::identity::{Address, Identity};
use crate::peer::Peer;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// State guarded by the registry's single lock
///
/// Invariant: `ranked_roots` holds only peers whose identity is in `roots`,
/// and each at most once. `rank_roots` re-derives it wholesale.
pub(crate) struct RegistryInner {
    pub(crate) peers: HashMap<Address, Arc<Peer>>,
    pub(crate) roots: HashSet<Identity>,
    pub(crate) ranked_roots: Vec<Arc<Peer>>,
}

/// Directory of known peers plus the root trust set and ranking
///
/// Stores shared handles only: the registry is one holder among several,
/// and removing a peer here does not destroy it for holders elsewhere.
pub struct PeerRegistry {
    inner: RwLock<RegistryInner>,
}

impl PeerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                peers: HashMap::new(),
                roots: HashSet::new(),
                ranked_roots: Vec::new(),
            }),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a peer, keeping any existing entry for the same address
    ///
    /// First insert wins: if a peer with this address is already present,
    /// the existing handle is returned and the candidate should replace
    /// its own copy with it. The returned handle is always the one the
    /// registry stores.
    pub fn add(&self, peer: Arc<Peer>) -> Arc<Peer> {
        let mut inner = self.write();
        match inner.peers.entry(peer.address()) {
            std::collections::hash_map::Entry::Occupied(existing) => Arc::clone(existing.get()),
            std::collections::hash_map::Entry::Vacant(slot) => {
                tracing::debug!(address = %peer.address(), "peer added");
                Arc::clone(slot.insert(peer))
            }
        }
    }

    /// Look up a peer by address
    #[must_use]
    pub fn get(&self, address: Address) -> Option<Arc<Peer>> {
        self.read().peers.get(&address).cloned()
    }

    /// Resolve an address to an identity, checking the local node first
    ///
    /// Returns `local`'s identity without taking the lock when the address
    /// is our own. Absence is `None`; this never fails.
    #[must_use]
    pub fn get_identity(&self, local: &Identity, address: Address) -> Option<Identity> {
        if address == local.address() {
            return Some(*local);
        }
        self.read().peers.get(&address).map(|p| *p.identity())
    }

    /// Visit every peer; return `false` from the visitor to stop early
    ///
    /// The read lock is held for the entire walk. The visitor must not
    /// call back into the registry (no nested `get`/`add`) and must not
    /// block: the lock is not reentrant and writers stall behind it.
    pub fn each_peer<F>(&self, mut visitor: F)
    where
        F: FnMut(&Arc<Peer>) -> bool,
    {
        let inner = self.read();
        for peer in inner.peers.values() {
            if !visitor(peer) {
                break;
            }
        }
    }

    /// Visit every peer with a flag marking current ranked roots
    ///
    /// Root membership is resolved by handle identity against a snapshot
    /// of the ranked root list taken once before the walk, sorted for
    /// binary search. Same visitor contract as [`each_peer`]: no
    /// re-entry, no blocking, `false` stops.
    ///
    /// [`each_peer`]: PeerRegistry::each_peer
    pub fn each_peer_with_root<F>(&self, mut visitor: F)
    where
        F: FnMut(&Arc<Peer>, bool) -> bool,
    {
        let inner = self.read();
        let mut root_ptrs: Vec<usize> = inner
            .ranked_roots
            .iter()
            .map(|p| Arc::as_ptr(p) as usize)
            .collect();
        root_ptrs.sort_unstable();
        for peer in inner.peers.values() {
            let is_root = root_ptrs
                .binary_search(&(Arc::as_ptr(peer) as usize))
                .is_ok();
            if !visitor(peer, is_root) {
                break;
            }
        }
    }

    /// Snapshot of all current peer handles
    ///
    /// Safe to use after the call returns; no lock is held by the caller.
    #[must_use]
    pub fn all_peers(&self) -> Vec<Arc<Peer>> {
        self.read().peers.values().cloned().collect()
    }

    /// Number of known peers
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().peers.len()
    }

    /// Whether the registry holds no peers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().peers.is_empty()
    }

    /// Drop peers the predicate rejects, sparing trusted roots
    ///
    /// Holds only the peer-side write lock. Handles held elsewhere stay
    /// valid; the registry merely releases its own reference. Returns the
    /// number of entries removed.
    pub fn retain_peers<F>(&self, keep: F) -> usize
    where
        F: Fn(&Arc<Peer>) -> bool,
    {
        let mut inner = self.write();
        let before = inner.peers.len();
        let RegistryInner { peers, roots, .. } = &mut *inner;
        peers.retain(|_, peer| roots.contains(peer.identity()) || keep(peer));
        let evicted = before - inner.peers.len();
        if evicted > 0 {
            tracing::debug!(evicted, "stale peers pruned");
        }
        evicted
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
