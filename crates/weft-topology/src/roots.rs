//! Root server trust set and latency ranking.
//!
//! Roots are trusted bootstrap/relay peers. Trust is a set of identities;
//! the ranked list is derived from it by resolving each trusted identity
//! against the peer map and sorting by apparent latency. Both live inside
//! the [`PeerRegistry`] lock so trust, ranking, and the peer map can never
//! drift apart.
//!
//! Ranking goes stale as latency estimates drift, so a periodic driver is
//! expected to call [`rank_roots`](PeerRegistry::rank_roots) on a timer.

use crate::identity::Identity;
use crate::peer::Peer;
use crate::registry::PeerRegistry;
use std::sync::Arc;

impl PeerRegistry {
    /// Add an identity to the root trust set
    ///
    /// Takes effect in the ranked list only after the next
    /// [`rank_roots`](PeerRegistry::rank_roots) pass resolves it to a
    /// known peer.
    pub fn add_root(&self, identity: Identity) {
        let mut inner = self.write();
        if inner.roots.insert(identity) {
            tracing::debug!(root = ?identity, "root added");
        }
    }

    /// Remove an identity from the root trust set
    ///
    /// Also drops any matching entry from the ranked list, under the same
    /// write lock, so no window exists where an untrusted peer still ranks.
    /// Returns whether the identity was present.
    pub fn remove_root(&self, identity: &Identity) -> bool {
        let mut inner = self.write();
        let removed = inner.roots.remove(identity);
        if removed {
            inner.ranked_roots.retain(|p| p.identity() != identity);
            tracing::debug!(root = ?identity, "root removed");
        }
        removed
    }

    /// Whether an identity is in the trust set
    ///
    /// Pure membership test; independent of whether the identity currently
    /// resolves to a known peer.
    #[must_use]
    pub fn is_root(&self, identity: &Identity) -> bool {
        self.read().roots.contains(identity)
    }

    /// Re-derive the ranked root list, best first
    ///
    /// Resolves every trusted identity against the peer map (unknown
    /// identities contribute nothing) and sorts ascending by apparent
    /// latency. Unmeasured peers sort last; equal latencies are broken by
    /// address, so the ranking is deterministic across passes and across
    /// nodes holding the same root set. `now` is accepted for signature
    /// stability with the periodic driver; the current metric does not
    /// consume it.
    pub fn rank_roots(&self, _now: i64) {
        let mut inner = self.write();
        let mut ranked: Vec<Arc<Peer>> = inner
            .roots
            .iter()
            .filter_map(|id| inner.peers.get(&id.address()).cloned())
            .collect();
        ranked.sort_by_key(|p| (p.latency_ms(), p.address()));
        tracing::debug!(
            trusted = inner.roots.len(),
            ranked = ranked.len(),
            "roots ranked"
        );
        inner.ranked_roots = ranked;
    }

    /// The current best (lowest-latency) ranked root
    #[must_use]
    pub fn best_root(&self) -> Option<Arc<Peer>> {
        self.read().ranked_roots.first().cloned()
    }

    /// Pick a relay toward `destination`
    ///
    /// Returns the best ranked root regardless of destination: relay
    /// selection does not differentiate by target. Callers wanting
    /// per-destination relay diversity must layer it above this.
    #[must_use]
    pub fn find_relay_to(&self, _now: i64, _destination: &Identity) -> Option<Arc<Peer>> {
        self.read().ranked_roots.first().cloned()
    }

    /// Number of currently ranked roots
    #[must_use]
    pub fn root_count(&self) -> usize {
        self.read().ranked_roots.len()
    }
}
