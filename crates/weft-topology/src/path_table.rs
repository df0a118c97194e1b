//! Canonicalizing table of physical paths.
//!
//! Guarantees a single live [`Path`] handle per (local socket, remote
//! address) key across the whole process, so every peer that happens to
//! traverse the same physical route shares one path object. The table has
//! its own lock, independent of the peer registry; canonicalization never
//! depends on peer identity.

use crate::error::TopologyError;
use crate::path::{Path, PathKey};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};

/// Lazily-populated map from [`PathKey`] to its canonical handle
pub struct PathTable {
    paths: RwLock<HashMap<PathKey, Arc<Path>>>,
}

impl PathTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: RwLock::new(HashMap::new()),
        }
    }

    /// Get the canonical path for a key, creating it on first use
    ///
    /// Fast path: a read-locked lookup. On a miss the write lock is taken
    /// and the key re-checked, since another writer may have created the
    /// entry while this thread waited; only a still-absent key constructs
    /// a new path. Writer contention is therefore bounded to true misses.
    ///
    /// Returns `None` if construction fails (unusable endpoint); the table
    /// is left unchanged and the caller should drop the packet or retry.
    #[must_use]
    pub fn get_path(&self, local_socket: i64, remote: SocketAddr) -> Option<Arc<Path>> {
        let key = PathKey::new(local_socket, remote);

        {
            let paths = self.paths.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = paths.get(&key) {
                return Some(Arc::clone(existing));
            }
        }

        let mut paths = self.paths.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = paths.get(&key) {
            return Some(Arc::clone(existing));
        }
        match Path::new(local_socket, remote) {
            Ok(path) => {
                let path = Arc::new(path);
                paths.insert(key, Arc::clone(&path));
                tracing::trace!(%remote, local_socket, "path created");
                Some(path)
            }
            Err(TopologyError::UnusableEndpoint(addr)) => {
                tracing::debug!(%addr, "path construction refused");
                None
            }
            Err(_) => None,
        }
    }

    /// Number of canonical paths currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the table holds no paths
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop paths the predicate rejects
    ///
    /// Holds only this table's write lock. Handles held elsewhere stay
    /// valid. Returns the number of entries removed.
    pub fn retain_paths<F>(&self, keep: F) -> usize
    where
        F: Fn(&Arc<Path>) -> bool,
    {
        let mut paths = self.paths.write().unwrap_or_else(PoisonError::into_inner);
        let before = paths.len();
        paths.retain(|_, path| keep(path));
        let evicted = before - paths.len();
        if evicted > 0 {
            tracing::debug!(evicted, "stale paths pruned");
        }
        evicted
    }
}

impl Default for PathTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sock(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_same_key_canonicalizes() {
        let table = PathTable::new();
        let remote = sock("203.0.113.5:9993");
        let a = table.get_path(1, remote).unwrap();
        let b = table.get_path(1, remote).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_distinct_keys_distinct_paths() {
        let table = PathTable::new();
        let remote = sock("203.0.113.5:9993");
        let a = table.get_path(1, remote).unwrap();
        let b = table.get_path(2, remote).unwrap();
        let c = table.get_path(1, sock("203.0.113.5:9994")).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_construction_failure_leaves_table_unchanged() {
        let table = PathTable::new();
        assert!(table.get_path(1, sock("0.0.0.0:9993")).is_none());
        assert!(table.get_path(1, sock("10.0.0.1:0")).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_retain_paths() {
        let table = PathTable::new();
        let keep = table.get_path(1, sock("10.0.0.1:9993")).unwrap();
        let drop_me = table.get_path(1, sock("10.0.0.2:9993")).unwrap();
        keep.record_activity(10_000);

        let evicted = table.retain_paths(|p| p.is_alive(10_500, 1_000));
        assert_eq!(evicted, 1);
        assert_eq!(table.len(), 1);
        // The evicted handle we still hold remains usable.
        assert_eq!(drop_me.local_socket(), 1);
    }

    #[test]
    fn test_concurrent_get_path_single_instance() {
        let table = Arc::new(PathTable::new());
        let remote = sock("198.51.100.7:9993");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || table.get_path(7, remote).unwrap())
            })
            .collect();
        let paths: Vec<Arc<Path>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(table.len(), 1);
        for pair in paths.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
    }
}
