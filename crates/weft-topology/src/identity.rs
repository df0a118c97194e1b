//! Node identity and derived overlay address.
//!
//! An [`Identity`] wraps a node's 32-byte public key. The overlay [`Address`]
//! is derived deterministically from it by hashing the key with BLAKE3 and
//! taking the first eight bytes; two nodes share an address only if they
//! share a public key. The directory treats identities as opaque: it never
//! verifies them, it only compares and hashes them.
//!
//! # Example
//!
//! ```
//! use weft_topology::Identity;
//!
//! let identity = Identity::from_public_key([7u8; 32]);
//! let addr = identity.address();
//! assert_eq!(addr, Identity::from_public_key([7u8; 32]).address());
//! ```

use std::fmt;

/// Size of an identity public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Stable overlay address derived from an identity's public key
///
/// Addresses are the keys of the peer map. Derivation is deterministic, so
/// an address can be recomputed from any copy of the identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u64);

impl Address {
    /// Derive the address for a public key
    #[must_use]
    pub fn from_public_key(public_key: &[u8; PUBLIC_KEY_SIZE]) -> Self {
        let digest = blake3::hash(public_key);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        Self(u64::from_be_bytes(bytes))
    }

    /// Raw address value
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:016x})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Node identity: an opaque, comparable, hashable public key
///
/// The directory stores whatever identity it is handed and treats two
/// identities with equal key bytes as the same node. Cryptographic
/// verification happens elsewhere, before a peer ever reaches [`add`].
///
/// [`add`]: crate::topology::Topology::add_peer
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    public_key: [u8; PUBLIC_KEY_SIZE],
}

impl Identity {
    /// Wrap an existing public key
    #[must_use]
    pub fn from_public_key(public_key: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self { public_key }
    }

    /// The identity's public key bytes
    #[must_use]
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    /// Derive the stable overlay address for this identity
    #[must_use]
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", hex::encode(&self.public_key[..8]))
    }
}
