//! Digest Primitives
//!
//! SHA-256 helpers shared by the commitment scheme, the proof verifier,
//! and salt derivation. All digests are 32 bytes; the order of updates
//! fed to a hasher is significant.

use sha2::{Sha256, Digest};

/// Digest output type (256 bits / 32 bytes)
pub type Digest32 = [u8; 32];

/// Incremental SHA-256 hasher with typed update helpers.
///
/// Used for leaf construction and salt derivation where several
/// heterogeneous values are folded into one digest.
pub struct DigestHasher {
    hasher: Sha256,
}

impl DigestHasher {
    /// Create a new hasher with a domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create a hasher with no domain separator.
    ///
    /// Leaf hashing uses this: the upstream commitment format is the
    /// bare `H(value || salt)` and must stay byte-compatible.
    pub fn bare() -> Self {
        Self { hasher: Sha256::new() }
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u16 value (little-endian).
    #[inline]
    pub fn update_u16(&mut self, value: u16) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a full digest.
    #[inline]
    pub fn update_digest(&mut self, digest: &Digest32) {
        self.hasher.update(digest);
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> Digest32 {
        self.hasher.finalize().into()
    }
}

/// Compute a simple hash of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute hash with a domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash a digest itself.
///
/// The upstream protocol compares roots by hashing both sides
/// (`H(root) == H(computed)`); this helper keeps that form available.
pub fn hash_digest(digest: &Digest32) -> Digest32 {
    hash_bytes(digest)
}

/// XOR two digests byte-wise.
///
/// The sibling-combination step of the commitment tree XORs the two
/// child digests before hashing. Commutative, so no left/right
/// bookkeeping exists anywhere in the proof path.
#[inline]
pub fn xor_digests(a: &Digest32, b: &Digest32) -> Digest32 {
    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = a[i] ^ b[i];
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
