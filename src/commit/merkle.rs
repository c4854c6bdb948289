//! Board Commitment Tree
//!
//! Binary Merkle tree over a flattened board's salted cell values.
//! Two properties are fixed by the wire protocol and must be reproduced
//! bit-for-bit:
//!
//! - Leaves are the bare `H(cell_value || salt)`, no domain separator.
//! - Internal nodes combine as `H(left XOR right)`, and a node with no
//!   right sibling pairs with itself (duplicate-self padding, never
//!   zero-padding).
//!
//! The XOR combinator is commutative, so proofs carry no left/right
//! flags; positional binding comes from the leaf index check in
//! [`crate::commit::verify`].

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::hash::{Digest32, DigestHasher, hash_bytes, xor_digests};

/// Domain separator for deriving per-cell salts from a seed.
const SALT_DOMAIN: &[u8] = b"IRONHULL_SALT_V1";

/// Errors raised while building a commitment tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// Cannot commit to an empty board.
    #[error("cannot build a commitment over an empty board")]
    EmptyBoard,

    /// Salt count does not cover every cell.
    #[error("salt count {salts} does not match cell count {cells}")]
    SaltCountMismatch {
        /// Number of salts supplied.
        salts: usize,
        /// Number of cells to commit.
        cells: usize,
    },
}

/// Per-cell secret salts for one board commitment.
///
/// Salts must stay secret until the owning cell is proven; the value
/// domain is {0, 1}, so unsalted leaves fall to a two-entry dictionary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardSalts {
    salts: Vec<Digest32>,
}

impl BoardSalts {
    /// Derive independent per-cell salts from a secret seed.
    ///
    /// Each salt is `H(domain || seed || index)`, so the board owner
    /// only stores the seed.
    pub fn from_seed(seed: &[u8], cell_count: usize) -> Self {
        let salts = (0..cell_count)
            .map(|index| {
                let mut hasher = DigestHasher::new(SALT_DOMAIN);
                hasher.update_bytes(seed);
                hasher.update_u32(index as u32);
                hasher.finalize()
            })
            .collect();
        Self { salts }
    }

    /// Reuse one salt for every cell.
    ///
    /// Accepted simplification for non-adversarial and test contexts
    /// only; a single salt exposes the commitment to precomputed
    /// dictionaries over the {0, 1} value domain.
    pub fn uniform(salt: Digest32, cell_count: usize) -> Self {
        Self { salts: vec![salt; cell_count] }
    }

    /// Salt for one flattened cell index.
    pub fn get(&self, index: usize) -> Option<&Digest32> {
        self.salts.get(index)
    }

    /// Number of salts.
    pub fn len(&self) -> usize {
        self.salts.len()
    }

    /// True if no salts are held.
    pub fn is_empty(&self) -> bool {
        self.salts.is_empty()
    }
}

/// Hash one cell into a leaf: bare `H(value || salt)`.
pub fn leaf_hash(value: u8, salt: &Digest32) -> Digest32 {
    let mut hasher = DigestHasher::bare();
    hasher.update_u8(value);
    hasher.update_digest(salt);
    hasher.finalize()
}

/// Combine two sibling digests: `H(left XOR right)`.
#[inline]
pub fn combine(left: &Digest32, right: &Digest32) -> Digest32 {
    hash_bytes(&xor_digests(left, right))
}

/// Commitment tree over one player's board.
///
/// Each commitment owns its own snapshot of every level; nothing is
/// shared or recomputed between the build and later proof queries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardTree {
    /// All tree levels, leaves at index 0, root level last.
    levels: Vec<Vec<Digest32>>,
}

impl BoardTree {
    /// Build the full tree over flattened cell values.
    ///
    /// `cells[i]` is the tag of flattened cell `i` and is hashed with
    /// `salts[i]`. Every internal level pairs nodes left to right,
    /// duplicating the last node of an odd-length level.
    pub fn build(cells: &[u8], salts: &BoardSalts) -> Result<Self, CommitError> {
        if cells.is_empty() {
            return Err(CommitError::EmptyBoard);
        }
        if salts.len() != cells.len() {
            return Err(CommitError::SaltCountMismatch {
                salts: salts.len(),
                cells: cells.len(),
            });
        }

        let leaves: Vec<Digest32> = cells
            .iter()
            .enumerate()
            .map(|(i, &value)| leaf_hash(value, &self_salt(salts, i)))
            .collect();

        let mut levels = vec![leaves];
        while levels.last().map(|l| l.len()).unwrap_or(0) > 1 {
            let current = levels.last().map(Vec::as_slice).unwrap_or(&[]);
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for chunk in current.chunks(2) {
                let left = &chunk[0];
                // Odd leftover pairs with itself
                let right = chunk.get(1).unwrap_or(left);
                next.push(combine(left, right));
            }
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// The committed root digest.
    pub fn root(&self) -> Digest32 {
        // Build guarantees a non-empty final level
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or([0; 32])
    }

    /// Number of leaves (flattened cells).
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(Vec::len).unwrap_or(0)
    }

    /// Leaf digest at a flattened index.
    pub fn leaf(&self, index: usize) -> Option<Digest32> {
        self.levels.first().and_then(|l| l.get(index)).copied()
    }

    /// Inclusion proof for the leaf at `index`.
    ///
    /// Siblings are ordered leaf to root, one per level above the leaf.
    /// Where the walked index has no sibling, the node itself is used,
    /// mirroring the duplicate-self padding at build time.
    pub fn proof(&self, index: usize) -> Option<CellProof> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut siblings = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut current_index = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = current_index ^ 1;
            let sibling = level.get(sibling_index).unwrap_or(&level[current_index]);
            siblings.push(*sibling);
            current_index /= 2;
        }

        Some(CellProof { leaf_index: index, siblings })
    }
}

fn self_salt(salts: &BoardSalts, index: usize) -> Digest32 {
    // Bounds checked by build before leaf hashing starts
    salts.get(index).copied().unwrap_or([0; 32])
}

/// Inclusion proof for one cell.
///
/// No left/right flags: the XOR combinator is order-independent, which
/// is why the verifier must separately bind `leaf_index` to the
/// attacked coordinate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellProof {
    /// Flattened index of the proven cell (`row * board_size + col`).
    pub leaf_index: usize,
    /// Sibling digests, leaf level first.
    pub siblings: Vec<Digest32>,
}

// =============================================================================
// TESTS
// =============================================================================
