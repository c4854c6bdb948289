//! Proof Verification
//!
//! Folds a claimed leaf up a sibling path with the same XOR-then-hash
//! combinator used at build time and compares against the registered
//! root. Because the combinator is commutative, sibling order cannot
//! bind position; the claimed leaf index must therefore equal the
//! attacked coordinate's flattened index, checked here explicitly.

use crate::commit::merkle::{combine, leaf_hash, CellProof};
use crate::core::hash::{hash_digest, Digest32};
use crate::game::board::Coord;

/// Fold a claimed leaf digest up the sibling path, leaf to root.
pub fn fold_proof(claimed_leaf: &Digest32, siblings: &[Digest32]) -> Digest32 {
    let mut current = *claimed_leaf;
    for sibling in siblings {
        current = combine(&current, sibling);
    }
    current
}

/// Check a folded path against the registered root.
///
/// Compares `H(root)` on both sides, the equality form used by the
/// upstream contract. Equivalent to direct root comparison.
pub fn roots_match(computed: &Digest32, expected: &Digest32) -> bool {
    hash_digest(computed) == hash_digest(expected)
}

/// Sibling-path length implied by a leaf count.
///
/// One sibling per level above the leaves; duplicate-self padding means
/// the height is `ceil(log2(leaf_count))`.
pub fn expected_path_len(leaf_count: usize) -> usize {
    let mut len = 0;
    let mut width = leaf_count;
    while width > 1 {
        width = width.div_ceil(2);
        len += 1;
    }
    len
}

/// Verify a cell proof against a registered commitment.
///
/// `true` only when all of the following hold:
/// 1. the proof's leaf index equals the attacked coordinate's
///    flattened index (positional binding),
/// 2. the path length matches the board's tree height,
/// 3. the path folds from the claimed leaf to the registered root.
///
/// Any `false` is conclusive misbehavior, not a transient failure: the
/// submitter either registered a false commitment or claimed a false
/// result.
pub fn verify_cell_proof(
    claimed_leaf: &Digest32,
    proof: &CellProof,
    coord: Coord,
    board_size: u16,
    expected_root: &Digest32,
) -> bool {
    if proof.leaf_index != coord.flatten(board_size) {
        return false;
    }
    let leaf_count = (board_size as usize) * (board_size as usize);
    if proof.siblings.len() != expected_path_len(leaf_count) {
        return false;
    }
    roots_match(&fold_proof(claimed_leaf, &proof.siblings), expected_root)
}

/// Verify a claimed cell value against a registered commitment.
///
/// Re-derives the leaf as `H(claimed_value || salt)` before folding, so
/// the claimed value is bound to the commitment: flipping it produces a
/// different leaf and the fold cannot reach the registered root. The
/// salt is revealed here, which is safe because the cell's value
/// becomes public with this very proof.
pub fn verify_cell_value(
    claimed_value: u8,
    salt: &Digest32,
    proof: &CellProof,
    coord: Coord,
    board_size: u16,
    expected_root: &Digest32,
) -> bool {
    let leaf = leaf_hash(claimed_value, salt);
    verify_cell_proof(&leaf, proof, coord, board_size, expected_root)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::merkle::{BoardSalts, BoardTree, leaf_hash};
    use proptest::prelude::*;

    fn build_board(size: u16, ship_cells: &[usize]) -> (Vec<u8>, BoardSalts, BoardTree) {
        let n = (size as usize) * (size as usize);
        let mut cells = vec![0u8; n];
        for &i in ship_cells {
            cells[i] = 1;
        }
        let salts = BoardSalts::from_seed(b"verify-test", n);
        let tree = BoardTree::build(&cells, &salts).unwrap();
        (cells, salts, tree)
    }

    #[test]
    fn test_valid_proofs_verify_everywhere() {
        let size = 8u16;
        let (cells, salts, tree) = build_board(size, &[0, 9, 18, 27]);
        let root = tree.root();

        for row in 0..size {
            for col in 0..size {
                let coord = Coord { row, col };
                let index = coord.flatten(size);
                let proof = tree.proof(index).unwrap();
                let leaf = leaf_hash(cells[index], salts.get(index).unwrap());
                assert!(verify_cell_proof(&leaf, &proof, coord, size, &root));
            }
        }
    }

    #[test]
    fn test_valid_proofs_verify_on_odd_board() {
        // 3x3 exercises duplicate-self padding on every level
        let size = 3u16;
        let (cells, salts, tree) = build_board(size, &[4]);
        let root = tree.root();

        for index in 0..9usize {
            let coord = Coord { row: (index / 3) as u16, col: (index % 3) as u16 };
            let proof = tree.proof(index).unwrap();
            let leaf = leaf_hash(cells[index], salts.get(index).unwrap());
            assert!(verify_cell_proof(&leaf, &proof, coord, size, &root));
        }
    }

    #[test]
    fn test_wrong_claimed_leaf_fails() {
        let size = 4u16;
        let (cells, salts, tree) = build_board(size, &[5]);
        let root = tree.root();

        let coord = Coord { row: 1, col: 1 };
        let index = coord.flatten(size);
        let proof = tree.proof(index).unwrap();

        // Leaf for the opposite value does not fold to the root
        let lying_leaf = leaf_hash(1 - cells[index], salts.get(index).unwrap());
        assert!(!verify_cell_proof(&lying_leaf, &proof, coord, size, &root));
    }

    #[test]
    fn test_tampered_sibling_fails() {
        let size = 4u16;
        let (cells, salts, tree) = build_board(size, &[5]);
        let root = tree.root();

        let coord = Coord { row: 0, col: 2 };
        let index = coord.flatten(size);
        let mut proof = tree.proof(index).unwrap();
        proof.siblings[1][0] ^= 0x01;

        let leaf = leaf_hash(cells[index], salts.get(index).unwrap());
        assert!(!verify_cell_proof(&leaf, &proof, coord, size, &root));
    }

    #[test]
    fn test_proof_bound_to_coordinate() {
        let size = 4u16;
        let (cells, salts, tree) = build_board(size, &[5]);
        let root = tree.root();

        // Proof for cell 5 presented for cell 6
        let proof = tree.proof(5).unwrap();
        let leaf = leaf_hash(cells[5], salts.get(5).unwrap());
        assert!(!verify_cell_proof(&leaf, &proof, Coord { row: 1, col: 2 }, size, &root));
    }

    #[test]
    fn test_truncated_path_fails() {
        let size = 4u16;
        let (cells, salts, tree) = build_board(size, &[5]);
        let root = tree.root();

        let coord = Coord { row: 1, col: 1 };
        let index = coord.flatten(size);
        let mut proof = tree.proof(index).unwrap();
        proof.siblings.pop();

        let leaf = leaf_hash(cells[index], salts.get(index).unwrap());
        assert!(!verify_cell_proof(&leaf, &proof, coord, size, &root));
    }

    #[test]
    fn test_flipped_claimed_value_fails() {
        // A value claim is bound to the salted leaf: claiming the
        // opposite value with the honest salt and path must fail.
        let size = 4u16;
        let (cells, salts, tree) = build_board(size, &[5]);
        let root = tree.root();

        let coord = Coord { row: 1, col: 1 };
        let index = coord.flatten(size);
        let proof = tree.proof(index).unwrap();
        let salt = salts.get(index).unwrap();

        assert!(verify_cell_value(cells[index], salt, &proof, coord, size, &root));
        assert!(!verify_cell_value(1 - cells[index], salt, &proof, coord, size, &root));
    }

    #[test]
    fn test_wrong_salt_fails() {
        let size = 4u16;
        let (cells, _, tree) = build_board(size, &[5]);
        let root = tree.root();

        let coord = Coord { row: 1, col: 1 };
        let index = coord.flatten(size);
        let proof = tree.proof(index).unwrap();

        assert!(!verify_cell_value(cells[index], &[0xAB; 32], &proof, coord, size, &root));
    }

    #[test]
    fn test_expected_path_len() {
        assert_eq!(expected_path_len(1), 0);
        assert_eq!(expected_path_len(2), 1);
        assert_eq!(expected_path_len(3), 2);
        assert_eq!(expected_path_len(9), 4);
        assert_eq!(expected_path_len(64), 6);
        assert_eq!(expected_path_len(100), 7);
    }

    proptest! {
        #[test]
        fn prop_single_bit_flip_defeats_proof(
            index in 0usize..64,
            level in 0usize..6,
            byte in 0usize..32,
            bit in 0u8..8,
        ) {
            let size = 8u16;
            let (cells, salts, tree) = build_board(size, &[1, 12, 30, 63]);
            let root = tree.root();

            let coord = Coord { row: (index / 8) as u16, col: (index % 8) as u16 };
            let mut proof = tree.proof(index).unwrap();
            proof.siblings[level][byte] ^= 1 << bit;

            let leaf = leaf_hash(cells[index], salts.get(index).unwrap());
            prop_assert!(!verify_cell_proof(&leaf, &proof, coord, size, &root));
        }

        #[test]
        fn prop_honest_proofs_always_verify(index in 0usize..64) {
            let size = 8u16;
            let (cells, salts, tree) = build_board(size, &[2, 17, 44]);
            let root = tree.root();

            let coord = Coord { row: (index / 8) as u16, col: (index % 8) as u16 };
            let proof = tree.proof(index).unwrap();
            let leaf = leaf_hash(cells[index], salts.get(index).unwrap());
            prop_assert!(verify_cell_proof(&leaf, &proof, coord, size, &root));
        }
    }
}
