//! Commitment Protocol
//!
//! Merkle board commitments and per-cell proof verification.
//!
//! - `merkle`: salted leaf construction, XOR-then-hash tree build,
//!   inclusion proof generation
//! - `verify`: sibling-path folding and coordinate binding

pub mod merkle;
pub mod verify;

// Re-export key types
pub use merkle::{BoardSalts, BoardTree, CellProof, CommitError, leaf_hash};
pub use verify::{fold_proof, verify_cell_proof, verify_cell_value};
