//! # Ironhull
//!
//! Commit-reveal verification core for escrowed hidden-board naval
//! matches. Each player proves the honesty of a hidden board without
//! revealing it prematurely; a stake sits in escrow until the outcome
//! is verifiable.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        IRONHULL                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Substrate primitives                     │
//! │  ├── hash.rs     - SHA-256 digests and helpers              │
//! │  ├── clock.rs    - Monotonic logical clock                  │
//! │  └── escrow.rs   - Stake custody capability                 │
//! │                                                             │
//! │  commit/         - Commitment protocol                      │
//! │  ├── merkle.rs   - Salted XOR-then-hash board tree          │
//! │  └── verify.rs   - Proof folding and coordinate binding     │
//! │                                                             │
//! │  game/           - Match lifecycle                          │
//! │  ├── board.rs    - Cells, coordinates, flattening           │
//! │  ├── state.rs    - Authoritative per-match record           │
//! │  ├── events.rs   - Typed event stream                       │
//! │  ├── turn.rs     - Attack/proof cycle, cheat detection      │
//! │  ├── audit.rs    - Endgame full-board audit                 │
//! │  ├── accuse.rs   - Timeout arbitration                      │
//! │  └── registry.rs - Operation surface and settlement         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Protocol Guarantees
//!
//! Every state transition is an atomic, serialized operation against
//! one match record. A bad proof is conclusive: verification failure
//! finishes the match against the submitter with no retry. Escrow
//! moves exactly twice the agreed stake to exactly one winner, and
//! only after all state mutations for that outcome are final.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod commit;
pub mod game;
pub mod error;

// Re-export commonly used types
pub use core::hash::Digest32;
pub use core::clock::{Height, LogicalClock, StepClock};
pub use core::escrow::{Escrow, MemoryEscrow};
pub use commit::merkle::{BoardSalts, BoardTree, CellProof};
pub use commit::verify::{verify_cell_proof, verify_cell_value};
pub use error::GameError;
pub use game::{
    AccuseOutcome, AuditOutcome, Board, Coord, FinishCause, GameEvent, MatchId, MatchPhase,
    MatchRegistry, MatchState, PlayerId, ProofOutcome, Side, ACCUSATION_WINDOW,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
