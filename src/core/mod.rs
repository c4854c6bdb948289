//! Core substrate primitives.
//!
//! Hashing, the logical clock, and the escrow capability. Everything in
//! this module is independent of match semantics and fully deterministic.

pub mod hash;
pub mod clock;
pub mod escrow;

// Re-export core types
pub use hash::{Digest32, DigestHasher};
pub use clock::{Height, LogicalClock, StepClock};
pub use escrow::{AccountId, Escrow, EscrowError, MemoryEscrow};
