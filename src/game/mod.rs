//! Match Lifecycle
//!
//! Everything from pairing to settlement.
//!
//! ## Module Structure
//!
//! - `board`: coordinates, cell tags, flattened boards
//! - `state`: the authoritative per-match record
//! - `events`: typed event stream for consumers
//! - `turn`: attack/proof cycle and cheat detection
//! - `audit`: endgame full-board audit
//! - `accuse`: accusation/timeout arbitration
//! - `registry`: external operation surface and settlement

pub mod board;
pub mod state;
pub mod events;
pub mod turn;
pub mod audit;
pub mod accuse;
pub mod registry;

// Re-export key types
pub use board::{Board, Coord, SHIP_TAG, WATER_TAG};
pub use state::{FinishCause, MatchId, MatchPhase, MatchState, PlayerId, Side};
pub use events::GameEvent;
pub use turn::ProofOutcome;
pub use audit::AuditOutcome;
pub use accuse::{AccuseOutcome, ACCUSATION_WINDOW};
pub use registry::MatchRegistry;
