//! Error Taxonomy
//!
//! Precondition violations surface here and leave state untouched; the
//! caller corrects its input and retries. Conclusive misbehavior (bad
//! proof, failed audit) and liveness failure (timeout) are NOT errors:
//! they are authoritative match-finishing transitions reported through
//! operation outcomes and [`crate::game::events::GameEvent`].

use thiserror::Error;

use crate::core::escrow::EscrowError;
use crate::game::board::Coord;
use crate::game::state::{MatchId, MatchPhase};

/// A rejected operation. No state change occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No match with this identifier.
    #[error("unknown match {0}")]
    UnknownMatch(MatchId),

    /// No joinable match exists right now.
    #[error("no open match to join")]
    NoOpenMatch,

    /// The match already has two players.
    #[error("match {0} is not joinable")]
    NotJoinable(MatchId),

    /// A player cannot occupy both seats.
    #[error("cannot join a match you created")]
    SelfJoin,

    /// Caller holds no seat in this match.
    #[error("caller is not a participant in this match")]
    NotAParticipant,

    /// Operation is invalid in the match's current phase.
    #[error("operation not allowed in phase {phase:?}")]
    WrongPhase {
        /// Phase the match is actually in.
        phase: MatchPhase,
    },

    /// Board size must be a positive integer.
    #[error("board size must be positive")]
    ZeroBoardSize,

    /// Ship target must be positive and fit on the board.
    #[error("ship target {ship_target} invalid for board size {board_size}")]
    BadShipTarget {
        /// Requested ship target.
        ship_target: u16,
        /// Board side length.
        board_size: u16,
    },

    /// Stake amounts must be positive.
    #[error("stake must be positive")]
    ZeroStake,

    /// The pot for this stake would not fit in the settlement amount.
    #[error("stake {0} is too large to settle")]
    StakeTooLarge(u64),

    /// Accepting requires an outstanding proposal.
    #[error("no stake proposal outstanding")]
    NoStakeProposal,

    /// The proposer cannot accept their own proposal.
    #[error("proposer cannot accept their own stake proposal")]
    ProposerCannotAccept,

    /// The stake handshake already completed.
    #[error("stake already agreed")]
    StakeAlreadyAgreed,

    /// Deposits must match the agreed stake exactly.
    #[error("deposit of {got} does not match agreed stake {want}")]
    WrongDepositAmount {
        /// Amount offered.
        got: u64,
        /// Agreed stake.
        want: u64,
    },

    /// This seat already deposited.
    #[error("stake already deposited")]
    AlreadyDeposited,

    /// Commitment requires the caller's deposit first.
    #[error("stake deposit required before committing")]
    DepositRequired,

    /// Commitments are write-once.
    #[error("commitment already registered")]
    CommitmentAlreadySet,

    /// Only the turn holder may attack.
    #[error("not your turn")]
    NotYourTurn,

    /// Attacked coordinate is off the board.
    #[error("coordinate {0} out of bounds")]
    OutOfBounds(Coord),

    /// Each coordinate may be attacked once per side.
    #[error("coordinate {0} was already attacked")]
    AlreadyAttacked(Coord),

    /// Claimed cell values are restricted to 0 (miss) and 1 (hit).
    #[error("claimed value {0} is not a valid cell result")]
    BadClaimedValue(u8),

    /// Caller owes no proof right now.
    #[error("no proof is owed by the caller")]
    NoProofOwed,

    /// The board audit is not awaited, or not from this caller.
    #[error("no board audit is awaited from the caller")]
    AuditNotAwaited,

    /// The caller already has an accusation outstanding.
    #[error("an accusation by the caller is already outstanding")]
    AccusationPending,

    /// The escrow backend rejected a transfer.
    #[error("escrow: {0}")]
    Escrow(#[from] EscrowError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GameError::UnknownMatch(MatchId(9)).to_string(),
            "unknown match 9"
        );
        assert_eq!(
            GameError::WrongDepositAmount { got: 5, want: 10 }.to_string(),
            "deposit of 5 does not match agreed stake 10"
        );
        assert_eq!(
            GameError::OutOfBounds(Coord::new(9, 9)).to_string(),
            "coordinate (9, 9) out of bounds"
        );
    }

    #[test]
    fn test_escrow_error_wraps() {
        let err: GameError = EscrowError::ZeroAmount.into();
        assert_eq!(err.to_string(), "escrow: escrow amount must be positive");
    }
}
