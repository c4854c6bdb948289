//! Endgame Audit
//!
//! When elimination finishes a match, the provisional loser must reveal
//! their complete un-salted board. The audit validates the revealed
//! board's size and ship count against what was committed at creation.
//!
//! The revealed cells are NOT re-derived against the Merkle commitment;
//! a board inconsistent with earlier per-cell proofs passes as long as
//! its size and ship count line up. That gap exists in the upstream
//! protocol and is preserved here unchanged.

use crate::error::GameError;
use crate::game::board::count_ship_cells;
use crate::game::state::{AuditFailure, FinishCause, MatchState, PlayerId};

/// Outcome of a full-board audit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuditOutcome {
    /// Confirmed final winner.
    pub winner: PlayerId,
    /// Why the match is recorded as finished.
    pub cause: FinishCause,
}

/// Validate the provisional loser's revealed board and confirm the
/// final winner.
///
/// Checks, in order:
/// 1. `cells.len() == board_size²`: a size mismatch is a board-size
///    cheat,
/// 2. ship-tagged cell count `>= ship_target`: fewer than committed is
///    a ship-count cheat.
///
/// Either failure confirms the provisional loser with an audit cause;
/// both passing confirms the provisional winner with cause
/// "all ships sunk". The match record becomes settleable either way.
pub fn submit_board_for_audit(
    state: &mut MatchState,
    caller: PlayerId,
    cells: &[u8],
) -> Result<AuditOutcome, GameError> {
    if !state.audit_pending() {
        return Err(GameError::AuditNotAwaited);
    }
    let provisional_loser = state
        .finish
        .and_then(|f| f.provisional_loser)
        .ok_or(GameError::AuditNotAwaited)?;
    if caller != provisional_loser {
        return Err(GameError::AuditNotAwaited);
    }
    let winner = state
        .opponent_of(caller)
        .ok_or(GameError::AuditNotAwaited)?;

    let expected_len = (state.board_size as usize) * (state.board_size as usize);
    let cause = if cells.len() != expected_len {
        FinishCause::BoardAudit(AuditFailure::BoardSize)
    } else if count_ship_cells(cells) < state.ship_target as usize {
        FinishCause::BoardAudit(AuditFailure::ShipCount)
    } else {
        FinishCause::AllShipsSunk
    };

    // Both branches confirm the same winner; only the cause differs.
    state.finish_with_winner(winner, cause);
    Ok(AuditOutcome { winner, cause })
}

// =============================================================================
// TESTS
// =============================================================================
