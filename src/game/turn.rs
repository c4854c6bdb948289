//! Turn Arbitration
//!
//! Drives the attack/proof cycle. The turn passes to the opponent the
//! moment an attack is declared, not when its proof resolves, so "whose
//! turn to attack" and "whose proof is owed" are tracked separately.
//! A failed proof verification is conclusive misbehavior and finishes
//! the match on the spot.

use crate::commit::merkle::CellProof;
use crate::commit::verify::verify_cell_value;
use crate::core::hash::Digest32;
use crate::error::GameError;
use crate::game::board::{Coord, SHIP_TAG};
use crate::game::events::GameEvent;
use crate::game::state::{FinishCause, MatchPhase, MatchState, PlayerId};

/// Result of a proof submission that was accepted as an operation.
///
/// `CheatDetected` is a successful state transition, not an error: the
/// match is finished and the submitter has lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofOutcome {
    /// The proof verified; game state reflects the claimed result.
    Verified {
        /// Coordinate the proof covered.
        coord: Coord,
        /// True if the claimed value was a ship hit.
        hit: bool,
        /// Prover's ships remaining after this proof.
        ships_remaining: u16,
        /// True if this proof sank the prover's last ship.
        eliminated: bool,
    },
    /// Verification failed; the submitter loses immediately.
    CheatDetected {
        /// The opponent, declared winner.
        winner: PlayerId,
    },
}

/// Declare an attack on an unrevealed coordinate.
///
/// Only the turn holder may attack. Declaring passes the turn to the
/// opponent immediately and clears any outstanding accusation (an
/// active move is proof of life).
pub fn declare_attack(
    state: &mut MatchState,
    caller: PlayerId,
    coord: Coord,
) -> Result<(), GameError> {
    if !matches!(state.phase, MatchPhase::Started | MatchPhase::InProgress) {
        return Err(GameError::WrongPhase { phase: state.phase });
    }
    let side = state.side_of(caller).ok_or(GameError::NotAParticipant)?;
    if state.turn_holder != Some(caller) {
        return Err(GameError::NotYourTurn);
    }
    if !coord.in_bounds(state.board_size) {
        return Err(GameError::OutOfBounds(coord));
    }
    let index = coord.flatten(state.board_size);
    if state.already_attacked(side, index) {
        return Err(GameError::AlreadyAttacked(coord));
    }

    // All checks passed; mutate.
    let defender_side = side.opponent();
    let defender = state
        .player(defender_side)
        .ok_or(GameError::WrongPhase { phase: state.phase })?;

    state.mark_attacked(side, index);
    state.proofs_owed[defender_side.index()].push_back(coord);
    state.turn_holder = Some(defender);
    state.phase = MatchPhase::InProgress;

    if let Some(accusation) = state.accusation.take() {
        state.push_event(GameEvent::AccusationCleared {
            match_id: state.id,
            accused: accusation.accused,
        });
    }

    state.push_event(GameEvent::AttackDeclared {
        match_id: state.id,
        attacker: caller,
        coord,
    });
    Ok(())
}

/// Submit the proof for the oldest attack still owed by the caller.
///
/// The claimed value and revealed salt re-derive the leaf, which is
/// verified against the caller's own registered commitment, bound to
/// the owed coordinate. Claiming the wrong value for a committed cell
/// therefore fails exactly like a tampered path. Ship counters update
/// only on verified hits; a verification failure finishes the match
/// with the caller as loser.
pub fn submit_proof(
    state: &mut MatchState,
    caller: PlayerId,
    claimed_value: u8,
    salt: Digest32,
    siblings: Vec<Digest32>,
) -> Result<ProofOutcome, GameError> {
    if state.phase != MatchPhase::InProgress {
        return Err(GameError::WrongPhase { phase: state.phase });
    }
    let side = state.side_of(caller).ok_or(GameError::NotAParticipant)?;
    if claimed_value > 1 {
        return Err(GameError::BadClaimedValue(claimed_value));
    }
    let coord = *state.proofs_owed[side.index()]
        .front()
        .ok_or(GameError::NoProofOwed)?;
    let root = state
        .commitment(side)
        .ok_or(GameError::WrongPhase { phase: state.phase })?;

    let proof = CellProof {
        leaf_index: coord.flatten(state.board_size),
        siblings,
    };

    if !verify_cell_value(claimed_value, &salt, &proof, coord, state.board_size, &root) {
        // Hard fail, no retry: a bad proof is conclusive evidence of a
        // false commitment or a false claimed result.
        let winner = state
            .opponent_of(caller)
            .ok_or(GameError::NotAParticipant)?;
        state.finish_with_winner(winner, FinishCause::ProofMismatch);
        return Ok(ProofOutcome::CheatDetected { winner });
    }

    state.proofs_owed[side.index()].pop_front();

    let hit = claimed_value == SHIP_TAG;
    let ships_remaining = if hit { state.record_hit(side) } else { state.ships(side) };

    state.push_event(GameEvent::ProofChecked {
        match_id: state.id,
        prover: caller,
        coord,
        hit,
        ships_remaining,
    });

    let eliminated = ships_remaining == 0;
    if eliminated {
        state.finish_pending_audit(caller);
    }

    Ok(ProofOutcome::Verified { coord, hit, ships_remaining, eliminated })
}

// =============================================================================
// TESTS
// =============================================================================
