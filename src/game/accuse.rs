//! Accusation Arbitration
//!
//! Timeout subsystem for unresponsive opponents. Available from the
//! moment the stake is agreed, so a player whose deposit sits in escrow
//! is never stuck waiting on a vanished counterparty. One accusation
//! may be outstanding per match; its deadline is fixed when first
//! recorded and only progress by the accused (a deposit, a commitment,
//! an attack) clears it. Repeated accusations never extend the
//! deadline; once it passes, the accused forfeits.

use crate::core::clock::Height;
use crate::error::GameError;
use crate::game::events::GameEvent;
use crate::game::state::{Accusation, FinishCause, MatchPhase, MatchState, PlayerId};

/// Forfeiture window in logical clock units (block count in the
/// reference deployment).
pub const ACCUSATION_WINDOW: Height = 20;

/// Result of an accusation call that was accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccuseOutcome {
    /// A new accusation was recorded against the caller's opponent.
    Raised {
        /// Accused player.
        accused: PlayerId,
        /// Height at which forfeiture fires.
        deadline: Height,
    },
    /// An accusation was already outstanding and unexpired; notice was
    /// re-sent without touching the deadline.
    Renewed {
        /// Accused player.
        accused: PlayerId,
        /// The original deadline.
        deadline: Height,
    },
    /// The outstanding deadline had passed; the accused forfeits.
    Forfeited {
        /// Winner by timeout.
        winner: PlayerId,
    },
}

/// Record, renew, or resolve an unresponsiveness accusation.
///
/// - No accusation outstanding: record one against the caller's
///   opponent with `deadline = now + ACCUSATION_WINDOW`.
/// - Outstanding and `now >= deadline`: resolve immediately, the
///   accused forfeits with cause "timeout".
/// - Outstanding, unexpired, caller is the original accuser: rejected,
///   one accusation per accuser at a time.
/// - Outstanding, unexpired, other caller: heartbeat re-notification,
///   deadline untouched.
pub fn accuse(
    state: &mut MatchState,
    caller: PlayerId,
    now: Height,
) -> Result<AccuseOutcome, GameError> {
    if !matches!(
        state.phase,
        MatchPhase::StakeAgreed | MatchPhase::Started | MatchPhase::InProgress
    ) {
        return Err(GameError::WrongPhase { phase: state.phase });
    }
    let opponent = state.opponent_of(caller).ok_or(GameError::NotAParticipant)?;

    match state.accusation {
        None => {
            let deadline = now.saturating_add(ACCUSATION_WINDOW);
            state.accusation = Some(Accusation { accused: opponent, deadline });
            state.push_event(GameEvent::AccusationRaised {
                match_id: state.id,
                accuser: caller,
                accused: opponent,
                deadline,
            });
            Ok(AccuseOutcome::Raised { accused: opponent, deadline })
        }
        Some(Accusation { accused, deadline }) if now >= deadline => {
            // Winner is the accuser's side, i.e. the accused's opponent.
            let winner = state
                .opponent_of(accused)
                .ok_or(GameError::NotAParticipant)?;
            state.finish_with_winner(winner, FinishCause::Timeout);
            Ok(AccuseOutcome::Forfeited { winner })
        }
        Some(Accusation { accused, deadline }) => {
            if accused == opponent {
                // Caller already has this accusation outstanding.
                return Err(GameError::AccusationPending);
            }
            state.push_event(GameEvent::AccusationRenewed {
                match_id: state.id,
                accused,
                deadline,
            });
            Ok(AccuseOutcome::Renewed { accused, deadline })
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{MatchId, Side};

    fn started_match() -> (MatchState, PlayerId, PlayerId) {
        let alice = PlayerId::new([1; 16]);
        let bob = PlayerId::new([2; 16]);
        let mut state = MatchState::new(MatchId(1), alice, 8, 10);
        state.players[1] = Some(bob);
        state.set_commitment(Side::A, [1; 32]);
        state.set_commitment(Side::B, [2; 32]);
        state.phase = MatchPhase::Started;
        state.turn_holder = Some(alice);
        state.take_events();
        (state, alice, bob)
    }

    #[test]
    fn test_first_accusation_fixes_deadline() {
        let (mut state, alice, bob) = started_match();

        let outcome = accuse(&mut state, alice, 100).unwrap();
        assert_eq!(
            outcome,
            AccuseOutcome::Raised { accused: bob, deadline: 100 + ACCUSATION_WINDOW }
        );
        assert_eq!(
            state.accusation,
            Some(Accusation { accused: bob, deadline: 100 + ACCUSATION_WINDOW })
        );
    }

    #[test]
    fn test_same_accuser_rejected_while_pending() {
        let (mut state, alice, _) = started_match();

        accuse(&mut state, alice, 100).unwrap();
        assert_eq!(accuse(&mut state, alice, 105), Err(GameError::AccusationPending));

        // Deadline unchanged by the rejected call
        assert_eq!(state.accusation.unwrap().deadline, 100 + ACCUSATION_WINDOW);
    }

    #[test]
    fn test_counter_accusation_is_heartbeat_not_extension() {
        let (mut state, alice, bob) = started_match();

        accuse(&mut state, alice, 100).unwrap();
        let outcome = accuse(&mut state, bob, 110).unwrap();

        assert_eq!(
            outcome,
            AccuseOutcome::Renewed { accused: bob, deadline: 100 + ACCUSATION_WINDOW }
        );
        assert_eq!(state.accusation.unwrap().deadline, 100 + ACCUSATION_WINDOW);
    }

    #[test]
    fn test_forfeiture_fires_at_deadline() {
        let (mut state, alice, _) = started_match();

        accuse(&mut state, alice, 100).unwrap();
        let deadline = 100 + ACCUSATION_WINDOW;

        // One unit early: still a heartbeat path, not a forfeiture
        assert_eq!(
            accuse(&mut state, alice, deadline - 1),
            Err(GameError::AccusationPending)
        );
        assert!(!state.is_finished());

        let outcome = accuse(&mut state, alice, deadline).unwrap();
        assert_eq!(outcome, AccuseOutcome::Forfeited { winner: alice });
        assert!(state.is_finished());
        assert_eq!(state.finish.unwrap().cause, Some(FinishCause::Timeout));
    }

    #[test]
    fn test_accusation_before_stake_agreed_rejected() {
        let alice = PlayerId::new([1; 16]);
        let bob = PlayerId::new([2; 16]);
        let mut state = MatchState::new(MatchId(1), alice, 8, 10);

        // Joinable: nothing at risk yet
        assert!(matches!(
            accuse(&mut state, alice, 10),
            Err(GameError::WrongPhase { .. })
        ));

        // Paired but no stake agreed: still nothing escrowed
        state.players[1] = Some(bob);
        state.phase = MatchPhase::Paired;
        assert!(matches!(
            accuse(&mut state, alice, 10),
            Err(GameError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_accusation_allowed_once_stake_agreed() {
        // A depositor must be able to escape a counterparty who never
        // deposits or commits
        let alice = PlayerId::new([1; 16]);
        let bob = PlayerId::new([2; 16]);
        let mut state = MatchState::new(MatchId(1), alice, 8, 10);
        state.players[1] = Some(bob);
        state.phase = MatchPhase::StakeAgreed;
        state.stake = 100;
        state.deposited[0] = true;

        let outcome = accuse(&mut state, alice, 50).unwrap();
        assert_eq!(
            outcome,
            AccuseOutcome::Raised { accused: bob, deadline: 50 + ACCUSATION_WINDOW }
        );

        let outcome = accuse(&mut state, alice, 50 + ACCUSATION_WINDOW).unwrap();
        assert_eq!(outcome, AccuseOutcome::Forfeited { winner: alice });
        assert!(state.is_finished());
    }

    #[test]
    fn test_non_participant_cannot_accuse() {
        let (mut state, _, _) = started_match();
        assert_eq!(
            accuse(&mut state, PlayerId::new([9; 16]), 10),
            Err(GameError::NotAParticipant)
        );
    }
}
