//! Match Registry
//!
//! The single entry point hosts call into. Owns every live match
//! record, the joinable-match count, the escrow capability, and the
//! logical clock. Each operation is one atomic, serialized transition
//! against one match: checks first, state mutations second, escrow
//! effects last. Matches are fully independent of each other; the only
//! cross-match state is the joinable count, updated in the same
//! operation that flips a match's joinable flag.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::core::clock::LogicalClock;
use crate::core::escrow::Escrow;
use crate::core::hash::Digest32;
use crate::error::GameError;
use crate::game::accuse::{self, AccuseOutcome};
use crate::game::audit::{self, AuditOutcome};
use crate::game::board::Coord;
use crate::game::events::GameEvent;
use crate::game::state::{MatchId, MatchPhase, MatchState, PlayerId, Side};
use crate::game::turn::{self, ProofOutcome};

/// Registry of live matches plus the substrate capabilities.
pub struct MatchRegistry<E, C> {
    /// Live match records, keyed by id (creation order).
    matches: BTreeMap<MatchId, MatchState>,
    /// Next match id to assign.
    next_id: u64,
    /// Count of currently joinable matches. Kept in lockstep with the
    /// per-match joinable flags.
    joinable_count: usize,
    /// Events drained from matches, in emission order.
    events: Vec<GameEvent>,
    escrow: E,
    clock: C,
}

impl<E: Escrow, C: LogicalClock> MatchRegistry<E, C> {
    /// Create an empty registry over the given capabilities.
    pub fn new(escrow: E, clock: C) -> Self {
        Self {
            matches: BTreeMap::new(),
            next_id: 0,
            joinable_count: 0,
            events: Vec::new(),
            escrow,
            clock,
        }
    }

    // =========================================================================
    // PAIRING
    // =========================================================================

    /// Open a new match and take the first seat.
    pub fn create_match(
        &mut self,
        caller: PlayerId,
        board_size: u16,
        ship_target: u16,
    ) -> Result<MatchId, GameError> {
        if board_size == 0 {
            return Err(GameError::ZeroBoardSize);
        }
        let cell_count = (board_size as u32) * (board_size as u32);
        if ship_target == 0 || (ship_target as u32) > cell_count {
            return Err(GameError::BadShipTarget { ship_target, board_size });
        }

        let id = MatchId(self.next_id);
        self.next_id += 1;

        let mut state = MatchState::new(id, caller, board_size, ship_target);
        state.push_event(GameEvent::MatchCreated {
            match_id: id,
            creator: caller,
            board_size,
            ship_target,
        });
        self.matches.insert(id, state);
        self.joinable_count += 1;

        info!(match_id = %id, board_size, ship_target, "match created");
        self.drain(id);
        Ok(id)
    }

    /// Take the second seat of a specific match.
    pub fn join_match(&mut self, id: MatchId, caller: PlayerId) -> Result<(), GameError> {
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        if !state.is_joinable() {
            return Err(GameError::NotJoinable(id));
        }
        if state.players[0] == Some(caller) {
            return Err(GameError::SelfJoin);
        }

        state.players[1] = Some(caller);
        state.phase = MatchPhase::Paired;
        state.push_event(GameEvent::PlayerJoined { match_id: id, player: caller });
        self.joinable_count -= 1;

        info!(match_id = %id, "player joined");
        self.drain(id);
        Ok(())
    }

    /// Join the oldest open match not created by the caller.
    pub fn join_any_open_match(&mut self, caller: PlayerId) -> Result<MatchId, GameError> {
        let id = self
            .matches
            .values()
            .find(|m| m.is_joinable() && m.players[0] != Some(caller))
            .map(|m| m.id)
            .ok_or(GameError::NoOpenMatch)?;
        self.join_match(id, caller)?;
        Ok(id)
    }

    // =========================================================================
    // STAKE NEGOTIATION
    // =========================================================================

    /// Propose a stake amount. Either player may propose; a later
    /// proposal replaces an unaccepted one.
    pub fn propose_stake(
        &mut self,
        id: MatchId,
        caller: PlayerId,
        amount: u64,
    ) -> Result<(), GameError> {
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        if state.phase != MatchPhase::Paired {
            return Err(GameError::WrongPhase { phase: state.phase });
        }
        state.side_of(caller).ok_or(GameError::NotAParticipant)?;
        if state.stake_agreed {
            return Err(GameError::StakeAlreadyAgreed);
        }
        if amount == 0 {
            return Err(GameError::ZeroStake);
        }
        // The full pot is 2x the stake and must fit in a u64
        if amount > u64::MAX / 2 {
            return Err(GameError::StakeTooLarge(amount));
        }

        state.stake_proposal = Some((caller, amount));
        state.push_event(GameEvent::StakeProposed { match_id: id, proposer: caller, amount });

        debug!(match_id = %id, amount, "stake proposed");
        self.drain(id);
        Ok(())
    }

    /// Accept the outstanding stake proposal. The acceptor must differ
    /// from the proposer; the stake is immutable afterwards.
    pub fn accept_stake(&mut self, id: MatchId, caller: PlayerId) -> Result<(), GameError> {
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        if state.phase != MatchPhase::Paired {
            return Err(GameError::WrongPhase { phase: state.phase });
        }
        state.side_of(caller).ok_or(GameError::NotAParticipant)?;
        let (proposer, amount) = state.stake_proposal.ok_or(GameError::NoStakeProposal)?;
        if proposer == caller {
            return Err(GameError::ProposerCannotAccept);
        }

        state.stake = amount;
        state.stake_agreed = true;
        state.phase = MatchPhase::StakeAgreed;
        state.push_event(GameEvent::StakeAccepted { match_id: id, acceptor: caller, amount });

        info!(match_id = %id, amount, "stake agreed");
        self.drain(id);
        Ok(())
    }

    /// Deposit the agreed stake into escrow. Exactly once per player,
    /// exactly the agreed amount.
    pub fn deposit_stake(
        &mut self,
        id: MatchId,
        caller: PlayerId,
        amount: u64,
    ) -> Result<(), GameError> {
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        if state.phase != MatchPhase::StakeAgreed {
            return Err(GameError::WrongPhase { phase: state.phase });
        }
        let side = state.side_of(caller).ok_or(GameError::NotAParticipant)?;
        if state.deposited[side.index()] {
            return Err(GameError::AlreadyDeposited);
        }
        if amount != state.stake {
            return Err(GameError::WrongDepositAmount { got: amount, want: state.stake });
        }

        self.escrow.hold(id.0, caller.0, amount)?;
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        state.deposited[side.index()] = true;
        state.clear_accusation_against(caller);
        state.push_event(GameEvent::StakeDeposited { match_id: id, player: caller, amount });

        debug!(match_id = %id, amount, "stake deposited");
        self.drain(id);
        Ok(())
    }

    // =========================================================================
    // COMMITMENTS
    // =========================================================================

    /// Register the caller's board commitment root. Write-once; the
    /// match starts when both roots are set.
    pub fn register_commitment(
        &mut self,
        id: MatchId,
        caller: PlayerId,
        root: Digest32,
    ) -> Result<(), GameError> {
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        if state.phase != MatchPhase::StakeAgreed {
            return Err(GameError::WrongPhase { phase: state.phase });
        }
        let side = state.side_of(caller).ok_or(GameError::NotAParticipant)?;
        if !state.deposited[side.index()] {
            return Err(GameError::DepositRequired);
        }
        if !state.set_commitment(side, root) {
            return Err(GameError::CommitmentAlreadySet);
        }
        state.clear_accusation_against(caller);
        state.push_event(GameEvent::CommitmentRegistered { match_id: id, player: caller });
        debug!(match_id = %id, root = %hex::encode(root), "commitment registered");

        if state.both_committed() {
            // Creator attacks first.
            let first_turn = state.player(Side::A).ok_or(GameError::UnknownMatch(id))?;
            state.phase = MatchPhase::Started;
            state.turn_holder = Some(first_turn);
            state.push_event(GameEvent::MatchStarted { match_id: id, first_turn });
            info!(match_id = %id, "match started");
        }

        self.drain(id);
        Ok(())
    }

    // =========================================================================
    // PLAY
    // =========================================================================

    /// Declare an attack as the turn holder.
    pub fn declare_attack(
        &mut self,
        id: MatchId,
        caller: PlayerId,
        coord: Coord,
    ) -> Result<(), GameError> {
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        turn::declare_attack(state, caller, coord)?;
        debug!(match_id = %id, %coord, "attack declared");
        self.drain(id);
        Ok(())
    }

    /// Submit the proof owed for the oldest attack against the caller:
    /// the claimed cell value, the cell's salt, and the sibling path.
    ///
    /// A failed verification finishes and settles the match with the
    /// caller as loser.
    pub fn submit_proof(
        &mut self,
        id: MatchId,
        caller: PlayerId,
        claimed_value: u8,
        salt: Digest32,
        siblings: Vec<Digest32>,
    ) -> Result<ProofOutcome, GameError> {
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        let outcome = turn::submit_proof(state, caller, claimed_value, salt, siblings)?;

        match outcome {
            ProofOutcome::CheatDetected { winner } => {
                warn!(match_id = %id, "proof mismatch, match forfeited");
                self.settle_and_discard(id, winner)?;
            }
            ProofOutcome::Verified { coord, hit, .. } => {
                debug!(match_id = %id, %coord, hit, "proof verified");
                self.drain(id);
            }
        }
        Ok(outcome)
    }

    /// Submit the provisional loser's full board for the endgame audit.
    /// Settles the match either way.
    pub fn submit_board_for_audit(
        &mut self,
        id: MatchId,
        caller: PlayerId,
        cells: &[u8],
    ) -> Result<AuditOutcome, GameError> {
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        let outcome = audit::submit_board_for_audit(state, caller, cells)?;

        info!(match_id = %id, cause = %outcome.cause, "audit resolved");
        self.settle_and_discard(id, outcome.winner)?;
        Ok(outcome)
    }

    /// Accuse the opponent of being unresponsive, renew an existing
    /// notice, or trigger forfeiture if the deadline has passed.
    pub fn accuse(&mut self, id: MatchId, caller: PlayerId) -> Result<AccuseOutcome, GameError> {
        let now = self.clock.now();
        let state = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        let outcome = accuse::accuse(state, caller, now)?;

        match outcome {
            AccuseOutcome::Forfeited { winner } => {
                warn!(match_id = %id, "accusation deadline passed, match forfeited");
                self.settle_and_discard(id, winner)?;
            }
            AccuseOutcome::Raised { deadline, .. } => {
                debug!(match_id = %id, deadline, "accusation raised");
                self.drain(id);
            }
            AccuseOutcome::Renewed { .. } => self.drain(id),
        }
        Ok(outcome)
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    /// Drain all events emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read a live match record.
    pub fn match_state(&self, id: MatchId) -> Option<&MatchState> {
        self.matches.get(&id)
    }

    /// Count of matches currently open for joining.
    pub fn open_match_count(&self) -> usize {
        self.joinable_count
    }

    /// The escrow backend (for inspection).
    pub fn escrow(&self) -> &E {
        &self.escrow
    }

    /// Mutable clock access (test drivers advance it).
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    // =========================================================================
    // SETTLEMENT
    // =========================================================================

    /// Pay everything deposited to the winner and drop the record:
    /// 2x the stake once both sides deposited, or the lone deposit
    /// when the match forfeits before the second one lands.
    ///
    /// Called only after the match state is terminal with a confirmed
    /// winner, so a reentrant escrow cannot observe a half-updated
    /// match.
    fn settle_and_discard(&mut self, id: MatchId, winner: PlayerId) -> Result<(), GameError> {
        let (stake, deposits) = self
            .matches
            .get(&id)
            .map(|m| (m.stake, m.deposited.iter().filter(|d| **d).count() as u64))
            .ok_or(GameError::UnknownMatch(id))?;

        let pot = stake
            .checked_mul(deposits)
            .ok_or(GameError::StakeTooLarge(stake))?;
        if pot > 0 {
            self.escrow.payout(id.0, winner.0, pot)?;
        }

        self.drain(id);
        self.matches.remove(&id);
        info!(match_id = %id, pot, "match settled and discarded");
        Ok(())
    }

    /// Move a match's pending events into the registry log.
    fn drain(&mut self, id: MatchId) {
        if let Some(state) = self.matches.get_mut(&id) {
            self.events.append(&mut state.pending_events);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
