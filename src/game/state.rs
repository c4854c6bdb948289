//! Match State
//!
//! The authoritative per-match record: players, stake handshake,
//! commitments, ship counters, turn and accusation bookkeeping.
//! Every mutating operation against one match is serialized by the
//! execution substrate; this type never sees interleaved writers.

use std::collections::VecDeque;
use serde::{Serialize, Deserialize};

use crate::core::clock::Height;
use crate::core::hash::Digest32;
use crate::game::board::Coord;
use crate::game::events::GameEvent;

// =============================================================================
// IDENTITIES
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord for deterministic map ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create from a UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(|u| Self(*u.as_bytes()))
    }

    /// Generate a fresh random identity.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Convert to a UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// Registry-assigned match identifier, monotonic per registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchId(pub u64);

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two seats in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The creating player's seat.
    A,
    /// The joining player's seat.
    B,
}

impl Side {
    /// The other seat.
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Array index for per-side storage.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Lifecycle phase of a match. Transitions are one-way; `Finished` is
/// terminal and the record is discarded after settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum MatchPhase {
    /// Open, waiting for a second player.
    #[default]
    Joinable,
    /// Both seats filled, stake not yet agreed.
    Paired,
    /// Stake accepted by the counterparty.
    StakeAgreed,
    /// Both commitments registered, no attack declared yet.
    Started,
    /// Attack/proof cycle underway.
    InProgress,
    /// Terminal. Awaiting audit or already settled.
    Finished,
}

/// Why a match finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishCause {
    /// A side's ship counter reached zero and the audit passed.
    AllShipsSunk,
    /// A submitted proof failed verification.
    ProofMismatch,
    /// The revealed board failed the endgame audit.
    BoardAudit(AuditFailure),
    /// An accusation deadline expired without an intervening attack.
    Timeout,
}

/// Which audit check the revealed board failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditFailure {
    /// Revealed cell count is not `board_size²`.
    BoardSize,
    /// Fewer ship cells than the committed target.
    ShipCount,
}

impl std::fmt::Display for FinishCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllShipsSunk => write!(f, "all ships sunk"),
            Self::ProofMismatch => write!(f, "cheater detected (proof mismatch)"),
            Self::BoardAudit(_) => write!(f, "cheater detected (board audit)"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Outstanding unresponsiveness accusation. At most one per match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accusation {
    /// The player accused of stalling.
    pub accused: PlayerId,
    /// Height at which the accusation becomes a forfeiture. Fixed at
    /// first accusation, never extended.
    pub deadline: Height,
}

/// Terminal outcome bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finish {
    /// Final winner; `None` while the endgame audit is pending.
    pub winner: Option<PlayerId>,
    /// Side that must reveal its board, on the elimination path.
    pub provisional_loser: Option<PlayerId>,
    /// Recorded cause; set when the winner is confirmed.
    pub cause: Option<FinishCause>,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete authoritative state of one match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    /// Match identifier.
    pub id: MatchId,

    /// Board side length, fixed at creation.
    pub board_size: u16,

    /// Ship cells each side commits to, fixed at creation.
    pub ship_target: u16,

    /// Seats: `players[0]` is the creator, `players[1]` the joiner.
    pub players: [Option<PlayerId>; 2],

    /// Agreed stake. Zero until the propose/accept handshake completes.
    pub stake: u64,

    /// Outstanding stake proposal (proposer, amount).
    pub stake_proposal: Option<(PlayerId, u64)>,

    /// Whether a proposed stake has been accepted.
    pub stake_agreed: bool,

    /// Per-seat deposit flags.
    pub deposited: [bool; 2],

    /// Per-seat Merkle roots. Write-once.
    pub commitments: [Option<Digest32>; 2],

    /// Per-seat remaining-ship counters. Monotonically non-increasing.
    pub ships_remaining: [u16; 2],

    /// Player whose attack is currently expected.
    pub turn_holder: Option<PlayerId>,

    /// Per-seat FIFO of coordinates this seat still owes a proof for.
    /// Attacks may be declared before earlier proofs resolve, so more
    /// than one can be outstanding against a slow prover.
    pub proofs_owed: [VecDeque<Coord>; 2],

    /// Per-seat set of already-attacked flattened indices, to reject
    /// repeat attacks on a revealed coordinate.
    pub attacked: [Vec<usize>; 2],

    /// Outstanding accusation, if any.
    pub accusation: Option<Accusation>,

    /// Current lifecycle phase.
    pub phase: MatchPhase,

    /// Terminal outcome, present once `phase == Finished`.
    pub finish: Option<Finish>,

    /// Events generated since the last drain.
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a fresh joinable match.
    pub fn new(id: MatchId, creator: PlayerId, board_size: u16, ship_target: u16) -> Self {
        Self {
            id,
            board_size,
            ship_target,
            players: [Some(creator), None],
            stake: 0,
            stake_proposal: None,
            stake_agreed: false,
            deposited: [false, false],
            commitments: [None, None],
            ships_remaining: [ship_target, ship_target],
            turn_holder: None,
            proofs_owed: [VecDeque::new(), VecDeque::new()],
            attacked: [Vec::new(), Vec::new()],
            accusation: None,
            phase: MatchPhase::Joinable,
            finish: None,
            pending_events: Vec::new(),
        }
    }

    /// Seat of a player, `None` for non-participants.
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if self.players[0] == Some(player) {
            Some(Side::A)
        } else if self.players[1] == Some(player) {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Player in a seat, `None` while the seat is unfilled.
    pub fn player(&self, side: Side) -> Option<PlayerId> {
        self.players[side.index()]
    }

    /// The opponent of a seated player.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let side = self.side_of(player)?;
        self.player(side.opponent())
    }

    /// True while the match is waiting for a second player.
    pub fn is_joinable(&self) -> bool {
        self.phase == MatchPhase::Joinable
    }

    /// Registered commitment root for a seat.
    pub fn commitment(&self, side: Side) -> Option<Digest32> {
        self.commitments[side.index()]
    }

    /// Record a commitment root. Returns false if already set.
    pub fn set_commitment(&mut self, side: Side, root: Digest32) -> bool {
        let slot = &mut self.commitments[side.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(root);
        true
    }

    /// Both roots registered?
    pub fn both_committed(&self) -> bool {
        self.commitments.iter().all(Option::is_some)
    }

    /// Ships remaining for a seat.
    pub fn ships(&self, side: Side) -> u16 {
        self.ships_remaining[side.index()]
    }

    /// Decrement a seat's ship counter on a verified hit. Never
    /// underflows.
    pub fn record_hit(&mut self, side: Side) -> u16 {
        let ships = &mut self.ships_remaining[side.index()];
        *ships = ships.saturating_sub(1);
        *ships
    }

    /// Has this seat already attacked the flattened index?
    pub fn already_attacked(&self, side: Side, index: usize) -> bool {
        self.attacked[side.index()].contains(&index)
    }

    /// Mark an index attacked by a seat.
    pub fn mark_attacked(&mut self, side: Side, index: usize) {
        self.attacked[side.index()].push(index);
    }

    /// Clear an outstanding accusation against `actor`, emitting the
    /// cleared event. Progress by the accused (a deposit, a commitment,
    /// an attack) is proof of life; accusations against the other
    /// player are left standing.
    pub fn clear_accusation_against(&mut self, actor: PlayerId) {
        if self.accusation.map(|a| a.accused) == Some(actor) {
            self.accusation = None;
            self.push_event(GameEvent::AccusationCleared { match_id: self.id, accused: actor });
        }
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// True once the match is terminal.
    pub fn is_finished(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    /// Terminal and waiting for the provisional loser's board.
    pub fn audit_pending(&self) -> bool {
        matches!(
            self.finish,
            Some(Finish { winner: None, provisional_loser: Some(_), .. })
        )
    }

    /// Enter the terminal phase with a confirmed winner.
    pub fn finish_with_winner(&mut self, winner: PlayerId, cause: FinishCause) {
        self.phase = MatchPhase::Finished;
        self.accusation = None;
        self.finish = Some(Finish {
            winner: Some(winner),
            provisional_loser: self.opponent_of(winner),
            cause: Some(cause),
        });
        self.push_event(GameEvent::MatchFinished { match_id: self.id, winner, cause });
    }

    /// Enter the terminal phase pending the loser's board audit.
    pub fn finish_pending_audit(&mut self, provisional_loser: PlayerId) {
        self.phase = MatchPhase::Finished;
        self.accusation = None;
        self.finish = Some(Finish {
            winner: None,
            provisional_loser: Some(provisional_loser),
            cause: None,
        });
        self.push_event(GameEvent::AuditRequired {
            match_id: self.id,
            provisional_loser,
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_match() -> (MatchState, PlayerId, PlayerId) {
        let alice = PlayerId::new([1; 16]);
        let bob = PlayerId::new([2; 16]);
        let mut state = MatchState::new(MatchId(1), alice, 8, 10);
        state.players[1] = Some(bob);
        (state, alice, bob)
    }

    #[test]
    fn test_sides_and_opponents() {
        let (state, alice, bob) = two_player_match();

        assert_eq!(state.side_of(alice), Some(Side::A));
        assert_eq!(state.side_of(bob), Some(Side::B));
        assert_eq!(state.side_of(PlayerId::new([9; 16])), None);
        assert_eq!(state.opponent_of(alice), Some(bob));
        assert_eq!(state.opponent_of(bob), Some(alice));
    }

    #[test]
    fn test_commitment_write_once() {
        let (mut state, _, _) = two_player_match();

        assert!(state.set_commitment(Side::A, [1; 32]));
        assert!(!state.set_commitment(Side::A, [2; 32]));
        assert_eq!(state.commitment(Side::A), Some([1; 32]));
        assert!(!state.both_committed());

        assert!(state.set_commitment(Side::B, [3; 32]));
        assert!(state.both_committed());
    }

    #[test]
    fn test_ship_counter_never_underflows() {
        let (mut state, _, _) = two_player_match();
        state.ships_remaining[0] = 1;

        assert_eq!(state.record_hit(Side::A), 0);
        assert_eq!(state.record_hit(Side::A), 0);
        assert_eq!(state.ships(Side::A), 0);
    }

    #[test]
    fn test_attacked_tracking() {
        let (mut state, _, _) = two_player_match();

        assert!(!state.already_attacked(Side::A, 12));
        state.mark_attacked(Side::A, 12);
        assert!(state.already_attacked(Side::A, 12));
        assert!(!state.already_attacked(Side::B, 12));
    }

    #[test]
    fn test_clear_accusation_only_for_the_accused() {
        let (mut state, alice, bob) = two_player_match();
        state.accusation = Some(Accusation { accused: bob, deadline: 50 });

        // Progress by the accuser leaves the accusation standing
        state.clear_accusation_against(alice);
        assert!(state.accusation.is_some());

        state.clear_accusation_against(bob);
        assert!(state.accusation.is_none());
        assert!(state.take_events().iter().any(|e| matches!(
            e,
            GameEvent::AccusationCleared { accused, .. } if *accused == bob
        )));
    }

    #[test]
    fn test_finish_with_winner_clears_accusation() {
        let (mut state, alice, bob) = two_player_match();
        state.accusation = Some(Accusation { accused: bob, deadline: 50 });

        state.finish_with_winner(alice, FinishCause::Timeout);

        assert!(state.is_finished());
        assert!(state.accusation.is_none());
        assert!(!state.audit_pending());
        let finish = state.finish.unwrap();
        assert_eq!(finish.winner, Some(alice));
        assert_eq!(finish.provisional_loser, Some(bob));
    }

    #[test]
    fn test_finish_pending_audit() {
        let (mut state, _, bob) = two_player_match();

        state.finish_pending_audit(bob);

        assert!(state.is_finished());
        assert!(state.audit_pending());
        let events = state.take_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::AuditRequired { provisional_loser, .. }] if *provisional_loser == bob
        ));
    }

    #[test]
    fn test_cause_strings() {
        assert_eq!(FinishCause::AllShipsSunk.to_string(), "all ships sunk");
        assert_eq!(
            FinishCause::ProofMismatch.to_string(),
            "cheater detected (proof mismatch)"
        );
        assert_eq!(
            FinishCause::BoardAudit(AuditFailure::ShipCount).to_string(),
            "cheater detected (board audit)"
        );
        assert_eq!(FinishCause::Timeout.to_string(), "timeout");
    }
}
