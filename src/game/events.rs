//! Game Events
//!
//! Typed event stream emitted by the core. Consumers (UI, test harness,
//! indexer) pattern-match on the variants; nothing couples back into
//! the state machine.

use serde::{Serialize, Deserialize};

use crate::core::clock::Height;
use crate::game::board::Coord;
use crate::game::state::{FinishCause, MatchId, PlayerId};

/// An observable state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new match opened for joining.
    MatchCreated {
        /// Match identifier.
        match_id: MatchId,
        /// Creating player.
        creator: PlayerId,
        /// Board side length.
        board_size: u16,
        /// Ship cells each side commits to.
        ship_target: u16,
    },

    /// A second player paired into the match.
    PlayerJoined {
        /// Match identifier.
        match_id: MatchId,
        /// Joining player.
        player: PlayerId,
    },

    /// One side proposed a stake amount.
    StakeProposed {
        /// Match identifier.
        match_id: MatchId,
        /// Proposing player.
        proposer: PlayerId,
        /// Proposed amount.
        amount: u64,
    },

    /// The counterparty accepted the proposed stake.
    StakeAccepted {
        /// Match identifier.
        match_id: MatchId,
        /// Accepting player.
        acceptor: PlayerId,
        /// Agreed amount.
        amount: u64,
    },

    /// A player's stake entered escrow.
    StakeDeposited {
        /// Match identifier.
        match_id: MatchId,
        /// Depositing player.
        player: PlayerId,
        /// Deposited amount.
        amount: u64,
    },

    /// A player registered their board commitment root.
    CommitmentRegistered {
        /// Match identifier.
        match_id: MatchId,
        /// Committing player.
        player: PlayerId,
    },

    /// Both commitments registered; play may begin.
    MatchStarted {
        /// Match identifier.
        match_id: MatchId,
        /// Player expected to attack first.
        first_turn: PlayerId,
    },

    /// The turn holder declared an attack.
    AttackDeclared {
        /// Match identifier.
        match_id: MatchId,
        /// Attacking player.
        attacker: PlayerId,
        /// Attacked coordinate.
        coord: Coord,
    },

    /// A proof for an attacked cell verified successfully.
    ProofChecked {
        /// Match identifier.
        match_id: MatchId,
        /// Player who proved their own cell.
        prover: PlayerId,
        /// Proven coordinate.
        coord: Coord,
        /// True if the cell was a ship (hit).
        hit: bool,
        /// Prover's ships remaining after this proof.
        ships_remaining: u16,
    },

    /// Elimination reached; the provisional loser owes a board audit.
    AuditRequired {
        /// Match identifier.
        match_id: MatchId,
        /// Side whose ships reached zero.
        provisional_loser: PlayerId,
    },

    /// An unresponsiveness accusation was recorded.
    AccusationRaised {
        /// Match identifier.
        match_id: MatchId,
        /// Accusing player.
        accuser: PlayerId,
        /// Accused player.
        accused: PlayerId,
        /// Forfeiture height if no attack intervenes.
        deadline: Height,
    },

    /// Outstanding accusation re-notified; deadline unchanged.
    AccusationRenewed {
        /// Match identifier.
        match_id: MatchId,
        /// Accused player.
        accused: PlayerId,
        /// Original, unextended deadline.
        deadline: Height,
    },

    /// An attack cleared the outstanding accusation (proof of life).
    AccusationCleared {
        /// Match identifier.
        match_id: MatchId,
        /// Previously accused player.
        accused: PlayerId,
    },

    /// Match reached its terminal state.
    MatchFinished {
        /// Match identifier.
        match_id: MatchId,
        /// Final winner.
        winner: PlayerId,
        /// Why the match ended.
        cause: FinishCause,
    },
}

impl GameEvent {
    /// The match this event belongs to.
    pub fn match_id(&self) -> MatchId {
        match self {
            Self::MatchCreated { match_id, .. }
            | Self::PlayerJoined { match_id, .. }
            | Self::StakeProposed { match_id, .. }
            | Self::StakeAccepted { match_id, .. }
            | Self::StakeDeposited { match_id, .. }
            | Self::CommitmentRegistered { match_id, .. }
            | Self::MatchStarted { match_id, .. }
            | Self::AttackDeclared { match_id, .. }
            | Self::ProofChecked { match_id, .. }
            | Self::AuditRequired { match_id, .. }
            | Self::AccusationRaised { match_id, .. }
            | Self::AccusationRenewed { match_id, .. }
            | Self::AccusationCleared { match_id, .. }
            | Self::MatchFinished { match_id, .. } => *match_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_match_id() {
        let event = GameEvent::PlayerJoined {
            match_id: MatchId(7),
            player: PlayerId::new([1; 16]),
        };
        assert_eq!(event.match_id(), MatchId(7));
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = GameEvent::AttackDeclared {
            match_id: MatchId(3),
            attacker: PlayerId::new([2; 16]),
            coord: Coord::new(4, 5),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("AttackDeclared").is_some());
        assert_eq!(json["AttackDeclared"]["coord"]["row"], 4);

        let back: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
