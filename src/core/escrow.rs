//! Escrow Capability
//!
//! The core never moves funds itself. It calls into an [`Escrow`]
//! implementation supplied by the host: `hold` when a player deposits
//! their stake, `payout` exactly once when a match settles. Accounts are
//! raw 16-byte identities so this module stays independent of the game
//! layer.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Raw 16-byte account identity (same bytes as a player id).
pub type AccountId = [u8; 16];

/// Errors surfaced by an escrow backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// A zero-amount hold or payout was requested.
    #[error("escrow amount must be positive")]
    ZeroAmount,

    /// Payout exceeds the balance held for this match.
    #[error("payout of {requested} exceeds held balance {held}")]
    InsufficientHold {
        /// Amount requested for payout.
        requested: u64,
        /// Amount actually held for the match.
        held: u64,
    },

    /// A balance update would overflow.
    #[error("escrow balance overflow")]
    BalanceOverflow,
}

/// Stake custody interface.
///
/// Implementations must be called only after all match-state mutations
/// for the triggering outcome are finalized (effects after checks).
pub trait Escrow {
    /// Take `amount` into custody for `match_id` from `account`.
    fn hold(&mut self, match_id: u64, account: AccountId, amount: u64) -> Result<(), EscrowError>;

    /// Release `amount` from the match's custody to `recipient`.
    fn payout(
        &mut self,
        match_id: u64,
        recipient: AccountId,
        amount: u64,
    ) -> Result<(), EscrowError>;
}

/// In-memory escrow with per-match held balances.
///
/// Reference backend used by the test suite; a deployment substitutes
/// its ledger-backed implementation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryEscrow {
    /// Balance currently held per match.
    held: BTreeMap<u64, u64>,
    /// Total paid out per recipient, for conservation checks.
    paid: BTreeMap<AccountId, u64>,
}

impl MemoryEscrow {
    /// Create an empty escrow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance currently held for a match.
    pub fn held_for(&self, match_id: u64) -> u64 {
        self.held.get(&match_id).copied().unwrap_or(0)
    }

    /// Total amount ever paid to an account.
    pub fn paid_to(&self, account: &AccountId) -> u64 {
        self.paid.get(account).copied().unwrap_or(0)
    }
}

impl Escrow for MemoryEscrow {
    fn hold(&mut self, match_id: u64, _account: AccountId, amount: u64) -> Result<(), EscrowError> {
        if amount == 0 {
            return Err(EscrowError::ZeroAmount);
        }
        let held = self.held.entry(match_id).or_insert(0);
        *held = held.checked_add(amount).ok_or(EscrowError::BalanceOverflow)?;
        Ok(())
    }

    fn payout(
        &mut self,
        match_id: u64,
        recipient: AccountId,
        amount: u64,
    ) -> Result<(), EscrowError> {
        if amount == 0 {
            return Err(EscrowError::ZeroAmount);
        }
        let held = self.held_for(match_id);
        if amount > held {
            return Err(EscrowError::InsufficientHold { requested: amount, held });
        }
        let new_paid = self
            .paid_to(&recipient)
            .checked_add(amount)
            .ok_or(EscrowError::BalanceOverflow)?;
        self.held.insert(match_id, held - amount);
        self.paid.insert(recipient, new_paid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_accumulates() {
        let mut escrow = MemoryEscrow::new();
        escrow.hold(1, [1; 16], 50).unwrap();
        escrow.hold(1, [2; 16], 50).unwrap();

        assert_eq!(escrow.held_for(1), 100);
        assert_eq!(escrow.held_for(2), 0);
    }

    #[test]
    fn test_payout_conserves_held_balance() {
        let mut escrow = MemoryEscrow::new();
        escrow.hold(1, [1; 16], 50).unwrap();
        escrow.hold(1, [2; 16], 50).unwrap();

        escrow.payout(1, [1; 16], 100).unwrap();
        assert_eq!(escrow.held_for(1), 0);
        assert_eq!(escrow.paid_to(&[1; 16]), 100);
        assert_eq!(escrow.paid_to(&[2; 16]), 0);
    }

    #[test]
    fn test_overdraw_rejected() {
        let mut escrow = MemoryEscrow::new();
        escrow.hold(1, [1; 16], 50).unwrap();

        let err = escrow.payout(1, [1; 16], 60).unwrap_err();
        assert_eq!(err, EscrowError::InsufficientHold { requested: 60, held: 50 });

        // Failed payout leaves the hold untouched
        assert_eq!(escrow.held_for(1), 50);
    }

    #[test]
    fn test_hold_overflow_rejected() {
        let mut escrow = MemoryEscrow::new();
        escrow.hold(1, [1; 16], u64::MAX).unwrap();

        let err = escrow.hold(1, [2; 16], 1).unwrap_err();
        assert_eq!(err, EscrowError::BalanceOverflow);

        // Failed hold leaves the balance untouched
        assert_eq!(escrow.held_for(1), u64::MAX);
    }

    #[test]
    fn test_zero_amounts_rejected() {
        let mut escrow = MemoryEscrow::new();
        assert_eq!(escrow.hold(1, [1; 16], 0), Err(EscrowError::ZeroAmount));
        assert_eq!(escrow.payout(1, [1; 16], 0), Err(EscrowError::ZeroAmount));
    }
}
