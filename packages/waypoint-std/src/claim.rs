//! The per-intent claim state machine.
//!
//! The absence of a stored record is the implicit `Initiated` state. A record
//! is only ever written with a terminal status, and terminal statuses are
//! never overwritten: `Initiated -> Claimed` and `Initiated -> Refunded` are
//! the only transitions. Proof delivery is at-least-once, so re-applying an
//! identical claim is a successful no-op rather than an error.
//!
//! Records are stored per `(intent_hash, mechanism)`. Settlement consults only
//! the record of the mechanism the reward designates; a claim delivered by any
//! other mechanism lives at its own address and never gates the designated
//! record.

use anchor_lang::prelude::*;
use derive_new::new;

use crate::prover::ProverType;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimStatus {
    /// No terminal record exists yet. Never stored.
    Initiated,
    Claimed,
    Refunded,
}

/// The terminal settlement outcome recorded for one intent hash.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq, new)]
pub struct ClaimState {
    pub status: ClaimStatus,
    pub claimant: Pubkey,
    pub proved_by: ProverType,
}

/// Why a transition was rejected. Callers map these onto their own error
/// codes; the machine itself stays framework-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimConflict {
    /// A claim exists with a different claimant.
    ClaimantMismatch,
    /// A claim exists; refund is no longer possible.
    AlreadyClaimed,
    /// The reward was already refunded.
    AlreadyRefunded,
    /// The reward deadline has not elapsed yet.
    NotYetExpired,
}

impl ClaimState {
    /// Applies `Initiated -> Claimed`. `Ok(Some(state))` is a fresh claim the
    /// caller must persist, `Ok(None)` a matching replay to ignore.
    pub fn claim(
        existing: Option<&ClaimState>,
        claimant: Pubkey,
        proved_by: ProverType,
    ) -> std::result::Result<Option<ClaimState>, ClaimConflict> {
        match existing {
            None => Ok(Some(ClaimState::new(
                ClaimStatus::Claimed,
                claimant,
                proved_by,
            ))),
            Some(state) => match state.status {
                ClaimStatus::Claimed if state.claimant == claimant => Ok(None),
                ClaimStatus::Claimed => Err(ClaimConflict::ClaimantMismatch),
                ClaimStatus::Refunded => Err(ClaimConflict::AlreadyRefunded),
                ClaimStatus::Initiated => Ok(Some(ClaimState::new(
                    ClaimStatus::Claimed,
                    claimant,
                    proved_by,
                ))),
            },
        }
    }

    /// Applies `Initiated -> Refunded` on the designated mechanism's record.
    /// Eligibility is evaluated lazily against the caller's clock; there is
    /// no scheduler behind refunds.
    pub fn refund(
        existing: Option<&ClaimState>,
        now: i64,
        deadline: i64,
        governed_by: ProverType,
    ) -> std::result::Result<ClaimState, ClaimConflict> {
        if now < deadline {
            return Err(ClaimConflict::NotYetExpired);
        }

        match existing.map(|state| state.status) {
            Some(ClaimStatus::Claimed) => Err(ClaimConflict::AlreadyClaimed),
            Some(ClaimStatus::Refunded) => Err(ClaimConflict::AlreadyRefunded),
            Some(ClaimStatus::Initiated) | None => Ok(ClaimState::new(
                ClaimStatus::Refunded,
                Pubkey::default(),
                governed_by,
            )),
        }
    }
}
