use anchor_lang::prelude::*;
use derive_new::new;
use waypoint_std::prover::ProverType;
use waypoint_std::Bytes32;

use crate::types::{Reward, Route};

#[event]
#[derive(new)]
pub struct IntentPublished {
    intent_hash: Bytes32,
    destination: u64,
    route: Route,
    reward: Reward,
}

#[event]
#[derive(new)]
pub struct IntentFunded {
    intent_hash: Bytes32,
    funder: Pubkey,
    complete: bool,
}

#[event]
#[derive(new)]
pub struct IntentClaimed {
    intent_hash: Bytes32,
    claimant: Pubkey,
    proved_by: ProverType,
}

#[event]
#[derive(new)]
pub struct IntentWithdrawn {
    intent_hash: Bytes32,
    claimant: Pubkey,
}

/// Per-element outcome reporting for best-effort batches: a failed element
/// emits this and does not roll back its siblings.
#[event]
#[derive(new)]
pub struct WithdrawalSkipped {
    intent_hash: Bytes32,
    error_code: u32,
}

#[event]
#[derive(new)]
pub struct IntentRefunded {
    intent_hash: Bytes32,
    refundee: Pubkey,
}

#[event]
#[derive(new)]
pub struct TokenRecovered {
    intent_hash: Bytes32,
    mint: Pubkey,
    recipient: Pubkey,
    amount: u64,
}
