use anchor_lang::prelude::*;
use waypoint_std::Bytes32;

use crate::instructions::WaypointError;
use crate::prover::{InclusionProof, OutputRootPreimage};
use crate::state::OutputRootRecord;

/// Rollup-output proof: the evidence preimage must hash to the output root
/// committed at `output_index`, and the fulfillment leaf must be included
/// under the preimage's state root.
pub fn verify(
    record: &OutputRootRecord,
    intent_hash: &Bytes32,
    preimage: &OutputRootPreimage,
    inclusion: &InclusionProof,
) -> Result<Pubkey> {
    require!(
        preimage.output_root() == record.root,
        WaypointError::CommitmentMismatch
    );
    inclusion.verify(intent_hash, &preimage.state_root)?;

    Ok(inclusion.claimant)
}
