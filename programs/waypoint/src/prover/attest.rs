use anchor_lang::prelude::*;

use crate::instructions::WaypointError;
use crate::state::Config;
use crate::types::Reward;

/// Self-attestation: no external proof, just a signature from the creator or
/// a trusted attestor. Weakest trust, fastest settlement.
pub fn verify(
    config: &Config,
    reward: &Reward,
    attestor: Option<&AccountInfo>,
    claimant: Pubkey,
) -> Result<Pubkey> {
    let attestor = attestor.ok_or(WaypointError::UnauthorizedProofSource)?;

    require!(attestor.is_signer, WaypointError::UnauthorizedProofSource);
    require!(
        *attestor.key == reward.creator || config.is_trusted_attestor(attestor.key),
        WaypointError::UnauthorizedProofSource
    );

    Ok(claimant)
}
