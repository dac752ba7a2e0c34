use anchor_lang::prelude::*;
use waypoint_std::prover::{ProverType, RelayMessage, RelayMessageError};

use crate::events::IntentClaimed;
use crate::instructions::WaypointError;
use crate::mailbox::process_authority_pda;
use crate::state::{pda_payer_pda, ClaimRecord, Config, CONFIG_SEED, PDA_PAYER_SEED};

#[derive(Accounts)]
pub struct Handle<'info> {
    /// Only the mailbox may deliver; its process authority signs for us.
    #[account(address = process_authority_pda().0 @ WaypointError::InvalidProcessAuthority)]
    pub process_authority: Signer<'info>,
    #[account(seeds = [CONFIG_SEED], bump)]
    pub config: Account<'info, Config>,
    /// CHECK: address is validated
    #[account(mut, address = pda_payer_pda().0 @ WaypointError::InvalidPdaPayer)]
    pub pda_payer: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

/// Delivery of a relayed fulfillment message. Relay is at-least-once and
/// unordered, so each listed intent is applied idempotently; a matching
/// replay changes nothing and a conflicting one fails the whole delivery.
pub fn handle_message<'info>(
    ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
    _origin: u32,
    sender: [u8; 32],
    payload: Vec<u8>,
) -> Result<()> {
    require!(
        ctx.accounts.config.is_trusted_sender(&sender.into()),
        WaypointError::UnauthorizedProofSource
    );

    let message = RelayMessage::decode(&payload).map_err(|error| match error {
        RelayMessageError::LengthMismatch => WaypointError::ArrayLengthMismatch,
        RelayMessageError::Malformed => WaypointError::InvalidRelayPayload,
    })?;

    // one claim account per listed intent, index-aligned with the message
    require!(
        ctx.remaining_accounts.len() == message.intent_hashes.len(),
        WaypointError::ArrayLengthMismatch
    );

    let pda_payer = ctx.accounts.pda_payer.to_account_info();
    // rent comes from our own pda_payer account, which signs by seeds
    let (_, pda_payer_bump) = pda_payer_pda();
    let pda_payer_seeds = [PDA_PAYER_SEED, &[pda_payer_bump]];

    for ((intent_hash, claimant), claim) in message.pairs().zip(ctx.remaining_accounts) {
        let fresh = ClaimRecord::record_claim(
            claim,
            &pda_payer,
            &ctx.accounts.system_program,
            Some(&pda_payer_seeds),
            &intent_hash,
            claimant,
            ProverType::Relay,
        )?;

        if fresh {
            emit!(IntentClaimed::new(intent_hash, claimant, ProverType::Relay));
        }
    }

    Ok(())
}
