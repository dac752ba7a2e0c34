use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use anchor_lang::system_program;
use waypoint_std::prover::{ProverType, RelayMessage};
use waypoint_std::SerializableAccountMeta;

use crate::instructions::WaypointError;
use crate::state::{pda_payer_pda, ClaimRecord, Config};

#[derive(Accounts)]
pub struct HandleAccountMetas<'info> {
    /// CHECK: simulation only
    #[account(
        seeds = [b"hyperlane_message_recipient", b"-", b"handle", b"-", b"account_metas"],
        bump
    )]
    pub handle_account_metas: AccountInfo<'info>,
}

/// Tells the mailbox which accounts `handle` needs for a given payload: the
/// fixed account set followed by one writable claim record per listed intent.
pub fn handle_account_metas(
    _ctx: Context<HandleAccountMetas>,
    _origin: u32,
    _sender: [u8; 32],
    payload: Vec<u8>,
) -> Result<()> {
    let message =
        RelayMessage::decode(&payload).map_err(|_| error!(WaypointError::InvalidRelayPayload))?;
    let claim_accounts = message
        .intent_hashes
        .iter()
        .map(|intent_hash| {
            AccountMeta::new(ClaimRecord::pda(intent_hash, ProverType::Relay).0, false)
        });

    let account_metas: Vec<SerializableAccountMeta> = vec![
        AccountMeta::new_readonly(Config::pda().0, false),
        AccountMeta::new(pda_payer_pda().0, false),
        AccountMeta::new_readonly(system_program::ID, false),
    ]
    .into_iter()
    .chain(claim_accounts)
    .map(Into::into)
    .collect();

    set_return_data(&account_metas.try_to_vec()?);

    Ok(())
}
