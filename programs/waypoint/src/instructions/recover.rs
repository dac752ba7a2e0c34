use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::token_interface::{close_account, CloseAccount};
use anchor_spl::{token, token_2022};
use waypoint_std::Bytes32;

use crate::events::TokenRecovered;
use crate::instructions::WaypointError;
use crate::state::{vault_pda, VAULT_SEED};
use crate::types::{self, Reward, TransferLeg};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RecoverArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(Accounts)]
#[instruction(args: RecoverArgs)]
pub struct Recover<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut, address = args.reward.creator @ WaypointError::InvalidCreator)]
    pub creator: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub system_program: Program<'info, System>,
}

/// Sweeps a token the vault was sent by mistake back to the reward creator.
/// Only mints outside the declared reward are recoverable; reward mints move
/// exclusively through withdrawal and refund. Remaining accounts carry one
/// transfer leg: [vault_ata, creator_token, mint].
pub fn recover_token<'info>(
    ctx: Context<'_, '_, '_, 'info, Recover<'info>>,
    args: RecoverArgs,
) -> Result<()> {
    let RecoverArgs { route_hash, reward } = args;
    let intent_hash = types::intent_hash(&route_hash, &reward.hash());
    let (vault_key, bump) = vault_pda(&intent_hash);
    let signer_seeds = [VAULT_SEED, intent_hash.as_ref(), &[bump]];

    require!(
        ctx.accounts.vault.key() == vault_key,
        WaypointError::InvalidVault
    );

    let leg: TransferLeg = ctx.remaining_accounts.iter().collect::<Vec<_>>().try_into()?;
    let mint_key = leg.mint.key();

    ensure_recoverable(&reward, &mint_key)?;

    let vault_ata = get_associated_token_address_with_program_id(
        ctx.accounts.vault.key,
        &mint_key,
        leg.token_program_id(),
    );
    require!(leg.from.key() == vault_ata, WaypointError::InvalidVaultAta);
    require!(!leg.from.data_is_empty(), WaypointError::VaultNotFound);
    require!(
        leg.to_data()?.owner == ctx.accounts.creator.key(),
        WaypointError::InvalidCreatorToken
    );

    let token_program = leg.token_program(
        &ctx.accounts.token_program,
        &ctx.accounts.token_2022_program,
    )?;
    let amount = leg.from_data()?.amount;

    leg.transfer_with_signer(
        &token_program,
        &ctx.accounts.vault,
        &[&signer_seeds],
        amount,
    )?;

    close_account(CpiContext::new_with_signer(
        token_program,
        CloseAccount {
            account: leg.from.to_account_info(),
            destination: ctx.accounts.payer.to_account_info(),
            authority: ctx.accounts.vault.to_account_info(),
        },
        &[&signer_seeds],
    ))?;

    emit!(TokenRecovered::new(
        intent_hash,
        mint_key,
        reward.creator,
        amount
    ));

    Ok(())
}

/// Reward mints move exclusively through withdrawal and refund.
fn ensure_recoverable(reward: &Reward, mint: &Pubkey) -> Result<()> {
    require!(
        !reward.token_amounts()?.contains_key(mint),
        WaypointError::TokenNotRecoverable
    );

    Ok(())
}
