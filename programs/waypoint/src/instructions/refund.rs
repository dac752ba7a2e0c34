use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::token_interface::{close_account, CloseAccount};
use anchor_spl::{token, token_2022};
use waypoint_std::Bytes32;

use crate::events::IntentRefunded;
use crate::instructions::WaypointError;
use crate::state::{vault_pda, ClaimRecord, VAULT_SEED};
use crate::types::{self, Reward, TransferLeg, TransferLegs};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RefundArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(Accounts)]
#[instruction(args: RefundArgs)]
pub struct Refund<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut, address = args.reward.creator @ WaypointError::InvalidCreator)]
    pub creator: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub claim: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub system_program: Program<'info, System>,
}

/// Returns escrowed value to the reward creator after the deadline. The
/// `Initiated -> Refunded` transition is recorded first, so a raced claim or
/// a second refund fails before any value moves.
pub fn refund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Refund<'info>>,
    args: RefundArgs,
) -> Result<()> {
    let RefundArgs { route_hash, reward } = args;
    let intent_hash = types::intent_hash(&route_hash, &reward.hash());
    let (vault_key, bump) = vault_pda(&intent_hash);
    let signer_seeds = [VAULT_SEED, intent_hash.as_ref(), &[bump]];

    require!(
        ctx.accounts.vault.key() == vault_key,
        WaypointError::InvalidVault
    );

    ClaimRecord::record_refund(
        &ctx.accounts.claim.to_account_info(),
        &ctx.accounts.payer.to_account_info(),
        &ctx.accounts.system_program,
        &intent_hash,
        Clock::get()?.unix_timestamp,
        reward.deadline,
        reward.prover,
    )?;

    refund_tokens(&ctx, &signer_seeds, &reward, ctx.remaining_accounts.try_into()?)?;
    refund_native(&ctx, &signer_seeds, &reward.creator)?;

    emit!(IntentRefunded::new(intent_hash, reward.creator));

    Ok(())
}

fn refund_native(ctx: &Context<Refund>, signer_seeds: &[&[u8]], creator: &Pubkey) -> Result<()> {
    let amount = ctx.accounts.vault.lamports();
    if amount == 0 {
        return Ok(());
    }

    invoke_signed(
        &system_instruction::transfer(&ctx.accounts.vault.key(), creator, amount),
        &[
            ctx.accounts.vault.to_account_info(),
            ctx.accounts.creator.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
        &[signer_seeds],
    )
    .map_err(Into::into)
}

fn refund_tokens<'info>(
    ctx: &Context<'_, '_, '_, 'info, Refund<'info>>,
    signer_seeds: &[&[u8]],
    reward: &Reward,
    legs: TransferLegs<'info>,
) -> Result<()> {
    // every reward mint must drain; a refund that leaves value behind would
    // strand it, since recovery excludes reward mints
    legs.require_exact_mints(&reward.token_amounts()?)?;

    legs.into_inner()
        .into_iter()
        .try_for_each(|leg| refund_token(ctx, signer_seeds, leg))
}

/// Drains one vault token account back to the creator and closes it,
/// returning its rent to the payer.
fn refund_token<'info>(
    ctx: &Context<'_, '_, '_, 'info, Refund<'info>>,
    signer_seeds: &[&[u8]],
    leg: TransferLeg<'info>,
) -> Result<()> {
    let vault_ata = get_associated_token_address_with_program_id(
        ctx.accounts.vault.key,
        &leg.mint.key(),
        leg.token_program_id(),
    );

    require!(leg.from.key() == vault_ata, WaypointError::InvalidVaultAta);
    if leg.from.data_is_empty() {
        // this mint was never funded; nothing to drain or close
        return Ok(());
    }
    require!(
        leg.to_data()?.owner == ctx.accounts.creator.key(),
        WaypointError::InvalidCreatorToken
    );

    let token_program = leg.token_program(
        &ctx.accounts.token_program,
        &ctx.accounts.token_2022_program,
    )?;

    leg.transfer_with_signer(
        &token_program,
        &ctx.accounts.vault,
        &[signer_seeds],
        leg.from_data()?.amount,
    )?;

    close_account(CpiContext::new_with_signer(
        token_program,
        CloseAccount {
            account: leg.from.to_account_info(),
            destination: ctx.accounts.payer.to_account_info(),
            authority: ctx.accounts.vault.to_account_info(),
        },
        &[signer_seeds],
    ))
}
