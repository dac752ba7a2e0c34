use anchor_lang::prelude::*;
use anchor_spl::{associated_token, token, token_2022};
use waypoint_std::account::AccountInit;

use crate::events::IntentPublished;
use crate::instructions::fund_flow::TokenFundingContext;
use crate::instructions::{fund_vault, WaypointError};
use crate::state::{vault_pda, IntentRecord, INTENT_SEED};
use crate::types::{Intent, TransferLegs};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct PublishAndFundArgs {
    pub intent: Intent,
    pub allow_partial: bool,
}

#[derive(Accounts)]
#[instruction(args: PublishAndFundArgs)]
pub struct PublishAndFund<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: must sign unless a permit delegate does; validated in handler
    #[account(mut)]
    pub funder: UncheckedAccount<'info>,
    pub permit_delegate: Option<Signer<'info>>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address is validated; created here, so republishing fails
    #[account(mut)]
    pub intent_record: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn publish_and_fund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, PublishAndFund<'info>>,
    args: PublishAndFundArgs,
) -> Result<()> {
    let PublishAndFundArgs {
        intent,
        allow_partial,
    } = args;
    let hashes = intent.hashes();
    let intent_hash = hashes.intent_hash;

    require!(
        ctx.accounts.vault.key() == vault_pda(&intent_hash).0,
        WaypointError::InvalidVault
    );
    require!(
        ctx.accounts.funder.is_signer || ctx.accounts.permit_delegate.is_some(),
        WaypointError::MissingFunderSignature
    );

    record_intent(&ctx, &intent, &intent_hash)?;

    emit!(IntentPublished::new(
        intent_hash,
        intent.destination,
        intent.route.clone(),
        intent.reward.clone(),
    ));

    let reward_token_amounts = intent.reward.token_amounts()?;
    let legs: TransferLegs<'info> = ctx.remaining_accounts.try_into()?;
    let native_source = if ctx.accounts.funder.is_signer {
        ctx.accounts.funder.to_account_info()
    } else {
        ctx.accounts.payer.to_account_info()
    };

    fund_vault(
        &TokenFundingContext {
            payer: &ctx.accounts.payer,
            funder: ctx.accounts.funder.to_account_info(),
            permit_delegate: ctx
                .accounts
                .permit_delegate
                .as_ref()
                .map(|delegate| delegate.to_account_info()),
            vault: ctx.accounts.vault.to_account_info(),
            token_program: &ctx.accounts.token_program,
            token_2022_program: &ctx.accounts.token_2022_program,
            associated_token_program: &ctx.accounts.associated_token_program,
            system_program: &ctx.accounts.system_program,
        },
        &ctx.accounts.vault,
        intent_hash,
        &intent.reward,
        &reward_token_amounts,
        legs,
        allow_partial,
        native_source,
        &ctx.accounts.system_program,
    )
}

/// Intent existence is recorded exactly once; account creation fails on a
/// hash that was already published.
fn record_intent(
    ctx: &Context<PublishAndFund>,
    intent: &Intent,
    intent_hash: &waypoint_std::Bytes32,
) -> Result<()> {
    let (record_pda, bump) = IntentRecord::pda(intent_hash);
    require!(
        ctx.accounts.intent_record.key() == record_pda,
        WaypointError::InvalidClaimRecord
    );

    let signer_seeds = [INTENT_SEED, intent_hash.as_ref(), &[bump]];

    IntentRecord::new(intent.reward.creator, intent.destination)
        .init(
            &ctx.accounts.intent_record,
            &ctx.accounts.payer,
            &ctx.accounts.system_program,
            &[&signer_seeds],
        )
        .map_err(|_| WaypointError::DuplicateIntent.into())
}
