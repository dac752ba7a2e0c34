use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::{associated_token, token, token_2022};
use waypoint_std::Bytes32;

use crate::events::IntentFunded;
use crate::instructions::fund_flow::TokenFundingContext;
use crate::instructions::WaypointError;
use crate::state::vault_pda;
use crate::types::{self, Reward, TransferLegs};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct FundArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
    pub allow_partial: bool,
}

#[derive(Accounts)]
#[instruction(args: FundArgs)]
pub struct Fund<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: must sign unless a permit delegate does; validated in handler
    #[account(mut)]
    pub funder: UncheckedAccount<'info>,
    /// The SPL delegate the funder approved, standing in for the funder's
    /// signature on token transfers.
    pub permit_delegate: Option<Signer<'info>>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn fund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Fund<'info>>,
    args: FundArgs,
) -> Result<()> {
    let FundArgs {
        route_hash,
        reward,
        allow_partial,
    } = args;
    let intent_hash = types::intent_hash(&route_hash, &reward.hash());

    require!(
        ctx.accounts.vault.key() == vault_pda(&intent_hash).0,
        WaypointError::InvalidVault
    );
    require!(
        ctx.accounts.funder.is_signer || ctx.accounts.permit_delegate.is_some(),
        WaypointError::MissingFunderSignature
    );

    let reward_token_amounts = reward.token_amounts()?;
    let legs: TransferLegs<'info> = ctx.remaining_accounts.try_into()?;

    fund_vault(
        &funding_context(&ctx),
        &ctx.accounts.vault,
        intent_hash,
        &reward,
        &reward_token_amounts,
        legs,
        allow_partial,
        native_source(&ctx),
        &ctx.accounts.system_program,
    )
}

/// Shared funding body: also called by `publish_and_fund` with its own
/// account set.
#[allow(clippy::too_many_arguments)]
pub fn fund_vault<'info>(
    funding: &TokenFundingContext<'_, 'info>,
    vault: &AccountInfo<'info>,
    intent_hash: Bytes32,
    reward: &Reward,
    reward_token_amounts: &BTreeMap<Pubkey, u64>,
    legs: TransferLegs<'info>,
    allow_partial: bool,
    native_source: AccountInfo<'info>,
    system_program: &Program<'info, System>,
) -> Result<()> {
    // completeness is judged against the reward's full mint set, so callers
    // present one leg per reward mint even when topping up a single token
    legs.require_exact_mints(reward_token_amounts)?;

    // a vault that is already complete cannot be funded a second time
    require!(
        !already_complete(vault, reward, &legs, reward_token_amounts)?,
        WaypointError::AlreadyFunded
    );

    let native_funded = fund_native(vault, reward, native_source, system_program)?;
    let funded_mints = funding.fund_tokens(legs, reward_token_amounts)?;
    let complete = native_funded && funded_mints.len() == reward_token_amounts.len();

    require!(allow_partial || complete, WaypointError::InsufficientFunds);

    emit!(IntentFunded::new(
        intent_hash,
        funding.funder.key(),
        complete
    ));

    Ok(())
}

fn funding_context<'a, 'info>(
    ctx: &'a Context<'_, '_, '_, 'info, Fund<'info>>,
) -> TokenFundingContext<'a, 'info> {
    TokenFundingContext {
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
    }
}

/// Lamports come from the funder when the funder signed; on the delegated
/// path the paying signer covers the native portion.
fn native_source<'info>(
    ctx: &Context<'_, '_, '_, 'info, Fund<'info>>,
) -> AccountInfo<'info> {
    if ctx.accounts.funder.is_signer {
        ctx.accounts.funder.to_account_info()
    } else {
        ctx.accounts.payer.to_account_info()
    }
}

fn fund_native<'info>(
    vault: &AccountInfo<'info>,
    reward: &Reward,
    source: AccountInfo<'info>,
    system_program: &Program<'info, System>,
) -> Result<bool> {
    let outstanding = reward
        .native_amount
        .saturating_sub(vault.lamports())
        .min(source.lamports());

    if outstanding > 0 {
        system_program::transfer(
            CpiContext::new(
                system_program.to_account_info(),
                system_program::Transfer {
                    from: source,
                    to: vault.to_account_info(),
                },
            ),
            outstanding,
        )?;
    }

    Ok(vault.lamports() >= reward.native_amount)
}

/// A vault is complete only when it holds the full native amount and the
/// legs, which cover the reward mint set one-to-one, each hold the declared
/// amount. Callers enforce the coverage before asking.
fn already_complete(
    vault: &AccountInfo,
    reward: &Reward,
    legs: &TransferLegs,
    reward_token_amounts: &BTreeMap<Pubkey, u64>,
) -> Result<bool> {
    if vault.lamports() < reward.native_amount {
        return Ok(false);
    }

    let mut satisfied = 0usize;
    for leg in legs.iter() {
        if leg.to.data_is_empty() {
            return Ok(false);
        }
        let required = *reward_token_amounts
            .get(leg.mint.key)
            .ok_or(WaypointError::InvalidMint)?;
        if leg.to_data()?.amount < required {
            return Ok(false);
        }
        satisfied += 1;
    }

    Ok(satisfied == reward_token_amounts.len())
}

#[cfg(test)]
mod tests {
    use waypoint_std::prover::ProverType;

    use crate::types::{token_account_data, TokenAmount};

    use super::*;

    fn reward(native_amount: u64, mint: Pubkey, amount: u64) -> Reward {
        Reward {
            creator: Pubkey::new_unique(),
            prover: ProverType::Attest,
            deadline: 1_700_003_600,
            native_amount,
            tokens: vec![TokenAmount {
                token: mint,
                amount,
            }],
        }
    }

    #[test]
    fn vault_with_full_reward_reads_complete() {
        let token_program = token::ID;
        let system_program = Pubkey::default();
        let vault_key = Pubkey::new_unique();
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let reward = reward(500, mint_key, 100);
        let amounts = reward.token_amounts().unwrap();

        let mut vault_lamports = 500u64;
        let mut from_lamports = 0u64;
        let mut to_lamports = 0u64;
        let mut mint_lamports = 0u64;
        let mut vault_data = vec![];
        let mut from_data = vec![];
        // surplus above the declared amount still reads complete
        let mut to_data = token_account_data(mint_key, vault_key, 150, None);
        let mut mint_data = vec![];

        let vault = AccountInfo::new(
            &vault_key,
            false,
            false,
            &mut vault_lamports,
            &mut vault_data,
            &system_program,
            false,
            0,
        );
        let from = AccountInfo::new(
            &from_key,
            false,
            false,
            &mut from_lamports,
            &mut from_data,
            &token_program,
            false,
            0,
        );
        let to = AccountInfo::new(
            &to_key,
            false,
            false,
            &mut to_lamports,
            &mut to_data,
            &token_program,
            false,
            0,
        );
        let mint = AccountInfo::new(
            &mint_key,
            false,
            false,
            &mut mint_lamports,
            &mut mint_data,
            &token_program,
            false,
            0,
        );
        let accounts = [from, to, mint];
        let legs = TransferLegs::try_from(&accounts[..]).unwrap();

        assert!(already_complete(&vault, &reward, &legs, &amounts).unwrap());
    }

    #[test]
    fn short_token_balance_reads_incomplete() {
        let token_program = token::ID;
        let system_program = Pubkey::default();
        let vault_key = Pubkey::new_unique();
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let reward = reward(500, mint_key, 100);
        let amounts = reward.token_amounts().unwrap();

        let mut vault_lamports = 500u64;
        let mut from_lamports = 0u64;
        let mut to_lamports = 0u64;
        let mut mint_lamports = 0u64;
        let mut vault_data = vec![];
        let mut from_data = vec![];
        let mut to_data = token_account_data(mint_key, vault_key, 99, None);
        let mut mint_data = vec![];

        let vault = AccountInfo::new(
            &vault_key,
            false,
            false,
            &mut vault_lamports,
            &mut vault_data,
            &system_program,
            false,
            0,
        );
        let from = AccountInfo::new(
            &from_key,
            false,
            false,
            &mut from_lamports,
            &mut from_data,
            &token_program,
            false,
            0,
        );
        let to = AccountInfo::new(
            &to_key,
            false,
            false,
            &mut to_lamports,
            &mut to_data,
            &token_program,
            false,
            0,
        );
        let mint = AccountInfo::new(
            &mint_key,
            false,
            false,
            &mut mint_lamports,
            &mut mint_data,
            &token_program,
            false,
            0,
        );
        let accounts = [from, to, mint];
        let legs = TransferLegs::try_from(&accounts[..]).unwrap();

        assert!(!already_complete(&vault, &reward, &legs, &amounts).unwrap());
    }

    #[test]
    fn uncreated_vault_token_account_reads_incomplete() {
        let token_program = token::ID;
        let system_program = Pubkey::default();
        let vault_key = Pubkey::new_unique();
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let reward = reward(0, mint_key, 100);
        let amounts = reward.token_amounts().unwrap();

        let mut vault_lamports = 0u64;
        let mut from_lamports = 0u64;
        let mut to_lamports = 0u64;
        let mut mint_lamports = 0u64;
        let mut vault_data = vec![];
        let mut from_data = vec![];
        let mut to_data = vec![];
        let mut mint_data = vec![];

        let vault = AccountInfo::new(
            &vault_key,
            false,
            false,
            &mut vault_lamports,
            &mut vault_data,
            &system_program,
            false,
            0,
        );
        let from = AccountInfo::new(
            &from_key,
            false,
            false,
            &mut from_lamports,
            &mut from_data,
            &token_program,
            false,
            0,
        );
        let to = AccountInfo::new(
            &to_key,
            false,
            false,
            &mut to_lamports,
            &mut to_data,
            &token_program,
            false,
            0,
        );
        let mint = AccountInfo::new(
            &mint_key,
            false,
            false,
            &mut mint_lamports,
            &mut mint_data,
            &token_program,
            false,
            0,
        );
        let accounts = [from, to, mint];
        let legs = TransferLegs::try_from(&accounts[..]).unwrap();

        assert!(!already_complete(&vault, &reward, &legs, &amounts).unwrap());
    }

    #[test]
    fn short_native_balance_reads_incomplete() {
        let system_program = Pubkey::default();
        let vault_key = Pubkey::new_unique();
        let reward = reward(500, Pubkey::new_unique(), 0);
        let amounts = reward.token_amounts().unwrap();

        let mut vault_lamports = 499u64;
        let mut vault_data = vec![];
        let vault = AccountInfo::new(
            &vault_key,
            false,
            false,
            &mut vault_lamports,
            &mut vault_data,
            &system_program,
            false,
            0,
        );
        let accounts: &[AccountInfo] = &[];
        let legs = TransferLegs::try_from(accounts).unwrap();

        assert!(!already_complete(&vault, &reward, &legs, &amounts).unwrap());
    }
}
