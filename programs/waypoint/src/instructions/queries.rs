use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::token_interface::TokenAccount;
use itertools::Itertools;
use waypoint_std::account::AccountInit;
use waypoint_std::claim::ClaimStatus;
use waypoint_std::prover::ProverType;
use waypoint_std::Bytes32;

use crate::instructions::WaypointError;
use crate::state::{vault_pda, ClaimRecord};
use crate::types::{self, Intent, IntentHashes, Reward};

/// Read-only instructions. Results come back through Anchor return data so
/// off-chain callers can simulate instead of reimplementing the hashing and
/// funding arithmetic.
#[derive(Accounts)]
pub struct GetIntentHash {}

pub fn get_intent_hash(_ctx: Context<GetIntentHash>, intent: Intent) -> Result<IntentHashes> {
    Ok(intent.hashes())
}

#[derive(Accounts)]
#[instruction(intent_hash: Bytes32, prover: ProverType)]
pub struct GetRewardStatus<'info> {
    /// CHECK: address is validated
    #[account(
        address = ClaimRecord::pda(&intent_hash, prover).0 @ WaypointError::InvalidClaimRecord
    )]
    pub claim: UncheckedAccount<'info>,
}

/// Settlement status of one intent under the mechanism its reward designates.
/// An absent claim record reads as `Initiated`: nothing terminal has happened
/// to the intent under that mechanism yet.
pub fn get_reward_status(
    ctx: Context<GetRewardStatus>,
    _intent_hash: Bytes32,
    _prover: ProverType,
) -> Result<ClaimStatus> {
    let record = ClaimRecord::try_from_info(&ctx.accounts.claim)?;

    Ok(ClaimRecord::status(record.as_ref()))
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct VaultStateArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenFunding {
    pub mint: Pubkey,
    pub required: u64,
    pub balance: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct VaultState {
    pub native_required: u64,
    pub native_balance: u64,
    pub tokens: Vec<TokenFunding>,
    pub funded: bool,
}

#[derive(Accounts)]
pub struct GetVaultState<'info> {
    /// CHECK: address is validated
    pub vault: UncheckedAccount<'info>,
}

/// Reports per-mint funding progress. Remaining accounts carry one
/// `[mint, vault_ata]` pair per reward mint, in the reward's aggregated mint
/// order; an uncreated vault token account reads as a zero balance.
pub fn get_vault_state<'info>(
    ctx: Context<'_, '_, '_, 'info, GetVaultState<'info>>,
    args: VaultStateArgs,
) -> Result<VaultState> {
    let VaultStateArgs { route_hash, reward } = args;
    let intent_hash = types::intent_hash(&route_hash, &reward.hash());

    require!(
        ctx.accounts.vault.key() == vault_pda(&intent_hash).0,
        WaypointError::InvalidVault
    );

    let reward_token_amounts = reward.token_amounts()?;
    let pairs = ctx
        .remaining_accounts
        .iter()
        .chunks(2)
        .into_iter()
        .map(|chunk| {
            chunk
                .collect::<Vec<_>>()
                .try_into()
                .map_err(|_| error!(WaypointError::ArrayLengthMismatch))
        })
        .collect::<Result<Vec<[&AccountInfo<'info>; 2]>>>()?;

    require!(
        pairs.len() == reward_token_amounts.len()
            && pairs
                .iter()
                .map(|[mint, _]| *mint.key)
                .eq(reward_token_amounts.keys().copied()),
        WaypointError::InvalidMint
    );

    let tokens = pairs
        .into_iter()
        .map(|[mint, vault_ata]| {
            let required = reward_token_amounts[mint.key];
            let balance = vault_ata_balance(&ctx.accounts.vault, mint, vault_ata)?;

            Ok(TokenFunding {
                mint: *mint.key,
                required,
                balance,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let native_balance = ctx.accounts.vault.lamports();
    let funded = native_balance >= reward.native_amount
        && tokens.iter().all(|token| token.balance >= token.required);

    Ok(VaultState {
        native_required: reward.native_amount,
        native_balance,
        tokens,
        funded,
    })
}

pub fn is_intent_funded<'info>(
    ctx: Context<'_, '_, '_, 'info, GetVaultState<'info>>,
    args: VaultStateArgs,
) -> Result<bool> {
    get_vault_state(ctx, args).map(|state| state.funded)
}

fn vault_ata_balance(
    vault: &AccountInfo,
    mint: &AccountInfo,
    vault_ata: &AccountInfo,
) -> Result<u64> {
    let expected = get_associated_token_address_with_program_id(vault.key, mint.key, mint.owner);
    require!(vault_ata.key() == expected, WaypointError::InvalidVaultAta);

    if vault_ata.data_is_empty() {
        return Ok(0);
    }

    Ok(TokenAccount::try_deserialize(&mut &vault_ata.try_borrow_data()?[..])?.amount)
}
