use anchor_lang::prelude::*;
use anchor_spl::{token, token_2022};
use waypoint_std::Bytes32;

use crate::events::WithdrawalSkipped;
use crate::instructions::withdraw::WithdrawalContext;
use crate::instructions::WaypointError;
use crate::types::{self, Reward, TRANSFER_LEG_ACCOUNTS};

/// Accounts preceding the token legs in each item's chunk:
/// `[claim, vault, claimant]`.
const ITEM_HEADER_ACCOUNTS: usize = 3;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct BatchWithdrawItem {
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct BatchWithdrawArgs {
    pub items: Vec<BatchWithdrawItem>,
}

#[derive(Accounts)]
#[instruction(args: BatchWithdrawArgs)]
pub struct BatchWithdraw<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub system_program: Program<'info, System>,
}

/// Best-effort batch: each item settles independently and a failing item is
/// reported through `WithdrawalSkipped` without rolling back the ones that
/// already completed.
pub fn batch_withdraw_intents<'info>(
    ctx: Context<'_, '_, '_, 'info, BatchWithdraw<'info>>,
    args: BatchWithdrawArgs,
) -> Result<()> {
    let chunks = split_item_accounts(&args.items, ctx.remaining_accounts)?;

    for (item, accounts) in args.items.iter().zip(chunks) {
        let [claim, vault, claimant, legs @ ..] = accounts else {
            return Err(WaypointError::ArrayLengthMismatch.into());
        };

        let settlement = WithdrawalContext {
            claimant: claimant.to_account_info(),
            vault: vault.to_account_info(),
            claim: claim.to_account_info(),
            token_program: &ctx.accounts.token_program,
            token_2022_program: &ctx.accounts.token_2022_program,
            system_program: &ctx.accounts.system_program,
        };

        if let Err(error) =
            legs.try_into()
                .and_then(|legs| settlement.execute(&item.route_hash, &item.reward, legs))
        {
            let intent_hash = types::intent_hash(&item.route_hash, &item.reward.hash());
            emit!(WithdrawalSkipped::new(intent_hash, error_code(&error)));
        }
    }

    Ok(())
}

/// Tiles the remaining accounts into one chunk per item, sized by that
/// item's reward token count. A tiling mismatch rejects the whole batch
/// before any item runs.
fn split_item_accounts<'c, 'info>(
    items: &[BatchWithdrawItem],
    mut accounts: &'c [AccountInfo<'info>],
) -> Result<Vec<&'c [AccountInfo<'info>]>> {
    let mut chunks = Vec::with_capacity(items.len());

    for item in items {
        let mint_count = item.reward.token_amounts()?.len();
        let chunk_len = ITEM_HEADER_ACCOUNTS + mint_count * TRANSFER_LEG_ACCOUNTS;

        require!(
            accounts.len() >= chunk_len,
            WaypointError::ArrayLengthMismatch
        );

        let (chunk, rest) = accounts.split_at(chunk_len);
        chunks.push(chunk);
        accounts = rest;
    }

    require!(accounts.is_empty(), WaypointError::ArrayLengthMismatch);

    Ok(chunks)
}

fn error_code(error: &Error) -> u32 {
    match error {
        Error::AnchorError(error) => error.error_code_number,
        Error::ProgramError(error) => u64::from(error.program_error.clone()) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_std::prover::ProverType;

    fn item(token_count: usize) -> BatchWithdrawItem {
        BatchWithdrawItem {
            route_hash: [1u8; 32].into(),
            reward: Reward {
                creator: Pubkey::new_unique(),
                prover: ProverType::Attest,
                deadline: 0,
                native_amount: 1,
                tokens: (0..token_count)
                    .map(|_| types::TokenAmount {
                        token: Pubkey::new_unique(),
                        amount: 1,
                    })
                    .collect(),
            },
        }
    }

    fn dummy_accounts(n: usize) -> Vec<(Pubkey, u64, Vec<u8>)> {
        (0..n).map(|_| (Pubkey::new_unique(), 0u64, vec![])).collect()
    }

    #[test]
    fn split_tiles_exactly() {
        let items = vec![item(0), item(2)];
        let owner = Pubkey::default();
        // 3 + (3 + 2 * 3) = 12 accounts
        let mut backing = dummy_accounts(12);
        let infos: Vec<AccountInfo> = backing
            .iter_mut()
            .map(|(key, lamports, data)| {
                AccountInfo::new(key, false, false, lamports, data, &owner, false, 0)
            })
            .collect();

        let chunks = split_item_accounts(&items, &infos).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 3);
        assert_eq!(chunks[1].len(), 9);
    }

    #[test]
    fn split_rejects_leftover_accounts() {
        let items = vec![item(0)];
        let owner = Pubkey::default();
        let mut backing = dummy_accounts(4);
        let infos: Vec<AccountInfo> = backing
            .iter_mut()
            .map(|(key, lamports, data)| {
                AccountInfo::new(key, false, false, lamports, data, &owner, false, 0)
            })
            .collect();

        assert!(split_item_accounts(&items, &infos).is_err());
    }

    #[test]
    fn split_rejects_short_account_list() {
        let items = vec![item(1)];
        let owner = Pubkey::default();
        let mut backing = dummy_accounts(5);
        let infos: Vec<AccountInfo> = backing
            .iter_mut()
            .map(|(key, lamports, data)| {
                AccountInfo::new(key, false, false, lamports, data, &owner, false, 0)
            })
            .collect();

        assert!(split_item_accounts(&items, &infos).is_err());
    }
}
