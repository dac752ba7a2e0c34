use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::{token, token_2022};
use waypoint_std::account::AccountInit;
use waypoint_std::claim::ClaimStatus;
use waypoint_std::Bytes32;

use crate::events::IntentWithdrawn;
use crate::instructions::WaypointError;
use crate::state::{vault_pda, ClaimRecord, VAULT_SEED};
use crate::types::{self, Reward, TransferLeg, TransferLegs};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct WithdrawArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(Accounts)]
#[instruction(args: WithdrawArgs)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: must match the claimant recorded by the proof
    #[account(mut)]
    pub claimant: UncheckedAccount<'info>,
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

pub fn withdraw_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    args: WithdrawArgs,
) -> Result<()> {
    let WithdrawArgs { route_hash, reward } = args;

    let settlement = WithdrawalContext {
        claimant: ctx.accounts.claimant.to_account_info(),
        vault: ctx.accounts.vault.to_account_info(),
        claim: ctx.accounts.claim.to_account_info(),
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        system_program: &ctx.accounts.system_program,
    };

    settlement.execute(&route_hash, &reward, ctx.remaining_accounts.try_into()?)
}

/// One intent's withdrawal, decoupled from the instruction's account struct
/// so batches can run it per remaining-accounts chunk.
pub struct WithdrawalContext<'a, 'info> {
    pub claimant: AccountInfo<'info>,
    pub vault: AccountInfo<'info>,
    pub claim: AccountInfo<'info>,
    pub token_program: &'a Program<'info, token::Token>,
    pub token_2022_program: &'a Program<'info, token_2022::Token2022>,
    pub system_program: &'a Program<'info, System>,
}

impl<'info> WithdrawalContext<'_, 'info> {
    /// Pays the recorded claimant the vault's balances and marks the vault
    /// drained. Distribution is a consequence of the Claimed state; nothing
    /// here can create one.
    pub fn execute(
        &self,
        route_hash: &Bytes32,
        reward: &Reward,
        legs: TransferLegs<'info>,
    ) -> Result<()> {
        let intent_hash = types::intent_hash(route_hash, &reward.hash());
        let (vault_key, bump) = vault_pda(&intent_hash);
        let signer_seeds = [VAULT_SEED, intent_hash.as_ref(), &[bump]];

        require!(self.vault.key() == vault_key, WaypointError::InvalidVault);

        let record = self.validate_claim(&intent_hash, reward)?;

        self.withdraw_native(&signer_seeds)?;
        self.withdraw_tokens(reward, &signer_seeds, legs)?;
        mark_drained(&self.claim, record)?;

        emit!(IntentWithdrawn::new(intent_hash, self.claimant.key()));

        Ok(())
    }

    fn validate_claim(&self, intent_hash: &Bytes32, reward: &Reward) -> Result<ClaimRecord> {
        // only the designated mechanism's record gates distribution; a claim
        // delivered by any other mechanism lives at a different address
        require!(
            self.claim.key() == ClaimRecord::pda(intent_hash, reward.prover).0,
            WaypointError::InvalidClaimRecord
        );

        let record =
            ClaimRecord::try_from_info(&self.claim)?.ok_or(WaypointError::IntentNotClaimed)?;

        match record.state.status {
            ClaimStatus::Claimed => {}
            ClaimStatus::Refunded => return Err(WaypointError::AlreadyRefunded.into()),
            ClaimStatus::Initiated => return Err(WaypointError::IntentNotClaimed.into()),
        }
        require!(!record.withdrawn, WaypointError::AlreadyWithdrawn);
        require!(
            record.state.claimant == self.claimant.key(),
            WaypointError::ClaimantMismatch
        );
        require!(
            record.state.proved_by == reward.prover,
            WaypointError::UnauthorizedProofSource
        );

        Ok(record)
    }

    /// Drains every lamport the vault holds, surplus included; value left
    /// behind would be unreachable once the record is marked drained.
    fn withdraw_native(&self, signer_seeds: &[&[u8]]) -> Result<()> {
        let amount = self.vault.lamports();
        if amount == 0 {
            return Ok(());
        }

        invoke_signed(
            &system_instruction::transfer(&self.vault.key(), &self.claimant.key(), amount),
            &[
                self.vault.to_account_info(),
                self.claimant.to_account_info(),
                self.system_program.to_account_info(),
            ],
            &[signer_seeds],
        )
        .map_err(Into::into)
    }

    fn withdraw_tokens(
        &self,
        reward: &Reward,
        signer_seeds: &[&[u8]],
        legs: TransferLegs<'info>,
    ) -> Result<()> {
        legs.require_exact_mints(&reward.token_amounts()?)?;

        legs.into_inner()
            .into_iter()
            .try_for_each(|leg| self.withdraw_token(signer_seeds, leg))
    }

    /// Moves the full vault token balance for one mint, surplus included.
    fn withdraw_token(&self, signer_seeds: &[&[u8]], leg: TransferLeg<'info>) -> Result<()> {
        let mint_key = leg.mint.key();
        let vault_ata = get_associated_token_address_with_program_id(
            self.vault.key,
            &mint_key,
            leg.token_program_id(),
        );

        require!(leg.from.key() == vault_ata, WaypointError::InvalidVaultAta);
        require!(
            leg.to_data()?.owner == self.claimant.key(),
            WaypointError::InvalidClaimantToken
        );

        let token_program = leg.token_program(self.token_program, self.token_2022_program)?;
        let amount = leg.from_data()?.amount;

        leg.transfer_with_signer(&token_program, &self.vault, &[signer_seeds], amount)
    }
}

fn mark_drained(claim: &AccountInfo, mut record: ClaimRecord) -> Result<()> {
    record.withdrawn = true;
    record
        .try_serialize(&mut &mut claim.try_borrow_mut_data()?[..])
        .map_err(Into::into)
}
