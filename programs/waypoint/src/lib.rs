use anchor_lang::prelude::*;
use waypoint_std::claim::ClaimStatus;
use waypoint_std::prover::ProverType;
use waypoint_std::Bytes32;

declare_id!("BSiZdkrGuuzFW4TY9cZfxBtk8DaVeMXkBbMcvEvjih3H");

pub mod events;
pub mod instructions;
pub mod mailbox;
pub mod prover;
pub mod state;
pub mod types;

use instructions::*;
use types::{Intent, IntentHashes};

#[program]
pub mod waypoint {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>, args: InitializeArgs) -> Result<()> {
        instructions::initialize(ctx, args)
    }

    pub fn set_trusted_senders(
        ctx: Context<UpdateConfig>,
        trusted_senders: Vec<Bytes32>,
    ) -> Result<()> {
        instructions::set_trusted_senders(ctx, trusted_senders)
    }

    pub fn set_trusted_attestors(
        ctx: Context<UpdateConfig>,
        trusted_attestors: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::set_trusted_attestors(ctx, trusted_attestors)
    }

    pub fn register_output_root(
        ctx: Context<RegisterOutputRoot>,
        args: RegisterOutputRootArgs,
    ) -> Result<()> {
        instructions::register_output_root(ctx, args)
    }

    pub fn register_game(ctx: Context<RegisterGame>, args: RegisterGameArgs) -> Result<()> {
        instructions::register_game(ctx, args)
    }

    pub fn register_assertion(
        ctx: Context<RegisterAssertion>,
        args: RegisterAssertionArgs,
    ) -> Result<()> {
        instructions::register_assertion(ctx, args)
    }

    pub fn publish_and_fund<'info>(
        ctx: Context<'_, '_, '_, 'info, PublishAndFund<'info>>,
        args: PublishAndFundArgs,
    ) -> Result<()> {
        publish_and_fund_intent(ctx, args)
    }

    pub fn fund<'info>(ctx: Context<'_, '_, '_, 'info, Fund<'info>>, args: FundArgs) -> Result<()> {
        fund_intent(ctx, args)
    }

    pub fn prove(ctx: Context<Prove>, args: ProveArgs) -> Result<()> {
        prove_intent(ctx, args)
    }

    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        args: WithdrawArgs,
    ) -> Result<()> {
        withdraw_intent(ctx, args)
    }

    pub fn batch_withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, BatchWithdraw<'info>>,
        args: BatchWithdrawArgs,
    ) -> Result<()> {
        batch_withdraw_intents(ctx, args)
    }

    pub fn refund<'info>(
        ctx: Context<'_, '_, '_, 'info, Refund<'info>>,
        args: RefundArgs,
    ) -> Result<()> {
        refund_intent(ctx, args)
    }

    pub fn recover<'info>(
        ctx: Context<'_, '_, '_, 'info, Recover<'info>>,
        args: RecoverArgs,
    ) -> Result<()> {
        recover_token(ctx, args)
    }

    #[instruction(discriminator = &mailbox::HANDLE_DISCRIMINATOR)]
    pub fn handle<'info>(
        ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
        origin: u32,
        sender: [u8; 32],
        payload: Vec<u8>,
    ) -> Result<()> {
        handle_message(ctx, origin, sender, payload)
    }

    #[instruction(discriminator = &mailbox::HANDLE_ACCOUNT_METAS_DISCRIMINATOR)]
    pub fn handle_account_metas(
        ctx: Context<HandleAccountMetas>,
        origin: u32,
        sender: [u8; 32],
        payload: Vec<u8>,
    ) -> Result<()> {
        instructions::handle_account_metas(ctx, origin, sender, payload)
    }

    #[instruction(discriminator = &mailbox::INTERCHAIN_SECURITY_MODULE_DISCRIMINATOR)]
    pub fn ism(ctx: Context<Ism>) -> Result<()> {
        instructions::ism(ctx)
    }

    #[instruction(discriminator = &mailbox::INTERCHAIN_SECURITY_MODULE_ACCOUNT_METAS_DISCRIMINATOR)]
    pub fn ism_account_metas(ctx: Context<IsmAccountMetas>) -> Result<()> {
        instructions::ism_account_metas(ctx)
    }

    pub fn get_intent_hash(ctx: Context<GetIntentHash>, intent: Intent) -> Result<IntentHashes> {
        queries::get_intent_hash(ctx, intent)
    }

    pub fn get_reward_status(
        ctx: Context<GetRewardStatus>,
        intent_hash: Bytes32,
        prover: ProverType,
    ) -> Result<ClaimStatus> {
        queries::get_reward_status(ctx, intent_hash, prover)
    }

    pub fn get_vault_state<'info>(
        ctx: Context<'_, '_, '_, 'info, GetVaultState<'info>>,
        args: VaultStateArgs,
    ) -> Result<VaultState> {
        queries::get_vault_state(ctx, args)
    }

    pub fn is_intent_funded<'info>(
        ctx: Context<'_, '_, '_, 'info, GetVaultState<'info>>,
        args: VaultStateArgs,
    ) -> Result<bool> {
        queries::is_intent_funded(ctx, args)
    }
}
