use anchor_lang::prelude::*;
use waypoint_std::Bytes32;

use crate::instructions::WaypointError;
use crate::state::{
    AssertionRecord, Config, GameOutcome, GameRecord, OutputRootRecord, ASSERTION_SEED,
    CONFIG_SEED, GAME_SEED, OUTPUT_ROOT_SEED,
};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeArgs {
    pub trusted_senders: Vec<Bytes32>,
    pub trusted_attestors: Vec<Pubkey>,
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + Config::INIT_SPACE,
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, Config>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// One-time setup. The initializing signer becomes the config authority.
pub fn initialize(ctx: Context<Initialize>, args: InitializeArgs) -> Result<()> {
    let InitializeArgs {
        trusted_senders,
        trusted_attestors,
    } = args;

    *ctx.accounts.config = Config::new(
        ctx.accounts.authority.key(),
        trusted_senders,
        trusted_attestors,
    )?;

    Ok(())
}

#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump,
        has_one = authority @ WaypointError::InvalidAuthority,
    )]
    pub config: Account<'info, Config>,
    pub authority: Signer<'info>,
}

pub fn set_trusted_senders(
    ctx: Context<UpdateConfig>,
    trusted_senders: Vec<Bytes32>,
) -> Result<()> {
    let config = &mut ctx.accounts.config;

    **config = Config::new(
        config.authority,
        trusted_senders,
        config.trusted_attestors.clone(),
    )?;

    Ok(())
}

pub fn set_trusted_attestors(
    ctx: Context<UpdateConfig>,
    trusted_attestors: Vec<Pubkey>,
) -> Result<()> {
    let config = &mut ctx.accounts.config;

    **config = Config::new(
        config.authority,
        config.trusted_senders.clone(),
        trusted_attestors,
    )?;

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RegisterOutputRootArgs {
    pub index: u64,
    pub root: Bytes32,
    pub l2_block: u64,
}

#[derive(Accounts)]
#[instruction(args: RegisterOutputRootArgs)]
pub struct RegisterOutputRoot<'info> {
    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + OutputRootRecord::INIT_SPACE,
        seeds = [OUTPUT_ROOT_SEED, args.index.to_le_bytes().as_ref()],
        bump,
    )]
    pub record: Account<'info, OutputRootRecord>,
    #[account(
        seeds = [CONFIG_SEED],
        bump,
        has_one = authority @ WaypointError::InvalidAuthority,
    )]
    pub config: Account<'info, Config>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// Feeds one settlement-layer output root into the registry the rollup-output
/// mechanism verifies against.
pub fn register_output_root(
    ctx: Context<RegisterOutputRoot>,
    args: RegisterOutputRootArgs,
) -> Result<()> {
    let RegisterOutputRootArgs {
        index,
        root,
        l2_block,
    } = args;

    *ctx.accounts.record = OutputRootRecord::new(index, root, l2_block);

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RegisterGameArgs {
    pub game_id: Bytes32,
    pub root_claim: Bytes32,
    pub outcome: GameOutcome,
}

#[derive(Accounts)]
#[instruction(args: RegisterGameArgs)]
pub struct RegisterGame<'info> {
    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + GameRecord::INIT_SPACE,
        seeds = [GAME_SEED, args.game_id.as_ref()],
        bump,
    )]
    pub record: Account<'info, GameRecord>,
    #[account(
        seeds = [CONFIG_SEED],
        bump,
        has_one = authority @ WaypointError::InvalidAuthority,
    )]
    pub config: Account<'info, Config>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// Mirrors a dispute game; re-registration lets an in-progress game move to
/// its resolved outcome.
pub fn register_game(ctx: Context<RegisterGame>, args: RegisterGameArgs) -> Result<()> {
    let RegisterGameArgs {
        game_id,
        root_claim,
        outcome,
    } = args;

    *ctx.accounts.record = GameRecord::new(game_id, root_claim, outcome);

    Ok(())
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RegisterAssertionArgs {
    pub node: u64,
    pub send_root: Bytes32,
    pub confirmed: bool,
}

#[derive(Accounts)]
#[instruction(args: RegisterAssertionArgs)]
pub struct RegisterAssertion<'info> {
    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + AssertionRecord::INIT_SPACE,
        seeds = [ASSERTION_SEED, args.node.to_le_bytes().as_ref()],
        bump,
    )]
    pub record: Account<'info, AssertionRecord>,
    #[account(
        seeds = [CONFIG_SEED],
        bump,
        has_one = authority @ WaypointError::InvalidAuthority,
    )]
    pub config: Account<'info, Config>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// Mirrors an assertion node; re-registration flips `confirmed` once the
/// challenge window passes.
pub fn register_assertion(
    ctx: Context<RegisterAssertion>,
    args: RegisterAssertionArgs,
) -> Result<()> {
    let RegisterAssertionArgs {
        node,
        send_root,
        confirmed,
    } = args;

    *ctx.accounts.record = AssertionRecord::new(node, send_root, confirmed);

    Ok(())
}
