use anchor_lang::prelude::*;
use anchor_lang::AccountDeserialize;
use waypoint_std::Bytes32;

use crate::events::IntentClaimed;
use crate::instructions::WaypointError;
use crate::prover::{attest, bedrock, cannon, nitro, Evidence};
use crate::state::{
    AssertionRecord, ClaimRecord, Config, GameRecord, OutputRootRecord, CONFIG_SEED,
};
use crate::types::{self, Reward};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct ProveArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
    pub evidence: Evidence,
}

#[derive(Accounts)]
#[instruction(args: ProveArgs)]
pub struct Prove<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: signature requirement is enforced by the attest mechanism
    pub attestor: Option<UncheckedAccount<'info>>,
    /// CHECK: registry record for the evidence; address validated in handler
    pub commitment: Option<UncheckedAccount<'info>>,
    #[account(seeds = [CONFIG_SEED], bump)]
    pub config: Account<'info, Config>,
    /// CHECK: address is validated
    #[account(mut)]
    pub claim: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

/// Verifies mechanism evidence and applies `Initiated -> Claimed`. Replay
/// with the same claimant is a successful no-op; the event fires only for a
/// fresh claim.
pub fn prove_intent(ctx: Context<Prove>, args: ProveArgs) -> Result<()> {
    let ProveArgs {
        route_hash,
        reward,
        evidence,
    } = args;
    let intent_hash = types::intent_hash(&route_hash, &reward.hash());

    evidence.require_mechanism(reward.prover)?;

    let claimant = verify_evidence(&ctx, &intent_hash, &reward, &evidence)?;

    let fresh = ClaimRecord::record_claim(
        &ctx.accounts.claim.to_account_info(),
        &ctx.accounts.payer.to_account_info(),
        &ctx.accounts.system_program,
        None,
        &intent_hash,
        claimant,
        reward.prover,
    )?;

    if fresh {
        emit!(IntentClaimed::new(intent_hash, claimant, reward.prover));
    }

    Ok(())
}

fn verify_evidence(
    ctx: &Context<Prove>,
    intent_hash: &Bytes32,
    reward: &Reward,
    evidence: &Evidence,
) -> Result<Pubkey> {
    match evidence {
        Evidence::Attestation { claimant } => {
            let attestor = ctx
                .accounts
                .attestor
                .as_ref()
                .map(|attestor| attestor.to_account_info());

            attest::verify(&ctx.accounts.config, reward, attestor.as_ref(), *claimant)
        }
        Evidence::OutputRoot {
            output_index,
            preimage,
            inclusion,
        } => {
            let record: OutputRootRecord =
                load_commitment(ctx, OutputRootRecord::pda(*output_index).0)?;

            bedrock::verify(&record, intent_hash, preimage, inclusion)
        }
        Evidence::FaultGame { game_id, inclusion } => {
            let record: GameRecord = load_commitment(ctx, GameRecord::pda(game_id).0)?;

            cannon::verify(&record, intent_hash, inclusion)
        }
        Evidence::Assertion { node, inclusion } => {
            let record: AssertionRecord = load_commitment(ctx, AssertionRecord::pda(*node).0)?;

            nitro::verify(&record, intent_hash, inclusion)
        }
    }
}

/// The registry record backing the evidence: must be the PDA the evidence
/// points at and must actually be populated.
fn load_commitment<T: AccountDeserialize>(ctx: &Context<Prove>, expected: Pubkey) -> Result<T> {
    let commitment = ctx
        .accounts
        .commitment
        .as_ref()
        .ok_or(WaypointError::UnknownCommitment)?;

    require!(
        commitment.key() == expected && !commitment.data_is_empty(),
        WaypointError::UnknownCommitment
    );

    T::try_deserialize(&mut &commitment.try_borrow_data()?[..]).map_err(Into::into)
}
