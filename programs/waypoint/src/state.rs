use anchor_lang::prelude::*;
use derive_new::new;
use waypoint_std::account::AccountInit;
use waypoint_std::claim::{ClaimConflict, ClaimState, ClaimStatus};
use waypoint_std::prover::ProverType;
use waypoint_std::Bytes32;

use crate::instructions::WaypointError;

pub const VAULT_SEED: &[u8] = b"vault";
pub const CLAIM_SEED: &[u8] = b"claim";
pub const INTENT_SEED: &[u8] = b"intent";
pub const CONFIG_SEED: &[u8] = b"config";
pub const PDA_PAYER_SEED: &[u8] = b"pda_payer";
pub const OUTPUT_ROOT_SEED: &[u8] = b"output_root";
pub const GAME_SEED: &[u8] = b"game";
pub const ASSERTION_SEED: &[u8] = b"assertion";

const MAX_TRUSTED_SENDERS: usize = 20;
const MAX_TRUSTED_ATTESTORS: usize = 20;

/// Escrow address for one intent: a pure function of the intent hash and the
/// program id, recoverable by anyone before the vault holds a single lamport.
pub fn vault_pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, intent_hash.as_ref()], &crate::ID)
}

/// Rent payer PDA for claim records created on the relay path, where no
/// external payer signs. Funded out of band.
pub fn pda_payer_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PDA_PAYER_SEED], &crate::ID)
}

/// Terminal settlement record for one `(intent_hash, mechanism)` pair.
/// Absent until the first terminal transition; never rewritten once terminal.
///
/// Keying per mechanism means a claim delivered by a mechanism the reward
/// never designated lands at its own address: withdrawal and refund consult
/// only the record at `pda(intent_hash, reward.prover)`, so a stray relayed
/// claim cannot block either.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct ClaimRecord {
    pub state: ClaimState,
    /// The vault drains exactly once; flipped by the withdrawal that does it.
    pub withdrawn: bool,
}

impl AccountInit for ClaimRecord {}

impl ClaimRecord {
    pub fn pda(intent_hash: &Bytes32, prover: ProverType) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[CLAIM_SEED, intent_hash.as_ref(), &prover.seed()],
            &crate::ID,
        )
    }

    pub fn status(record: Option<&Self>) -> ClaimStatus {
        record
            .map(|record| record.state.status)
            .unwrap_or(ClaimStatus::Initiated)
    }

    /// Applies `Initiated -> Claimed` against the raw claim account,
    /// creating it when absent. Returns `false` for a matching replay.
    /// `payer_seeds` must carry the payer's seeds when the payer is a PDA
    /// rather than a transaction signer.
    pub fn record_claim<'info>(
        claim: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system_program: &Program<'info, System>,
        payer_seeds: Option<&[&[u8]]>,
        intent_hash: &Bytes32,
        claimant: Pubkey,
        proved_by: ProverType,
    ) -> Result<bool> {
        let (claim_pda, bump) = Self::pda(intent_hash, proved_by);
        require!(claim.key() == claim_pda, WaypointError::InvalidClaimRecord);

        let existing = Self::try_from_info(claim)?;
        let next = ClaimState::claim(existing.as_ref().map(|record| &record.state), claimant, proved_by)
            .map_err(claim_conflict_error)?;

        match next {
            None => Ok(false),
            Some(state) => {
                let prover_seed = proved_by.seed();
                let claim_seeds = [CLAIM_SEED, intent_hash.as_ref(), &prover_seed, &[bump]];
                let record = Self {
                    state,
                    withdrawn: false,
                };

                match payer_seeds {
                    Some(payer_seeds) => {
                        record.init(claim, payer, system_program, &[payer_seeds, &claim_seeds])?
                    }
                    None => record.init(claim, payer, system_program, &[&claim_seeds])?,
                }

                Ok(true)
            }
        }
    }

    /// Applies `Initiated -> Refunded` on the record of the mechanism the
    /// reward designates; fails on any existing terminal state there or
    /// before the reward deadline.
    pub fn record_refund<'info>(
        claim: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system_program: &Program<'info, System>,
        intent_hash: &Bytes32,
        now: i64,
        deadline: i64,
        governed_by: ProverType,
    ) -> Result<()> {
        let (claim_pda, bump) = Self::pda(intent_hash, governed_by);
        require!(claim.key() == claim_pda, WaypointError::InvalidClaimRecord);

        let existing = Self::try_from_info(claim)?;
        let state = ClaimState::refund(
            existing.as_ref().map(|record| &record.state),
            now,
            deadline,
            governed_by,
        )
        .map_err(claim_conflict_error)?;

        let prover_seed = governed_by.seed();
        let signer_seeds = [CLAIM_SEED, intent_hash.as_ref(), &prover_seed, &[bump]];
        Self {
            state,
            withdrawn: true,
        }
        .init(claim, payer, system_program, &[&signer_seeds])
    }
}

pub fn claim_conflict_error(conflict: ClaimConflict) -> Error {
    match conflict {
        ClaimConflict::ClaimantMismatch => WaypointError::ClaimantMismatch.into(),
        ClaimConflict::AlreadyClaimed => WaypointError::AlreadyClaimed.into(),
        ClaimConflict::AlreadyRefunded => WaypointError::AlreadyRefunded.into(),
        ClaimConflict::NotYetExpired => WaypointError::NotYetExpired.into(),
    }
}

/// Existence marker written by `publish_and_fund`; a second publish of the
/// same intent hash fails on this account's creation.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq, new)]
pub struct IntentRecord {
    pub creator: Pubkey,
    pub destination: u64,
}

impl AccountInit for IntentRecord {}

impl IntentRecord {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[INTENT_SEED, intent_hash.as_ref()], &crate::ID)
    }
}

#[account]
#[derive(InitSpace, Debug)]
pub struct Config {
    pub authority: Pubkey,
    /// Relay senders allowed to originate fulfillment messages.
    #[max_len(MAX_TRUSTED_SENDERS)]
    pub trusted_senders: Vec<Bytes32>,
    /// Addresses beyond the reward creator that may self-attest fulfillment.
    #[max_len(MAX_TRUSTED_ATTESTORS)]
    pub trusted_attestors: Vec<Pubkey>,
}

impl Config {
    pub fn new(
        authority: Pubkey,
        trusted_senders: Vec<Bytes32>,
        trusted_attestors: Vec<Pubkey>,
    ) -> Result<Self> {
        require!(
            trusted_senders.len() <= MAX_TRUSTED_SENDERS
                && trusted_attestors.len() <= MAX_TRUSTED_ATTESTORS,
            WaypointError::TooManyTrustedSenders
        );

        Ok(Self {
            authority,
            trusted_senders,
            trusted_attestors,
        })
    }

    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CONFIG_SEED], &crate::ID)
    }

    pub fn is_trusted_sender(&self, sender: &Bytes32) -> bool {
        self.trusted_senders.contains(sender)
    }

    pub fn is_trusted_attestor(&self, attestor: &Pubkey) -> bool {
        self.trusted_attestors.contains(attestor)
    }
}

/// One committed rollup output root, fed by the settlement-layer oracle.
#[account]
#[derive(InitSpace, Debug, new)]
pub struct OutputRootRecord {
    pub index: u64,
    pub root: Bytes32,
    pub l2_block: u64,
}

impl OutputRootRecord {
    pub fn pda(index: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[OUTPUT_ROOT_SEED, &index.to_le_bytes()], &crate::ID)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    InProgress,
    ChallengerWins,
    DefenderWins,
}

/// One fault-proof dispute game mirrored from the settlement layer.
#[account]
#[derive(InitSpace, Debug, new)]
pub struct GameRecord {
    pub game_id: Bytes32,
    pub root_claim: Bytes32,
    pub outcome: GameOutcome,
}

impl GameRecord {
    pub fn pda(game_id: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[GAME_SEED, game_id.as_ref()], &crate::ID)
    }
}

/// One optimistic-chain assertion node and its send root.
#[account]
#[derive(InitSpace, Debug, new)]
pub struct AssertionRecord {
    pub node: u64,
    pub send_root: Bytes32,
    pub confirmed: bool,
}

impl AssertionRecord {
    pub fn pda(node: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[ASSERTION_SEED, &node.to_le_bytes()], &crate::ID)
    }
}
