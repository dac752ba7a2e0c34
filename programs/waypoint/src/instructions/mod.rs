use anchor_lang::prelude::*;

pub mod admin;
pub mod batch_withdraw;
pub mod fund;
pub mod fund_flow;
pub mod handle;
pub mod handle_account_metas;
pub mod ism;
pub mod ism_account_metas;
pub mod prove;
pub mod publish_and_fund;
pub mod queries;
pub mod recover;
pub mod refund;
pub mod withdraw;

pub use admin::*;
pub use batch_withdraw::*;
pub use fund::*;
pub use handle::*;
pub use handle_account_metas::*;
pub use ism::*;
pub use ism_account_metas::*;
pub use prove::*;
pub use publish_and_fund::*;
pub use queries::*;
pub use recover::*;
pub use refund::*;
pub use withdraw::*;

#[error_code]
pub enum WaypointError {
    #[msg("intent hash already published")]
    DuplicateIntent,
    #[msg("vault already holds the full reward")]
    AlreadyFunded,
    #[msg("funding fell short of the declared reward")]
    InsufficientFunds,
    #[msg("token transfer failed")]
    TransferFailed,
    #[msg("delegated approval is missing or too small")]
    InvalidDelegatedApproval,
    #[msg("reward deadline has not elapsed")]
    NotYetExpired,
    #[msg("intent was already claimed")]
    AlreadyClaimed,
    #[msg("intent was already refunded")]
    AlreadyRefunded,
    #[msg("reward was already withdrawn")]
    AlreadyWithdrawn,
    #[msg("claim exists with a different claimant")]
    ClaimantMismatch,
    #[msg("parallel arrays differ in length")]
    ArrayLengthMismatch,
    #[msg("proof source is not authorized for this intent")]
    UnauthorizedProofSource,
    #[msg("token is part of the declared reward")]
    TokenNotRecoverable,
    #[msg("vault holds no account for this token")]
    VaultNotFound,
    #[msg("intent has no claim record yet")]
    IntentNotClaimed,
    InvalidVault,
    InvalidVaultAta,
    InvalidClaimRecord,
    InvalidMint,
    InvalidTokenProgram,
    InvalidTokenTransferAccounts,
    InvalidAuthority,
    InvalidCreator,
    InvalidCreatorToken,
    InvalidClaimantToken,
    InvalidProcessAuthority,
    InvalidPdaPayer,
    #[msg("no commitment registered under this identifier")]
    UnknownCommitment,
    #[msg("evidence preimage does not hash to the registered commitment")]
    CommitmentMismatch,
    #[msg("inclusion proof does not fold to the committed root")]
    InvalidInclusionProof,
    #[msg("dispute game has not resolved in favor of the root claim")]
    GameNotResolved,
    #[msg("assertion node is not confirmed")]
    AssertionNotConfirmed,
    #[msg("relay payload is malformed")]
    InvalidRelayPayload,
    #[msg("funder must sign unless a permit delegate is supplied")]
    MissingFunderSignature,
    TokenAmountOverflow,
    TooManyTrustedSenders,
}
