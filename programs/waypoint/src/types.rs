use std::collections::{BTreeMap, BTreeSet};

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::{self, Token};
use anchor_spl::token_2022::{self, Token2022};
use anchor_spl::token_interface::{transfer_checked, Mint, TokenAccount};
use derive_new::new;
use itertools::Itertools;
use tiny_keccak::{Hasher, Keccak};
use waypoint_std::prover::ProverType;
use waypoint_std::Bytes32;

use crate::instructions::WaypointError;

pub fn keccak256(chunks: &[&[u8]]) -> Bytes32 {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];

    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize(&mut hash);

    hash.into()
}

/// `intent_hash = keccak(route_hash || reward_hash)`. Identical route and
/// reward content always collides to the same hash; that hash is the
/// deduplication key for the whole settlement lifecycle.
pub fn intent_hash(route_hash: &Bytes32, reward_hash: &Bytes32) -> Bytes32 {
    keccak256(&[route_hash.as_ref(), reward_hash.as_ref()])
}

/// The three hashes derived from one intent, in one place so queries and
/// instructions agree on them.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, new)]
pub struct IntentHashes {
    pub intent_hash: Bytes32,
    pub route_hash: Bytes32,
    pub reward_hash: Bytes32,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Intent {
    pub destination: u64,
    pub route: Route,
    pub reward: Reward,
}

impl Intent {
    pub fn hashes(&self) -> IntentHashes {
        let route_hash = self.route.hash();
        let reward_hash = self.reward.hash();

        IntentHashes::new(
            intent_hash(&route_hash, &reward_hash),
            route_hash,
            reward_hash,
        )
    }
}

/// What must happen on the destination chain. Immutable once hashed; the
/// sequence order of `tokens` and `calls` is part of the content.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Route {
    pub salt: Bytes32,
    pub deadline: i64,
    pub portal: Bytes32,
    pub native_amount: u64,
    pub tokens: Vec<TokenAmount>,
    pub calls: Vec<Call>,
}

impl Route {
    /// Keccak over the canonical Borsh encoding. Borsh writes vectors
    /// element-by-element in sequence order, so reordering calls or tokens
    /// changes the hash.
    pub fn hash(&self) -> Bytes32 {
        let encoded = self.try_to_vec().expect("route serialization is total");

        keccak256(&[&encoded])
    }

    pub fn token_amounts(&self) -> Result<BTreeMap<Pubkey, u64>> {
        aggregate_token_amounts(&self.tokens)
    }
}

/// What the creator escrows for whoever fulfills the route.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Reward {
    pub creator: Pubkey,
    pub prover: ProverType,
    pub deadline: i64,
    pub native_amount: u64,
    pub tokens: Vec<TokenAmount>,
}

impl Reward {
    pub fn hash(&self) -> Bytes32 {
        let encoded = self.try_to_vec().expect("reward serialization is total");

        keccak256(&[&encoded])
    }

    /// Reward tokens aggregated per mint. Duplicate mints are summed rather
    /// than rejected; the vault holds one token account per mint either way.
    pub fn token_amounts(&self) -> Result<BTreeMap<Pubkey, u64>> {
        aggregate_token_amounts(&self.tokens)
    }
}

fn aggregate_token_amounts(tokens: &[TokenAmount]) -> Result<BTreeMap<Pubkey, u64>> {
    tokens
        .iter()
        .try_fold(BTreeMap::<Pubkey, u64>::new(), |mut amounts, token| {
            let entry = amounts.entry(token.token).or_default();
            *entry = entry
                .checked_add(token.amount)
                .ok_or(WaypointError::TokenAmountOverflow)?;

            Ok(amounts)
        })
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct TokenAmount {
    pub token: Pubkey,
    pub amount: u64,
}

/// One instruction to execute on the destination chain. Opaque here: the
/// source side only hashes it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Call {
    pub target: Bytes32,
    pub data: Vec<u8>,
    pub value: u64,
}

pub const TRANSFER_LEG_ACCOUNTS: usize = 3;

/// A `[from, to, mint]` account triple for one token movement. Instruction
/// remaining-accounts tile into these.
pub struct TransferLeg<'info> {
    pub from: AccountInfo<'info>,
    pub to: AccountInfo<'info>,
    pub mint: AccountInfo<'info>,
}

pub struct TransferLegs<'info>(Vec<TransferLeg<'info>>);

impl<'info> TryFrom<&[AccountInfo<'info>]> for TransferLegs<'info> {
    type Error = anchor_lang::error::Error;

    fn try_from(accounts: &[AccountInfo<'info>]) -> Result<Self> {
        accounts
            .iter()
            .chunks(TRANSFER_LEG_ACCOUNTS)
            .into_iter()
            .map(|chunk| chunk.collect::<Vec<_>>().try_into())
            .collect::<Result<Vec<TransferLeg>>>()
            .map(Self)
    }
}

impl<'info> TransferLegs<'info> {
    pub fn into_inner(self) -> Vec<TransferLeg<'info>> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransferLeg<'info>> {
        self.0.iter()
    }

    /// The legs must map one-to-one onto the expected mint set; a missing,
    /// duplicated or extra mint rejects the whole operation before any
    /// balance is read or moved.
    pub fn require_exact_mints(&self, expected: &BTreeMap<Pubkey, u64>) -> Result<()> {
        let mints = self
            .0
            .iter()
            .map(|leg| leg.mint.key())
            .collect::<BTreeSet<_>>();

        require!(
            mints.len() == self.0.len() && mints.iter().eq(expected.keys()),
            WaypointError::InvalidMint
        );

        Ok(())
    }
}

impl<'info> TryFrom<Vec<&AccountInfo<'info>>> for TransferLeg<'info> {
    type Error = anchor_lang::error::Error;

    fn try_from(accounts: Vec<&AccountInfo<'info>>) -> Result<Self> {
        let [from, to, mint] = accounts.as_slice() else {
            return Err(WaypointError::InvalidTokenTransferAccounts.into());
        };

        // all three accounts must belong to the same token program; an
        // uncreated endpoint is tolerated (funding creates the destination,
        // refunds skip a source that was never funded)
        let token_program = mint.owner;
        require!(
            from.data_is_empty() || token_program == from.owner,
            WaypointError::InvalidTokenTransferAccounts
        );
        require!(
            to.data_is_empty() || token_program == to.owner,
            WaypointError::InvalidTokenTransferAccounts
        );

        Ok(Self {
            from: from.to_account_info(),
            to: to.to_account_info(),
            mint: mint.to_account_info(),
        })
    }
}

impl<'info> TransferLeg<'info> {
    pub fn transfer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        transfer_checked(
            CpiContext::new(
                token_program.to_account_info(),
                anchor_spl::token_interface::TransferChecked {
                    from: self.from.to_account_info(),
                    to: self.to.to_account_info(),
                    mint: self.mint.to_account_info(),
                    authority: authority.to_account_info(),
                },
            ),
            amount,
            self.mint_data()?.decimals,
        )
    }

    pub fn transfer_with_signer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
        amount: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        transfer_checked(
            CpiContext::new_with_signer(
                token_program.to_account_info(),
                anchor_spl::token_interface::TransferChecked {
                    from: self.from.to_account_info(),
                    to: self.to.to_account_info(),
                    mint: self.mint.to_account_info(),
                    authority: authority.to_account_info(),
                },
                signer_seeds,
            ),
            amount,
            self.mint_data()?.decimals,
        )
    }

    /// Delegated ("permit") funding: the source account must have approved
    /// `delegate` for at least `amount` ahead of time.
    pub fn require_delegate(&self, delegate: &Pubkey, amount: u64) -> Result<()> {
        let from = self.from_data()?;

        require!(
            from.delegate == COption::Some(*delegate) && from.delegated_amount >= amount,
            WaypointError::InvalidDelegatedApproval
        );

        Ok(())
    }

    pub fn token_program(
        &self,
        token_program: &Program<'info, Token>,
        token_2022_program: &Program<'info, Token2022>,
    ) -> Result<AccountInfo<'info>> {
        let token_program_id = self.token_program_id();

        if *token_program_id == token::ID {
            Ok(token_program.to_account_info())
        } else if *token_program_id == token_2022::ID {
            Ok(token_2022_program.to_account_info())
        } else {
            Err(WaypointError::InvalidTokenProgram.into())
        }
    }

    pub fn token_program_id(&self) -> &Pubkey {
        self.mint.owner
    }

    pub fn mint_data(&self) -> Result<Mint> {
        Mint::try_deserialize(&mut &self.mint.try_borrow_data()?[..])
    }

    pub fn from_data(&self) -> Result<TokenAccount> {
        TokenAccount::try_deserialize(&mut &self.from.try_borrow_data()?[..])
    }

    pub fn to_data(&self) -> Result<TokenAccount> {
        TokenAccount::try_deserialize(&mut &self.to.try_borrow_data()?[..])
    }
}

/// Packed SPL token-account bytes, the layout `from_data`/`to_data`
/// deserialize. Test fixture shared across instruction tests.
#[cfg(test)]
pub(crate) fn token_account_data(
    mint: Pubkey,
    owner: Pubkey,
    amount: u64,
    delegate: Option<(Pubkey, u64)>,
) -> Vec<u8> {
    use anchor_lang::solana_program::program_pack::Pack;
    use anchor_spl::token::spl_token::state::{Account as SplTokenAccount, AccountState};

    let (delegate, delegated_amount) = match delegate {
        Some((delegate, delegated_amount)) => (COption::Some(delegate), delegated_amount),
        None => (COption::None, 0),
    };
    let account = SplTokenAccount {
        mint,
        owner,
        amount,
        delegate,
        state: AccountState::Initialized,
        delegated_amount,
        ..Default::default()
    };
    let mut data = vec![0u8; SplTokenAccount::LEN];
    account.pack_into_slice(&mut data);

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_route() -> Route {
        Route {
            salt: [1u8; 32].into(),
            deadline: 1_700_003_600,
            portal: [2u8; 32].into(),
            native_amount: 0,
            tokens: vec![
                TokenAmount {
                    token: Pubkey::new_from_array([3u8; 32]),
                    amount: 100,
                },
                TokenAmount {
                    token: Pubkey::new_from_array([4u8; 32]),
                    amount: 200,
                },
            ],
            calls: vec![
                Call {
                    target: [5u8; 32].into(),
                    data: vec![1, 2, 3],
                    value: 0,
                },
                Call {
                    target: [6u8; 32].into(),
                    data: vec![4, 5, 6],
                    value: 1000,
                },
            ],
        }
    }

    fn sample_reward() -> Reward {
        Reward {
            creator: Pubkey::new_from_array([7u8; 32]),
            prover: ProverType::Bedrock,
            deadline: 1_700_003_600,
            native_amount: 1,
            tokens: vec![TokenAmount {
                token: Pubkey::new_from_array([3u8; 32]),
                amount: 1001,
            }],
        }
    }

    #[test]
    fn route_hash_is_deterministic() {
        assert_eq!(sample_route().hash(), sample_route().hash());
    }

    #[test]
    fn route_hash_is_order_sensitive() {
        let route = sample_route();
        let mut reordered = sample_route();
        reordered.calls.reverse();

        assert_ne!(route.hash(), reordered.hash());

        let mut reordered_tokens = sample_route();
        reordered_tokens.tokens.reverse();

        assert_ne!(route.hash(), reordered_tokens.hash());
    }

    #[test]
    fn reward_hash_covers_every_field() {
        let reward = sample_reward();

        let mut other_prover = sample_reward();
        other_prover.prover = ProverType::Cannon;
        assert_ne!(reward.hash(), other_prover.hash());

        let mut other_native = sample_reward();
        other_native.native_amount += 1;
        assert_ne!(reward.hash(), other_native.hash());
    }

    #[test]
    fn intent_hash_composes_route_and_reward() {
        let intent = Intent {
            destination: 10,
            route: sample_route(),
            reward: sample_reward(),
        };

        let hashes = intent.hashes();

        assert_eq!(hashes.route_hash, intent.route.hash());
        assert_eq!(hashes.reward_hash, intent.reward.hash());
        assert_eq!(
            hashes.intent_hash,
            intent_hash(&hashes.route_hash, &hashes.reward_hash)
        );
        assert_ne!(hashes.intent_hash, hashes.route_hash);
    }

    #[test]
    fn token_amounts_sum_duplicate_mints() {
        let mint_a = Pubkey::new_from_array([3u8; 32]);
        let mint_b = Pubkey::new_from_array([4u8; 32]);
        let reward = Reward {
            tokens: vec![
                TokenAmount {
                    token: mint_a,
                    amount: 100,
                },
                TokenAmount {
                    token: mint_b,
                    amount: 200,
                },
                TokenAmount {
                    token: mint_a,
                    amount: 50,
                },
            ],
            ..sample_reward()
        };

        let amounts = reward.token_amounts().unwrap();

        assert_eq!(amounts.len(), 2);
        assert_eq!(amounts[&mint_a], 150);
        assert_eq!(amounts[&mint_b], 200);
    }

    #[test]
    fn token_amounts_overflow_is_rejected() {
        let mint = Pubkey::new_unique();
        let reward = Reward {
            tokens: vec![
                TokenAmount {
                    token: mint,
                    amount: u64::MAX,
                },
                TokenAmount {
                    token: mint,
                    amount: 1,
                },
            ],
            ..sample_reward()
        };

        assert!(reward.token_amounts().is_err());
    }

    #[test]
    fn transfer_legs_empty_slice() {
        let accounts: &[AccountInfo] = &[];

        let legs = TransferLegs::try_from(accounts).unwrap();

        assert!(legs.into_inner().is_empty());
    }

    #[test]
    fn transfer_leg_requires_exactly_three_accounts() {
        let token_program = token::ID;
        let key = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = vec![];
        let account = AccountInfo::new(
            &key,
            false,
            false,
            &mut lamports,
            &mut data,
            &token_program,
            false,
            0,
        );

        assert!(TransferLeg::try_from(vec![&account, &account]).is_err());
        assert!(TransferLeg::try_from(vec![&account, &account, &account, &account]).is_err());
    }

    #[test]
    fn transfer_leg_rejects_mixed_token_programs() {
        let token_program = token::ID;
        let other_program = token_2022::ID;
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let mut from_lamports = 0u64;
        let mut to_lamports = 0u64;
        let mut mint_lamports = 0u64;
        let mut from_data = vec![];
        let mut to_data = vec![1u8];
        let mut mint_data = vec![];

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
            &other_program,
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

        assert!(TransferLeg::try_from(vec![&from, &to, &mint]).is_err());
    }

    #[test]
    fn transfer_leg_accepts_uncreated_destination() {
        let token_program = token::ID;
        let system_program = Pubkey::default();
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let mut from_lamports = 0u64;
        let mut to_lamports = 0u64;
        let mut mint_lamports = 0u64;
        let mut from_data = vec![];
        let mut to_data = vec![];
        let mut mint_data = vec![];

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
            &system_program,
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

        let leg = TransferLeg::try_from(vec![&from, &to, &mint]).unwrap();

        assert_eq!(leg.token_program_id(), &token_program);
    }

    #[test]
    fn exact_mint_coverage_is_required() {
        let token_program = token::ID;
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let mut from_lamports = 0u64;
        let mut to_lamports = 0u64;
        let mut mint_lamports = 0u64;
        let mut from_data = vec![];
        let mut to_data = vec![];
        let mut mint_data = vec![];

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

        let covered = BTreeMap::from([(mint_key, 100u64)]);
        assert!(legs.require_exact_mints(&covered).is_ok());

        // a reward mint with no leg must not slip through
        let uncovered = BTreeMap::from([(mint_key, 100u64), (Pubkey::new_unique(), 50u64)]);
        assert!(legs.require_exact_mints(&uncovered).is_err());

        // a leg for a mint the reward never declared is rejected too
        assert!(legs.require_exact_mints(&BTreeMap::new()).is_err());
    }

    #[test]
    fn empty_legs_cover_only_an_empty_mint_set() {
        let accounts: &[AccountInfo] = &[];
        let legs = TransferLegs::try_from(accounts).unwrap();

        assert!(legs.require_exact_mints(&BTreeMap::new()).is_ok());
        assert!(legs
            .require_exact_mints(&BTreeMap::from([(Pubkey::new_unique(), 1u64)]))
            .is_err());
    }

    #[test]
    fn delegate_approval_is_validated_per_token() {
        let token_program = token::ID;
        let delegate = Pubkey::new_unique();
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let mut from_lamports = 0u64;
        let mut to_lamports = 0u64;
        let mut mint_lamports = 0u64;
        let mut from_data =
            token_account_data(mint_key, Pubkey::new_unique(), 500, Some((delegate, 300)));
        let mut to_data = vec![];
        let mut mint_data = vec![];

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
        let leg = TransferLeg::try_from(vec![&from, &to, &mint]).unwrap();

        assert!(leg.require_delegate(&delegate, 300).is_ok());
        assert!(leg.require_delegate(&delegate, 301).is_err());
        assert!(leg.require_delegate(&Pubkey::new_unique(), 1).is_err());
    }

    #[test]
    fn undelegated_source_rejects_delegated_transfer() {
        let token_program = token::ID;
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let mut from_lamports = 0u64;
        let mut to_lamports = 0u64;
        let mut mint_lamports = 0u64;
        let mut from_data = token_account_data(mint_key, Pubkey::new_unique(), 500, None);
        let mut to_data = vec![];
        let mut mint_data = vec![];

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
        let leg = TransferLeg::try_from(vec![&from, &to, &mint]).unwrap();

        assert!(leg.require_delegate(&Pubkey::new_unique(), 1).is_err());
    }
}
