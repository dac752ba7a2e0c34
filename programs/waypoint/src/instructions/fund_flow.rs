use std::collections::{BTreeMap, BTreeSet};

use anchor_lang::prelude::*;
use anchor_spl::associated_token::{self, get_associated_token_address_with_program_id};
use anchor_spl::token_interface::TokenAccount;
use anchor_spl::{token, token_2022};

use crate::instructions::WaypointError;
use crate::types::{TransferLeg, TransferLegs};

/// Token side of vault funding, shared by `fund` and `publish_and_fund`.
///
/// The authority for each transfer is the funder when the funder signed, or
/// the permit delegate the funder approved ahead of time. Amounts already in
/// the vault are not re-pulled, so partially funded vaults can be topped up.
pub struct TokenFundingContext<'a, 'info> {
    pub payer: &'a Signer<'info>,
    pub funder: AccountInfo<'info>,
    pub permit_delegate: Option<AccountInfo<'info>>,
    pub vault: AccountInfo<'info>,
    pub token_program: &'a Program<'info, token::Token>,
    pub token_2022_program: &'a Program<'info, token_2022::Token2022>,
    pub associated_token_program: &'a Program<'info, associated_token::AssociatedToken>,
    pub system_program: &'a Program<'info, System>,
}

impl<'info> TokenFundingContext<'_, 'info> {
    /// Funds each leg toward its declared amount; returns the mints whose
    /// vault balance reached the declared amount.
    pub fn fund_tokens(
        &self,
        legs: TransferLegs<'info>,
        reward_token_amounts: &BTreeMap<Pubkey, u64>,
    ) -> Result<BTreeSet<Pubkey>> {
        legs.into_inner()
            .into_iter()
            .map(|leg| self.fund_token(leg, reward_token_amounts))
            .filter_map(|funded| funded.transpose())
            .collect()
    }

    fn fund_token(
        &self,
        leg: TransferLeg<'info>,
        reward_token_amounts: &BTreeMap<Pubkey, u64>,
    ) -> Result<Option<Pubkey>> {
        let token_program = leg.token_program(self.token_program, self.token_2022_program)?;
        let required = *reward_token_amounts
            .get(leg.mint.key)
            .ok_or(WaypointError::InvalidMint)?;
        let vault_balance = self
            .ensure_vault_ata(&leg.mint, &leg.to, &token_program, leg.token_program_id())?
            .amount;

        let outstanding = required
            .saturating_sub(vault_balance)
            .min(leg.from_data()?.amount);

        if outstanding > 0 {
            match &self.permit_delegate {
                Some(delegate) => {
                    leg.require_delegate(delegate.key, outstanding)?;
                    leg.transfer(&token_program, delegate, outstanding)?;
                }
                None => leg.transfer(&token_program, &self.funder, outstanding)?,
            }
        }

        if leg.to_data()?.amount >= required {
            Ok(Some(leg.mint.key()))
        } else {
            Ok(None)
        }
    }

    /// The vault's associated token account for the mint, created on first
    /// funding so the creator never has to materialize the vault up front.
    fn ensure_vault_ata(
        &self,
        mint: &AccountInfo<'info>,
        to: &AccountInfo<'info>,
        token_program: &AccountInfo<'info>,
        token_program_id: &Pubkey,
    ) -> Result<TokenAccount> {
        let vault_ata =
            get_associated_token_address_with_program_id(self.vault.key, mint.key, token_program_id);
        require!(vault_ata == *to.key, WaypointError::InvalidVaultAta);

        if to.data_is_empty() {
            associated_token::create(CpiContext::new(
                self.associated_token_program.to_account_info(),
                associated_token::Create {
                    payer: self.payer.to_account_info(),
                    associated_token: to.to_account_info(),
                    authority: self.vault.to_account_info(),
                    mint: mint.to_account_info(),
                    system_program: self.system_program.to_account_info(),
                    token_program: token_program.to_account_info(),
                },
            ))?;
        }

        TokenAccount::try_deserialize(&mut &to.try_borrow_data()?[..])
    }
}
