use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;

/// Creates a program-owned PDA account and writes `self` into it.
///
/// Fails when the account is already initialized, which is what gives
/// create-once accounts (claim records, intent records) their exactly-once
/// semantics. An account that merely holds lamports (someone transferred
/// into the address ahead of time) is adopted via allocate + assign instead
/// of `create_account`, which would fail on a funded address.
pub trait AccountInit: AccountSerialize + AccountDeserialize + Owner + Space {
    fn init<'info>(
        self,
        account: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system_program: &Program<'info, System>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let owner = Self::owner();
        let space = 8 + Self::INIT_SPACE;
        let rent_minimum = Rent::get()?.minimum_balance(space);

        require!(
            account.data_is_empty() && *account.owner != owner,
            anchor_lang::error::ErrorCode::ConstraintZero
        );

        if account.lamports() == 0 {
            invoke_signed(
                &system_instruction::create_account(
                    &payer.key(),
                    &account.key(),
                    rent_minimum,
                    space as u64,
                    &owner,
                ),
                &[
                    payer.to_account_info(),
                    account.to_account_info(),
                    system_program.to_account_info(),
                ],
                signer_seeds,
            )?;
        } else {
            top_up(account, payer, system_program, signer_seeds, rent_minimum)?;

            invoke_signed(
                &system_instruction::allocate(&account.key(), space as u64),
                &[account.to_account_info(), system_program.to_account_info()],
                signer_seeds,
            )?;
            invoke_signed(
                &system_instruction::assign(&account.key(), &owner),
                &[account.to_account_info(), system_program.to_account_info()],
                signer_seeds,
            )?;
        }

        self.try_serialize(&mut &mut account.try_borrow_mut_data()?[..])?;

        Ok(())
    }

    /// Reads an optional instance out of a raw account: `None` when the
    /// account has no data yet.
    fn try_from_info(account: &AccountInfo<'_>) -> Result<Option<Self>>
    where
        Self: Sized,
    {
        if account.data_is_empty() {
            return Ok(None);
        }

        Self::try_deserialize(&mut &account.try_borrow_data()?[..]).map(Some)
    }
}

fn top_up<'info>(
    account: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    signer_seeds: &[&[&[u8]]],
    rent_minimum: u64,
) -> Result<()> {
    let shortfall = rent_minimum.saturating_sub(account.lamports());
    if shortfall == 0 {
        return Ok(());
    }

    invoke_signed(
        &system_instruction::transfer(&payer.key(), &account.key(), shortfall),
        &[
            payer.to_account_info(),
            account.to_account_info(),
            system_program.to_account_info(),
        ],
        signer_seeds,
    )
    .map_err(Into::into)
}
