use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;

use crate::mailbox;

#[derive(Accounts)]
pub struct Ism {}

/// Names the security module that validates inbound deliveries for us.
pub fn ism(_ctx: Context<Ism>) -> Result<()> {
    set_return_data(
        Some(mailbox::MULTISIG_ISM_MESSAGE_ID)
            .try_to_vec()?
            .as_slice(),
    );

    Ok(())
}
