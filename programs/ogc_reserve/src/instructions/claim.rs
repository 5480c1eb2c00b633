use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::errors::ReserveError;
use crate::events::Claimed;
use crate::ledger;
use crate::state::VoteAccount;
use crate::{Claim, AUTH_SEED};

pub fn claim(ctx: Context<Claim>, epoch: u64) -> Result<()> {
    let owner = ctx.accounts.signer.key();
    let vote_ai = ctx.accounts.vote_account.to_account_info();

    // A retired (or never created) vote record reads as "nothing to claim".
    let vote: Option<VoteAccount> = if vote_ai.owner == ctx.program_id && !vote_ai.data_is_empty() {
        let data = vote_ai.try_borrow_data()?;
        let mut slice: &[u8] = &data;
        Some(VoteAccount::try_deserialize(&mut slice)?)
    } else {
        None
    };

    ledger::open_user_stats(&mut ctx.accounts.user_stats, owner, ctx.bumps.user_stats)?;
    let payout = ledger::claim_core(
        &mut ctx.accounts.global_data,
        &ctx.accounts.epoch_account,
        vote.as_ref(),
        &mut ctx.accounts.user_stats,
        epoch,
        ctx.accounts.holder.amount,
    )?;

    if payout > 0 {
        let signer_seeds: &[&[&[u8]]] = &[&[AUTH_SEED, &[ctx.accounts.global_data.auth_bump]]];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.holder.to_account_info(),
                    to: ctx.accounts.signer_token_account.to_account_info(),
                    authority: ctx.accounts.auth.to_account_info(),
                },
                signer_seeds,
            ),
            payout,
        )?;
    }

    // retire the vote so the same epoch cannot be claimed twice
    let dest = ctx.accounts.signer.to_account_info();
    let refunded = dest
        .lamports()
        .checked_add(vote_ai.lamports())
        .ok_or(ReserveError::ArithmeticOverflow)?;
    **dest.try_borrow_mut_lamports()? = refunded;
    **vote_ai.try_borrow_mut_lamports()? = 0;
    vote_ai.assign(&anchor_lang::solana_program::system_program::ID);
    vote_ai.resize(0)?;

    msg!("Claimed {} for epoch {}", payout, epoch);
    emit!(Claimed {
        owner,
        epoch,
        payout,
        amount_claimed: ctx.accounts.user_stats.amount_claimed,
    });
    Ok(())
}
