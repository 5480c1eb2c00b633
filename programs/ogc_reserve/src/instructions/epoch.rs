use anchor_lang::prelude::*;

use crate::errors::ReserveError;
use crate::events::EpochClosed;
use crate::ledger;
use crate::utils::epoch_address;
use crate::NewEpoch;

pub fn new_epoch(ctx: Context<NewEpoch>, next_epoch: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.signer.key();

    // The closing record must sit at the canonical address for the epoch it claims to be.
    let prev = &ctx.accounts.prev_epoch_account;
    require_keys_eq!(
        epoch_address(ctx.program_id, prev.epoch, prev.bump)?,
        prev.key(),
        ReserveError::WrongEpochRecord
    );

    let pool_balance = ctx.accounts.holder.amount;
    let closure = ledger::new_epoch_core(
        &mut ctx.accounts.global_data,
        &mut ctx.accounts.prev_epoch_account,
        &mut ctx.accounts.new_epoch_account,
        ctx.bumps.new_epoch_account,
        &caller,
        next_epoch,
        pool_balance,
        now,
    )?;

    msg!(
        "Epoch {} closed: winner={} reward={} voters={}",
        closure.epoch,
        closure.winner,
        closure.reward,
        closure.voters
    );
    emit!(EpochClosed {
        epoch: closure.epoch,
        winner: closure.winner,
        reward: closure.reward,
        voters: closure.voters,
        reserved_rewards: ctx.accounts.global_data.reserved_rewards,
        closed_by: caller,
    });

    Ok(())
}
