use anchor_lang::prelude::*;

use crate::constants::NUM_FIELDS;
use crate::events::VoteCast;
use crate::ledger::{self, Provisioned};
use crate::{CreateVoteAccount, Vote};

pub fn create_vote_account(ctx: Context<CreateVoteAccount>, epoch: u64) -> Result<()> {
    ledger::create_vote_core(
        &ctx.accounts.global_data,
        &mut ctx.accounts.vote_account,
        ctx.accounts.signer.key(),
        epoch,
        ctx.bumps.vote_account,
    )
}

/// Adds `weights` to the caller's vote for `epoch`, creating the vote record
/// on first use.
pub fn vote(ctx: Context<Vote>, epoch: u64, weights: [u64; NUM_FIELDS]) -> Result<()> {
    let owner = ctx.accounts.signer.key();

    let provisioned = ledger::open_vote_core(
        &ctx.accounts.global_data,
        &mut ctx.accounts.vote_account,
        owner,
        epoch,
        ctx.bumps.vote_account,
    )?;
    let weight = ledger::vote_core(
        &ctx.accounts.global_data,
        &mut ctx.accounts.epoch_account,
        &ctx.accounts.user_data,
        &mut ctx.accounts.vote_account,
        epoch,
        &weights,
    )?;

    emit!(VoteCast {
        owner,
        epoch,
        weight,
        created: provisioned == Provisioned::Created,
    });
    Ok(())
}
