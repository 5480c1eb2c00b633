use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::errors::ReserveError;
use crate::events::{LockCreated, Locked, Unlocked};
use crate::ledger::{self, Provisioned};
use crate::{CreateDataAccount, CreateLockAccount, Lock, Unlock, AUTH_SEED};

/// Creates the caller's voting-power record and claim statistics up front.
pub fn create_data_account(ctx: Context<CreateDataAccount>) -> Result<()> {
    let owner = ctx.accounts.signer.key();

    let data = ledger::open_user_data(&mut ctx.accounts.user_data, owner, ctx.bumps.user_data)?;
    let stats = ledger::open_user_stats(&mut ctx.accounts.user_stats, owner, ctx.bumps.user_stats)?;
    require!(
        data == Provisioned::Created && stats == Provisioned::Created,
        ReserveError::AlreadyInitialized
    );

    Ok(())
}

pub fn create_lock_account(ctx: Context<CreateLockAccount>, series_id: u64) -> Result<()> {
    let owner = ctx.accounts.signer.key();
    ledger::create_lock_core(
        &mut ctx.accounts.lock_account,
        owner,
        series_id,
        ctx.bumps.lock_account,
    )?;

    emit!(LockCreated { owner, series_id });
    Ok(())
}

pub fn lock(ctx: Context<Lock>, series_id: u64, amount: u64) -> Result<()> {
    let owner = ctx.accounts.signer.key();

    ledger::open_user_data(&mut ctx.accounts.user_data, owner, ctx.bumps.user_data)?;
    ledger::lock_core(
        &ctx.accounts.global_data,
        &mut ctx.accounts.lock_account,
        &mut ctx.accounts.user_data,
        amount,
    )?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.signer_token_account.to_account_info(),
                to: ctx.accounts.locked_vault.to_account_info(),
                authority: ctx.accounts.signer.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(Locked {
        owner,
        series_id,
        amount,
        lock_amount: ctx.accounts.lock_account.amount,
        unlock_epoch: ctx.accounts.lock_account.unlock_epoch,
        voting_power: ctx.accounts.user_data.amount,
    });
    Ok(())
}

pub fn unlock(ctx: Context<Unlock>, series_id: u64, amount: u64) -> Result<()> {
    let owner = ctx.accounts.signer.key();

    let emptied = ledger::unlock_core(
        &ctx.accounts.global_data,
        &mut ctx.accounts.lock_account,
        &mut ctx.accounts.user_data,
        amount,
    )?;

    let signer_seeds: &[&[&[u8]]] = &[&[AUTH_SEED, &[ctx.accounts.global_data.auth_bump]]];
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.locked_vault.to_account_info(),
                to: ctx.accounts.signer_token_account.to_account_info(),
                authority: ctx.accounts.auth.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    if emptied {
        // rent goes back to the owner; the series needs create_lock_account again
        ctx.accounts
            .lock_account
            .close(ctx.accounts.signer.to_account_info())?;
        msg!("Lock {} of {} emptied and closed", series_id, owner);
    }

    emit!(Unlocked {
        owner,
        series_id,
        amount,
        lock_amount: ctx.accounts.lock_account.amount,
        voting_power: ctx.accounts.user_data.amount,
        closed: emptied,
    });
    Ok(())
}
