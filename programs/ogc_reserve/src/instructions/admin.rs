use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program::invoke_signed, system_instruction};
use anchor_spl::token::{self, Transfer};

use crate::errors::ReserveError;
use crate::events::{
    AdminChanged, GlobalDataModified, Initialized, PoolDeposited, PoolWithdrawn,
    TreasuryWithdrawn,
};
use crate::ledger;
use crate::state::GlobalDataAccount;
use crate::utils::treasury_sweep_amount;
use crate::{
    DepositToPool, Initialize, ModifyGlobalData, SetAdmin, SetRewardMode, WithdrawFromPool,
    WithdrawTreasury, AUTH_SEED, TREASURY_SEED,
};

fn emit_global_data(cfg: &GlobalDataAccount) {
    emit!(GlobalDataModified {
        admin: cfg.admin,
        epoch_length: cfg.epoch_length,
        epoch_lock_time: cfg.epoch_lock_time,
        reward_mode: cfg.reward_mode,
        reward_amount: cfg.reward_amount,
        reward_percent: cfg.reward_percent,
    });
}

pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let admin = ctx.accounts.signer.key();

    ctx.accounts.epoch_account.bump = ctx.bumps.epoch_account;
    ledger::initialize_core(
        &mut ctx.accounts.global_data,
        &mut ctx.accounts.epoch_account,
        admin,
        now,
    )?;

    let cfg = &mut ctx.accounts.global_data;
    cfg.bump = ctx.bumps.global_data;

    // SPL plumbing
    cfg.mint = ctx.accounts.mint.key();
    cfg.holder = ctx.accounts.holder.key();
    cfg.locked_vault = ctx.accounts.locked_vault.key();
    cfg.auth_bump = ctx.bumps.auth;

    cfg.treasury = ctx.accounts.treasury.key();
    cfg.treasury_bump = ctx.bumps.treasury;

    emit!(Initialized {
        admin,
        mint: cfg.mint,
        holder: cfg.holder,
        locked_vault: cfg.locked_vault,
        epoch: cfg.epoch,
    });

    Ok(())
}

pub fn modify_global_data(
    ctx: Context<ModifyGlobalData>,
    epoch_length: u64,
    reward_param: u64,
    epoch_lock_time: u64,
) -> Result<()> {
    let cfg = &mut ctx.accounts.global_data;
    ledger::modify_global_data_core(
        cfg,
        &ctx.accounts.signer.key(),
        epoch_length,
        reward_param,
        epoch_lock_time,
    )?;
    emit_global_data(cfg);
    Ok(())
}

pub fn set_reward_mode(ctx: Context<SetRewardMode>, mode: u8, reward_param: u64) -> Result<()> {
    let cfg = &mut ctx.accounts.global_data;
    ledger::set_reward_mode_core(cfg, &ctx.accounts.signer.key(), mode, reward_param)?;
    emit_global_data(cfg);
    Ok(())
}

pub fn set_admin(ctx: Context<SetAdmin>, new_admin: Pubkey) -> Result<()> {
    let cfg = &mut ctx.accounts.global_data;
    let previous = cfg.admin;
    ledger::set_admin_core(cfg, &ctx.accounts.signer.key(), new_admin)?;
    emit!(AdminChanged {
        previous,
        admin: new_admin,
    });
    Ok(())
}

pub fn deposit_to_pool(ctx: Context<DepositToPool>, amount: u64) -> Result<()> {
    ledger::assert_admin(&ctx.accounts.global_data, &ctx.accounts.signer.key())?;
    require!(amount > 0, ReserveError::InvalidAmount);

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.signer_token_account.to_account_info(),
                to: ctx.accounts.holder.to_account_info(),
                authority: ctx.accounts.signer.to_account_info(),
            },
        ),
        amount,
    )?;

    ctx.accounts.holder.reload()?;
    emit!(PoolDeposited {
        amount,
        pool_balance: ctx.accounts.holder.amount,
    });
    Ok(())
}

pub fn withdraw_from_pool(ctx: Context<WithdrawFromPool>, amount: u64) -> Result<()> {
    let cfg = &ctx.accounts.global_data;
    ledger::assert_admin(cfg, &ctx.accounts.signer.key())?;
    ledger::check_pool_withdrawal(cfg, ctx.accounts.holder.amount, amount)?;

    let signer_seeds: &[&[&[u8]]] = &[&[AUTH_SEED, &[cfg.auth_bump]]];
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
        amount,
    )?;

    ctx.accounts.holder.reload()?;
    emit!(PoolWithdrawn {
        amount,
        pool_balance: ctx.accounts.holder.amount,
        reserved_rewards: ctx.accounts.global_data.reserved_rewards,
    });
    Ok(())
}

/// Sweeps the treasury PDA down to its rent-exempt minimum.
pub fn withdraw_treasury(ctx: Context<WithdrawTreasury>) -> Result<()> {
    let cfg = &ctx.accounts.global_data;
    ledger::assert_admin(cfg, &ctx.accounts.signer.key())?;

    let min_rent = Rent::get()?.minimum_balance(0);
    let lamports = treasury_sweep_amount(ctx.accounts.treasury.lamports(), min_rent);
    if lamports == 0 {
        return Ok(());
    }

    let ix = system_instruction::transfer(
        &ctx.accounts.treasury.key(),
        &ctx.accounts.signer.key(),
        lamports,
    );
    let signer_seeds: &[&[u8]] = &[TREASURY_SEED, &[cfg.treasury_bump]];
    invoke_signed(
        &ix,
        &[
            ctx.accounts.treasury.to_account_info(),
            ctx.accounts.signer.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
        &[signer_seeds],
    )?;

    msg!("Treasury swept: {} lamports", lamports);
    emit!(TreasuryWithdrawn {
        admin: ctx.accounts.signer.key(),
        lamports,
    });
    Ok(())
}
