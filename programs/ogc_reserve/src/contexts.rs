// programs/ogc_reserve/src/contexts.rs

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::errors::ReserveError;
use crate::state::{
    EpochAccount, GlobalDataAccount, LockAccount, UserDataAccount, UserStatsAccount, VoteAccount,
};

// ----------------------------
// Admin
// ----------------------------

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = signer,
        space = 8 + GlobalDataAccount::INIT_SPACE,
        seeds = [crate::GLOBAL_SEED],
        bump
    )]
    pub global_data: Box<Account<'info, GlobalDataAccount>>,

    #[account(
        init,
        payer = signer,
        space = 8 + EpochAccount::INIT_SPACE,
        seeds = [crate::EPOCH_SEED, crate::INITIAL_EPOCH.to_le_bytes().as_ref()],
        bump
    )]
    pub epoch_account: Box<Account<'info, EpochAccount>>,

    /// Mint of the locked / rewarded token
    pub mint: Box<Account<'info, Mint>>,

    /// CHECK: PDA used only as token authority for `holder` and `locked_vault`.
    #[account(seeds = [crate::AUTH_SEED], bump)]
    pub auth: UncheckedAccount<'info>,

    /// Reward pool
    #[account(
        init,
        payer = signer,
        seeds = [crate::HOLDER_SEED],
        bump,
        token::mint = mint,
        token::authority = auth
    )]
    pub holder: Box<Account<'info, TokenAccount>>,

    /// Custody for locked principal, kept apart from the reward pool
    #[account(
        init,
        payer = signer,
        seeds = [crate::LOCKED_SEED],
        bump,
        token::mint = mint,
        token::authority = auth
    )]
    pub locked_vault: Box<Account<'info, TokenAccount>>,

    /// CHECK: system-owned PDA (owner = system program). Address enforced by seeds/bump.
    #[account(
        init,
        payer = signer,
        space = 0,
        owner = anchor_lang::solana_program::system_program::ID,
        seeds = [crate::TREASURY_SEED],
        bump
    )]
    pub treasury: UncheckedAccount<'info>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct ModifyGlobalData<'info> {
    #[account(
        mut,
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    pub signer: Signer<'info>,
}

#[derive(Accounts)]
pub struct SetRewardMode<'info> {
    #[account(
        mut,
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    pub signer: Signer<'info>,
}

#[derive(Accounts)]
pub struct SetAdmin<'info> {
    #[account(
        mut,
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    pub signer: Signer<'info>,
}

#[derive(Accounts)]
pub struct DepositToPool<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    #[account(mut, address = global_data.holder)]
    pub holder: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = signer_token_account.owner == signer.key(),
        constraint = signer_token_account.mint == global_data.mint
    )]
    pub signer_token_account: Account<'info, TokenAccount>,

    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct WithdrawFromPool<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    /// CHECK: token authority PDA
    #[account(seeds = [crate::AUTH_SEED], bump = global_data.auth_bump)]
    pub auth: UncheckedAccount<'info>,

    #[account(mut, address = global_data.holder)]
    pub holder: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = signer_token_account.owner == signer.key(),
        constraint = signer_token_account.mint == global_data.mint
    )]
    pub signer_token_account: Account<'info, TokenAccount>,

    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct WithdrawTreasury<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    /// CHECK: System-owned PDA. Address enforced.
    #[account(
        mut,
        seeds = [crate::TREASURY_SEED],
        bump = global_data.treasury_bump,
        address = global_data.treasury
    )]
    pub treasury: UncheckedAccount<'info>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// Epochs
// ----------------------------

#[derive(Accounts)]
#[instruction(next_epoch: u64)]
pub struct NewEpoch<'info> {
    #[account(
        mut,
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Box<Account<'info, GlobalDataAccount>>,

    /// Ledger of the epoch being closed. Matched against the current epoch in
    /// the handler so a stale record fails with `WrongEpochRecord`.
    #[account(mut)]
    pub prev_epoch_account: Box<Account<'info, EpochAccount>>,

    /// `init_if_needed` so a replayed or backwards epoch number reaches the
    /// handler and fails with `EpochOutOfOrder`.
    #[account(
        init_if_needed,
        payer = signer,
        space = 8 + EpochAccount::INIT_SPACE,
        seeds = [crate::EPOCH_SEED, next_epoch.to_le_bytes().as_ref()],
        bump
    )]
    pub new_epoch_account: Box<Account<'info, EpochAccount>>,

    #[account(address = global_data.holder)]
    pub holder: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// Per-user records
// ----------------------------

// The explicit create instructions use `init_if_needed` and let the handler
// report an existing record as `AlreadyInitialized`.

#[derive(Accounts)]
pub struct CreateDataAccount<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    #[account(
        init_if_needed,
        payer = signer,
        space = 8 + UserDataAccount::INIT_SPACE,
        seeds = [crate::DATA_SEED, signer.key().as_ref()],
        bump
    )]
    pub user_data: Account<'info, UserDataAccount>,

    #[account(
        init_if_needed,
        payer = signer,
        space = 8 + UserStatsAccount::INIT_SPACE,
        seeds = [crate::STATS_SEED, signer.key().as_ref()],
        bump
    )]
    pub user_stats: Account<'info, UserStatsAccount>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(series_id: u64)]
pub struct CreateLockAccount<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    #[account(
        init_if_needed,
        payer = signer,
        space = 8 + LockAccount::INIT_SPACE,
        seeds = [crate::LOCK_SEED, signer.key().as_ref(), series_id.to_le_bytes().as_ref()],
        bump
    )]
    pub lock_account: Account<'info, LockAccount>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(series_id: u64)]
pub struct Lock<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Box<Account<'info, GlobalDataAccount>>,

    #[account(
        mut,
        seeds = [crate::LOCK_SEED, signer.key().as_ref(), series_id.to_le_bytes().as_ref()],
        bump = lock_account.bump,
        constraint = lock_account.owner == signer.key() @ ReserveError::Unauthorized
    )]
    pub lock_account: Box<Account<'info, LockAccount>>,

    #[account(
        init_if_needed,
        payer = signer,
        space = 8 + UserDataAccount::INIT_SPACE,
        seeds = [crate::DATA_SEED, signer.key().as_ref()],
        bump
    )]
    pub user_data: Box<Account<'info, UserDataAccount>>,

    #[account(
        mut,
        constraint = signer_token_account.owner == signer.key(),
        constraint = signer_token_account.mint == global_data.mint
    )]
    pub signer_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut, address = global_data.locked_vault)]
    pub locked_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(series_id: u64)]
pub struct Unlock<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Box<Account<'info, GlobalDataAccount>>,

    #[account(
        mut,
        seeds = [crate::LOCK_SEED, signer.key().as_ref(), series_id.to_le_bytes().as_ref()],
        bump = lock_account.bump,
        constraint = lock_account.owner == signer.key() @ ReserveError::Unauthorized
    )]
    pub lock_account: Box<Account<'info, LockAccount>>,

    #[account(
        mut,
        seeds = [crate::DATA_SEED, signer.key().as_ref()],
        bump = user_data.bump
    )]
    pub user_data: Box<Account<'info, UserDataAccount>>,

    /// CHECK: token authority PDA
    #[account(seeds = [crate::AUTH_SEED], bump = global_data.auth_bump)]
    pub auth: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = signer_token_account.owner == signer.key(),
        constraint = signer_token_account.mint == global_data.mint
    )]
    pub signer_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut, address = global_data.locked_vault)]
    pub locked_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

// ----------------------------
// Votes / claims
// ----------------------------

#[derive(Accounts)]
#[instruction(epoch: u64)]
pub struct CreateVoteAccount<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Account<'info, GlobalDataAccount>,

    #[account(
        init_if_needed,
        payer = signer,
        space = 8 + VoteAccount::INIT_SPACE,
        seeds = [crate::VOTE_SEED, signer.key().as_ref(), epoch.to_le_bytes().as_ref()],
        bump
    )]
    pub vote_account: Account<'info, VoteAccount>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(epoch: u64)]
pub struct Vote<'info> {
    #[account(
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Box<Account<'info, GlobalDataAccount>>,

    #[account(
        mut,
        seeds = [crate::EPOCH_SEED, epoch.to_le_bytes().as_ref()],
        bump = epoch_account.bump
    )]
    pub epoch_account: Box<Account<'info, EpochAccount>>,

    #[account(
        seeds = [crate::DATA_SEED, signer.key().as_ref()],
        bump = user_data.bump
    )]
    pub user_data: Box<Account<'info, UserDataAccount>>,

    #[account(
        init_if_needed,
        payer = signer,
        space = 8 + VoteAccount::INIT_SPACE,
        seeds = [crate::VOTE_SEED, signer.key().as_ref(), epoch.to_le_bytes().as_ref()],
        bump
    )]
    pub vote_account: Box<Account<'info, VoteAccount>>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(epoch: u64)]
pub struct Claim<'info> {
    #[account(
        mut,
        seeds = [crate::GLOBAL_SEED],
        bump = global_data.bump
    )]
    pub global_data: Box<Account<'info, GlobalDataAccount>>,

    #[account(
        seeds = [crate::EPOCH_SEED, epoch.to_le_bytes().as_ref()],
        bump = epoch_account.bump
    )]
    pub epoch_account: Box<Account<'info, EpochAccount>>,

    /// CHECK: may already be closed; the handler maps a missing record to
    /// `NothingToClaim` and deserializes it otherwise.
    #[account(
        mut,
        seeds = [crate::VOTE_SEED, signer.key().as_ref(), epoch.to_le_bytes().as_ref()],
        bump
    )]
    pub vote_account: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = signer,
        space = 8 + UserStatsAccount::INIT_SPACE,
        seeds = [crate::STATS_SEED, signer.key().as_ref()],
        bump
    )]
    pub user_stats: Box<Account<'info, UserStatsAccount>>,

    /// CHECK: token authority PDA
    #[account(seeds = [crate::AUTH_SEED], bump = global_data.auth_bump)]
    pub auth: UncheckedAccount<'info>,

    #[account(mut, address = global_data.holder)]
    pub holder: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = signer_token_account.owner == signer.key(),
        constraint = signer_token_account.mint == global_data.mint
    )]
    pub signer_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}
