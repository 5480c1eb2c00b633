use anchor_lang::prelude::*;

pub mod constants;
pub mod contexts;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod state;
pub mod utils;

#[cfg(test)]
mod scenario_tests;

pub use constants::*;
pub use contexts::*;
pub use errors::*;
pub use events::*;
pub use instructions::*;
pub use state::*;
pub use utils::*;

use solana_security_txt::security_txt;

security_txt! {
    // Required fields
    name: "OGC Reserve",
    project_url: "https://github.com/ogc-reserve/ogc-reserve",
    contacts: "link:https://github.com/ogc-reserve/ogc-reserve/issues",
    policy: "https://github.com/ogc-reserve/ogc-reserve/blob/main/SECURITY.md",

    // Optional fields
    preferred_languages: "en",
    source_code: "https://github.com/ogc-reserve/ogc-reserve"
}

declare_id!("3WLtmZnhXgctq98BeEKZuXkKCAgMuDNzssrtA6KXqXxW");

#[program]
pub mod ogc_reserve {
    use super::*;
    use crate::instructions::{admin, claim, epoch, lock, vote};

    // ----------------------------
    // Admin
    // ----------------------------
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        admin::initialize(ctx)
    }

    pub fn modify_global_data(
        ctx: Context<ModifyGlobalData>,
        epoch_length: u64,
        reward_param: u64,
        epoch_lock_time: u64,
    ) -> Result<()> {
        admin::modify_global_data(ctx, epoch_length, reward_param, epoch_lock_time)
    }

    pub fn set_reward_mode(ctx: Context<SetRewardMode>, mode: u8, reward_param: u64) -> Result<()> {
        admin::set_reward_mode(ctx, mode, reward_param)
    }

    pub fn set_admin(ctx: Context<SetAdmin>, new_admin: Pubkey) -> Result<()> {
        admin::set_admin(ctx, new_admin)
    }

    pub fn deposit_to_pool(ctx: Context<DepositToPool>, amount: u64) -> Result<()> {
        admin::deposit_to_pool(ctx, amount)
    }

    pub fn withdraw_from_pool(ctx: Context<WithdrawFromPool>, amount: u64) -> Result<()> {
        admin::withdraw_from_pool(ctx, amount)
    }

    pub fn withdraw_treasury(ctx: Context<WithdrawTreasury>) -> Result<()> {
        admin::withdraw_treasury(ctx)
    }

    // ----------------------------
    // Epochs
    // ----------------------------
    pub fn new_epoch(ctx: Context<NewEpoch>, next_epoch: u64) -> Result<()> {
        epoch::new_epoch(ctx, next_epoch)
    }

    // ----------------------------
    // Locks
    // ----------------------------
    pub fn create_data_account(ctx: Context<CreateDataAccount>) -> Result<()> {
        lock::create_data_account(ctx)
    }

    pub fn create_lock_account(ctx: Context<CreateLockAccount>, series_id: u64) -> Result<()> {
        lock::create_lock_account(ctx, series_id)
    }

    pub fn lock(ctx: Context<Lock>, series_id: u64, amount: u64) -> Result<()> {
        lock::lock(ctx, series_id, amount)
    }

    pub fn unlock(ctx: Context<Unlock>, series_id: u64, amount: u64) -> Result<()> {
        lock::unlock(ctx, series_id, amount)
    }

    // ----------------------------
    // Votes / claims
    // ----------------------------
    pub fn create_vote_account(ctx: Context<CreateVoteAccount>, epoch: u64) -> Result<()> {
        vote::create_vote_account(ctx, epoch)
    }

    pub fn vote(ctx: Context<Vote>, epoch: u64, weights: [u64; NUM_FIELDS]) -> Result<()> {
        vote::vote(ctx, epoch, weights)
    }

    pub fn claim(ctx: Context<Claim>, epoch: u64) -> Result<()> {
        claim::claim(ctx, epoch)
    }
}
