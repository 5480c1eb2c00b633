use anchor_lang::prelude::*;

use crate::{constants::NUM_FIELDS, errors::ReserveError};

#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct GlobalDataAccount {
    pub admin: Pubkey,
    pub bump: u8,

    /// Currently open epoch.
    pub epoch: u64,
    /// Unix timestamp at which `epoch` was opened.
    pub epoch_start_ts: i64,

    // tunables
    pub epoch_length: u64,
    pub epoch_lock_time: u64,
    pub reward_mode: u8,
    pub reward_amount: u64,
    pub reward_percent: u64,

    /// Rewards assigned to closed epochs and not yet claimed.
    pub reserved_rewards: u64,

    // SPL plumbing
    pub mint: Pubkey,
    pub holder: Pubkey,
    pub locked_vault: Pubkey,
    pub auth_bump: u8,

    // Native balance PDA swept by `withdraw_treasury`
    pub treasury: Pubkey,
    pub treasury_bump: u8,

    pub version: u16,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardMode {
    Fixed = 0,
    PoolPercent = 1,
}

impl TryFrom<u8> for RewardMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(RewardMode::Fixed),
            1 => Ok(RewardMode::PoolPercent),
            _ => err!(ReserveError::InvalidRewardMode),
        }
    }
}

#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct EpochAccount {
    pub epoch: u64,
    pub bump: u8,

    pub fields: [u64; NUM_FIELDS],
    pub winner: u64,
    pub reward: u64,
    /// Number of `vote` calls, not distinct voters.
    pub voters: u64,

    pub closed: bool,
    pub opened_ts: i64,
    pub closed_ts: i64,
}

#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct LockAccount {
    pub owner: Pubkey,
    pub series_id: u64,
    pub bump: u8,

    pub amount: u64,
    pub unlock_epoch: u64,
    pub last_lock_epoch: u64,
}

#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct UserDataAccount {
    pub owner: Pubkey,
    pub bump: u8,

    /// Sum of every live lock of `owner`; the voting power source.
    pub amount: u64,
}

#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct VoteAccount {
    pub owner: Pubkey,
    pub epoch: u64,
    pub bump: u8,

    pub fields: [u64; NUM_FIELDS],
}

#[account]
#[derive(InitSpace, Default, Debug, PartialEq)]
pub struct UserStatsAccount {
    pub owner: Pubkey,
    pub bump: u8,

    pub amount_claimed: u64,
    pub claims: u64,
    pub last_claimed_epoch: u64,
}
