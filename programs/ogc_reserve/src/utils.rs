use anchor_lang::prelude::*;

use crate::{
    constants::{NUM_FIELDS, PERCENT_DENOMINATOR},
    errors::ReserveError,
    state::RewardMode,
};

// -----------------
// Seeds
// -----------------
pub const GLOBAL_SEED: &[u8] = b"global";
pub const EPOCH_SEED: &[u8] = b"epoch";
pub const LOCK_SEED: &[u8] = b"lock";
pub const VOTE_SEED: &[u8] = b"vote";
pub const DATA_SEED: &[u8] = b"data";
pub const STATS_SEED: &[u8] = b"stats";

pub const HOLDER_SEED: &[u8] = b"holder";
pub const LOCKED_SEED: &[u8] = b"locked";
pub const AUTH_SEED: &[u8] = b"auth";
pub const TREASURY_SEED: &[u8] = b"treasury";

/// Canonical address of an epoch ledger given its stored epoch and bump.
pub fn epoch_address(program_id: &Pubkey, epoch: u64, bump: u8) -> Result<Pubkey> {
    Pubkey::create_program_address(
        &[EPOCH_SEED, epoch.to_le_bytes().as_ref(), &[bump]],
        program_id,
    )
    .map_err(|_| error!(ReserveError::WrongEpochRecord))
}

// -------------------------
// Tally helpers
// -------------------------

/// Index of the largest tally. Ties go to the lowest index, so an all-zero
/// tally elects field 0.
pub fn winning_field(fields: &[u64; NUM_FIELDS]) -> usize {
    let mut best = 0usize;
    for (i, v) in fields.iter().enumerate().skip(1) {
        if *v > fields[best] {
            best = i;
        }
    }
    best
}

pub fn sum_fields(fields: &[u64; NUM_FIELDS]) -> Result<u64> {
    fields.iter().try_fold(0u64, |acc, v| {
        acc.checked_add(*v)
            .ok_or_else(|| error!(ReserveError::ArithmeticOverflow))
    })
}

/// Element-wise `a + b`, failing on the first overflowing slot. Returns a
/// fresh array so callers can commit only once every slot is known good.
pub fn add_fields(
    a: &[u64; NUM_FIELDS],
    b: &[u64; NUM_FIELDS],
) -> Result<[u64; NUM_FIELDS]> {
    let mut out = [0u64; NUM_FIELDS];
    for i in 0..NUM_FIELDS {
        out[i] = a[i]
            .checked_add(b[i])
            .ok_or_else(|| error!(ReserveError::ArithmeticOverflow))?;
    }
    Ok(out)
}

// -------------------------
// Reward math
// -------------------------

/// Part of the reward pool not already promised to closed epochs.
pub fn available_pool(pool_balance: u64, reserved_rewards: u64) -> u64 {
    pool_balance.saturating_sub(reserved_rewards)
}

pub fn epoch_reward(
    mode: RewardMode,
    reward_amount: u64,
    reward_percent: u64,
    available: u64,
) -> Result<u64> {
    match mode {
        RewardMode::Fixed => Ok(reward_amount.min(available)),
        RewardMode::PoolPercent => {
            require!(
                reward_percent <= PERCENT_DENOMINATOR,
                ReserveError::InvalidRewardPercent
            );
            let reward = (available as u128)
                .checked_mul(reward_percent as u128)
                .ok_or(ReserveError::ArithmeticOverflow)?
                .checked_div(PERCENT_DENOMINATOR as u128)
                .ok_or(ReserveError::ArithmeticOverflow)?;
            u64::try_from(reward).map_err(|_| error!(ReserveError::ArithmeticOverflow))
        }
    }
}

/// `reward * own_weight / total_weight`, truncating.
pub fn winner_payout(reward: u64, own_weight: u64, total_weight: u64) -> Result<u64> {
    if own_weight == 0 || total_weight == 0 {
        return Ok(0);
    }
    // own_weight is part of total_weight; anything else would pay out more than the reward
    require!(own_weight <= total_weight, ReserveError::InsufficientFunds);

    let payout = (reward as u128)
        .checked_mul(own_weight as u128)
        .ok_or(ReserveError::ArithmeticOverflow)?
        .checked_div(total_weight as u128)
        .ok_or(ReserveError::ArithmeticOverflow)?;
    u64::try_from(payout).map_err(|_| error!(ReserveError::ArithmeticOverflow))
}

/// Lamports that can leave the treasury while keeping `min_reserve` behind.
pub fn treasury_sweep_amount(lamports: u64, min_reserve: u64) -> u64 {
    lamports.saturating_sub(min_reserve)
}
