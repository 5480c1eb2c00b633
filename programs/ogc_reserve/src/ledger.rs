//! Epoch / lock / vote / claim transitions.
//!
//! Every function here validates and computes into locals first and only
//! then writes to the records it was handed, so an `Err` leaves all of them
//! exactly as they were. Instruction handlers own the account plumbing and
//! token CPIs; the ledger rules live here.

use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::ReserveError,
    state::{
        EpochAccount, GlobalDataAccount, LockAccount, RewardMode, UserDataAccount,
        UserStatsAccount, VoteAccount,
    },
    utils::{add_fields, available_pool, epoch_reward, sum_fields, winner_payout, winning_field},
};

/// Result of a get-or-create on a keyed record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    Existing,
}

/// Frozen outcome of an epoch, as written into its ledger record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochClosure {
    pub epoch: u64,
    pub winner: u64,
    pub reward: u64,
    pub voters: u64,
}

// -------------------------
// Admin
// -------------------------

pub fn assert_admin(cfg: &GlobalDataAccount, signer: &Pubkey) -> Result<()> {
    require_keys_eq!(cfg.admin, *signer, ReserveError::Unauthorized);
    Ok(())
}

pub fn initialize_core(
    cfg: &mut GlobalDataAccount,
    genesis: &mut EpochAccount,
    admin: Pubkey,
    now: i64,
) -> Result<()> {
    // `initialize` creates both records with `init`, so on chain a repeat call
    // is refused by account creation before reaching this guard.
    require!(
        cfg.version == 0 && cfg.admin == Pubkey::default(),
        ReserveError::AlreadyInitialized
    );
    require!(admin != Pubkey::default(), ReserveError::InvalidAdmin);

    cfg.admin = admin;
    cfg.epoch = INITIAL_EPOCH;
    cfg.epoch_start_ts = now;
    cfg.epoch_length = DEFAULT_EPOCH_LENGTH;
    cfg.epoch_lock_time = DEFAULT_EPOCH_LOCK_TIME;
    cfg.reward_mode = RewardMode::PoolPercent as u8;
    cfg.reward_amount = DEFAULT_REWARD_AMOUNT;
    cfg.reward_percent = DEFAULT_REWARD_PERCENT;
    cfg.reserved_rewards = 0;
    cfg.version = INITIAL_VERSION;

    *genesis = EpochAccount {
        epoch: INITIAL_EPOCH,
        bump: genesis.bump,
        opened_ts: now,
        ..EpochAccount::default()
    };

    Ok(())
}

/// Overwrites the three tunables. `reward_param` goes to whichever reward
/// parameter the active mode reads.
pub fn modify_global_data_core(
    cfg: &mut GlobalDataAccount,
    signer: &Pubkey,
    epoch_length: u64,
    reward_param: u64,
    epoch_lock_time: u64,
) -> Result<()> {
    assert_admin(cfg, signer)?;
    let mode = RewardMode::try_from(cfg.reward_mode)?;
    if mode == RewardMode::PoolPercent {
        require!(
            reward_param <= PERCENT_DENOMINATOR,
            ReserveError::InvalidRewardPercent
        );
    }

    cfg.epoch_length = epoch_length;
    cfg.epoch_lock_time = epoch_lock_time;
    match mode {
        RewardMode::Fixed => cfg.reward_amount = reward_param,
        RewardMode::PoolPercent => cfg.reward_percent = reward_param,
    }
    Ok(())
}

pub fn set_reward_mode_core(
    cfg: &mut GlobalDataAccount,
    signer: &Pubkey,
    mode: u8,
    reward_param: u64,
) -> Result<()> {
    assert_admin(cfg, signer)?;
    let mode = RewardMode::try_from(mode)?;
    match mode {
        RewardMode::Fixed => cfg.reward_amount = reward_param,
        RewardMode::PoolPercent => {
            require!(
                reward_param <= PERCENT_DENOMINATOR,
                ReserveError::InvalidRewardPercent
            );
            cfg.reward_percent = reward_param;
        }
    }
    cfg.reward_mode = mode as u8;
    Ok(())
}

pub fn set_admin_core(
    cfg: &mut GlobalDataAccount,
    signer: &Pubkey,
    new_admin: Pubkey,
) -> Result<()> {
    assert_admin(cfg, signer)?;
    require!(new_admin != Pubkey::default(), ReserveError::InvalidAdmin);
    cfg.admin = new_admin;
    Ok(())
}

/// Pool withdrawals may only touch the part not owed to closed epochs.
pub fn check_pool_withdrawal(
    cfg: &GlobalDataAccount,
    pool_balance: u64,
    amount: u64,
) -> Result<()> {
    require!(amount > 0, ReserveError::InvalidAmount);
    require!(
        amount <= available_pool(pool_balance, cfg.reserved_rewards),
        ReserveError::InsufficientFunds
    );
    Ok(())
}

// -------------------------
// Epoch advancement
// -------------------------

/// Closes the current epoch and opens `next_epoch`.
///
/// `closing` must be the ledger of the current epoch and `opening` an
/// untouched record. The admin may advance at any time; anyone else only
/// once `epoch_length` seconds have passed since the epoch opened.
#[allow(clippy::too_many_arguments)]
pub fn new_epoch_core(
    cfg: &mut GlobalDataAccount,
    closing: &mut EpochAccount,
    opening: &mut EpochAccount,
    opening_bump: u8,
    caller: &Pubkey,
    next_epoch: u64,
    pool_balance: u64,
    now: i64,
) -> Result<EpochClosure> {
    let expected = cfg
        .epoch
        .checked_add(1)
        .ok_or(ReserveError::ArithmeticOverflow)?;
    require!(next_epoch == expected, ReserveError::EpochOutOfOrder);
    require!(
        opening.epoch == 0 && !opening.closed && opening.opened_ts == 0,
        ReserveError::AlreadyInitialized
    );
    require!(
        closing.epoch == cfg.epoch && !closing.closed,
        ReserveError::WrongEpochRecord
    );

    if *caller != cfg.admin {
        let length = i64::try_from(cfg.epoch_length)
            .map_err(|_| error!(ReserveError::ArithmeticOverflow))?;
        let ends_at = cfg
            .epoch_start_ts
            .checked_add(length)
            .ok_or(ReserveError::ArithmeticOverflow)?;
        require!(now >= ends_at, ReserveError::EpochNotElapsed);
    }

    let winner = winning_field(&closing.fields);
    let reward = if closing.fields[winner] == 0 {
        0
    } else {
        epoch_reward(
            RewardMode::try_from(cfg.reward_mode)?,
            cfg.reward_amount,
            cfg.reward_percent,
            available_pool(pool_balance, cfg.reserved_rewards),
        )?
    };
    let reserved = cfg
        .reserved_rewards
        .checked_add(reward)
        .ok_or(ReserveError::ArithmeticOverflow)?;

    closing.winner = winner as u64;
    closing.reward = reward;
    closing.closed = true;
    closing.closed_ts = now;

    *opening = EpochAccount {
        epoch: next_epoch,
        bump: opening_bump,
        opened_ts: now,
        ..EpochAccount::default()
    };

    cfg.epoch = next_epoch;
    cfg.epoch_start_ts = now;
    cfg.reserved_rewards = reserved;

    Ok(EpochClosure {
        epoch: closing.epoch,
        winner: closing.winner,
        reward,
        voters: closing.voters,
    })
}

// -------------------------
// Per-user records
// -------------------------

pub fn open_user_data(data: &mut UserDataAccount, owner: Pubkey, bump: u8) -> Result<Provisioned> {
    if data.owner == Pubkey::default() {
        *data = UserDataAccount {
            owner,
            bump,
            amount: 0,
        };
        return Ok(Provisioned::Created);
    }
    require_keys_eq!(data.owner, owner, ReserveError::Unauthorized);
    Ok(Provisioned::Existing)
}

pub fn open_user_stats(
    stats: &mut UserStatsAccount,
    owner: Pubkey,
    bump: u8,
) -> Result<Provisioned> {
    if stats.owner == Pubkey::default() {
        *stats = UserStatsAccount {
            owner,
            bump,
            ..UserStatsAccount::default()
        };
        return Ok(Provisioned::Created);
    }
    require_keys_eq!(stats.owner, owner, ReserveError::Unauthorized);
    Ok(Provisioned::Existing)
}

// -------------------------
// Locks
// -------------------------

pub fn create_lock_core(
    lock: &mut LockAccount,
    owner: Pubkey,
    series_id: u64,
    bump: u8,
) -> Result<()> {
    require!(lock.owner == Pubkey::default(), ReserveError::AlreadyInitialized);
    *lock = LockAccount {
        owner,
        series_id,
        bump,
        ..LockAccount::default()
    };
    Ok(())
}

/// Adds `amount` to the lock and the owner's voting power, pushing the
/// unlock horizon to `epoch + epoch_lock_time` (never earlier than it was).
pub fn lock_core(
    cfg: &GlobalDataAccount,
    lock: &mut LockAccount,
    data: &mut UserDataAccount,
    amount: u64,
) -> Result<()> {
    require!(amount > 0, ReserveError::InvalidAmount);
    require_keys_eq!(lock.owner, data.owner, ReserveError::Unauthorized);

    let locked = lock
        .amount
        .checked_add(amount)
        .ok_or(ReserveError::ArithmeticOverflow)?;
    let power = data
        .amount
        .checked_add(amount)
        .ok_or(ReserveError::ArithmeticOverflow)?;
    let horizon = cfg
        .epoch
        .checked_add(cfg.epoch_lock_time)
        .ok_or(ReserveError::ArithmeticOverflow)?;

    lock.amount = locked;
    lock.unlock_epoch = lock.unlock_epoch.max(horizon);
    lock.last_lock_epoch = cfg.epoch;
    data.amount = power;
    Ok(())
}

/// Releases `amount` from the lock. Returns `true` when the lock is now
/// empty and its record must be closed.
pub fn unlock_core(
    cfg: &GlobalDataAccount,
    lock: &mut LockAccount,
    data: &mut UserDataAccount,
    amount: u64,
) -> Result<bool> {
    require!(amount > 0, ReserveError::InvalidAmount);
    require_keys_eq!(lock.owner, data.owner, ReserveError::Unauthorized);
    require!(cfg.epoch >= lock.unlock_epoch, ReserveError::StillLocked);
    require!(amount <= lock.amount, ReserveError::InsufficientLocked);

    let power = data
        .amount
        .checked_sub(amount)
        .ok_or(ReserveError::ArithmeticOverflow)?;

    lock.amount -= amount;
    data.amount = power;
    Ok(lock.amount == 0)
}

// -------------------------
// Votes
// -------------------------

pub fn open_vote_core(
    cfg: &GlobalDataAccount,
    vote: &mut VoteAccount,
    owner: Pubkey,
    epoch: u64,
    bump: u8,
) -> Result<Provisioned> {
    require!(epoch == cfg.epoch, ReserveError::EpochClosed);

    if vote.owner == Pubkey::default() {
        *vote = VoteAccount {
            owner,
            epoch,
            bump,
            fields: [0u64; NUM_FIELDS],
        };
        return Ok(Provisioned::Created);
    }
    require_keys_eq!(vote.owner, owner, ReserveError::Unauthorized);
    require!(vote.epoch == epoch, ReserveError::WrongEpochRecord);
    Ok(Provisioned::Existing)
}

/// Explicit vote-record creation; an existing record is an error here.
pub fn create_vote_core(
    cfg: &GlobalDataAccount,
    vote: &mut VoteAccount,
    owner: Pubkey,
    epoch: u64,
    bump: u8,
) -> Result<()> {
    let provisioned = open_vote_core(cfg, vote, owner, epoch, bump)?;
    require!(
        provisioned == Provisioned::Created,
        ReserveError::AlreadyInitialized
    );
    Ok(())
}

/// Adds `weights` to the caller's vote and to the epoch tally. The caller's
/// running total for the epoch may not exceed their locked balance.
/// Returns the weight added.
pub fn vote_core(
    cfg: &GlobalDataAccount,
    ledger: &mut EpochAccount,
    data: &UserDataAccount,
    vote: &mut VoteAccount,
    epoch: u64,
    weights: &[u64; NUM_FIELDS],
) -> Result<u64> {
    require!(epoch == cfg.epoch, ReserveError::EpochClosed);
    require!(ledger.epoch == epoch, ReserveError::WrongEpochRecord);
    require!(!ledger.closed, ReserveError::EpochClosed);
    require!(vote.epoch == epoch, ReserveError::WrongEpochRecord);
    require_keys_eq!(vote.owner, data.owner, ReserveError::Unauthorized);

    let delta = sum_fields(weights)?;
    require!(delta > 0, ReserveError::InvalidAmount);

    let committed = sum_fields(&vote.fields)?;
    let remaining = data.amount.saturating_sub(committed);
    require!(delta <= remaining, ReserveError::InsufficientVotingPower);

    let own = add_fields(&vote.fields, weights)?;
    let tally = add_fields(&ledger.fields, weights)?;
    let voters = ledger
        .voters
        .checked_add(1)
        .ok_or(ReserveError::ArithmeticOverflow)?;

    vote.fields = own;
    ledger.fields = tally;
    ledger.voters = voters;
    Ok(delta)
}

// -------------------------
// Claims
// -------------------------

/// Settles the caller's vote on a closed epoch. Returns the payout; the
/// caller transfers it and retires the vote record.
pub fn claim_core(
    cfg: &mut GlobalDataAccount,
    ledger: &EpochAccount,
    vote: Option<&VoteAccount>,
    stats: &mut UserStatsAccount,
    epoch: u64,
    pool_balance: u64,
) -> Result<u64> {
    require!(ledger.epoch == epoch, ReserveError::WrongEpochRecord);
    require!(ledger.closed, ReserveError::EpochStillOpen);

    let vote = vote.ok_or(ReserveError::NothingToClaim)?;
    require!(vote.epoch == epoch, ReserveError::NothingToClaim);
    require_keys_eq!(vote.owner, stats.owner, ReserveError::Unauthorized);

    let winner = usize::try_from(ledger.winner)
        .ok()
        .filter(|w| *w < NUM_FIELDS)
        .ok_or(ReserveError::WrongEpochRecord)?;
    let payout = winner_payout(ledger.reward, vote.fields[winner], ledger.fields[winner])?;

    require!(payout <= pool_balance, ReserveError::InsufficientFunds);
    let reserved = cfg
        .reserved_rewards
        .checked_sub(payout)
        .ok_or(ReserveError::InsufficientFunds)?;
    let claimed = stats
        .amount_claimed
        .checked_add(payout)
        .ok_or(ReserveError::ArithmeticOverflow)?;
    let claims = stats
        .claims
        .checked_add(1)
        .ok_or(ReserveError::ArithmeticOverflow)?;

    cfg.reserved_rewards = reserved;
    stats.amount_claimed = claimed;
    stats.claims = claims;
    stats.last_claimed_epoch = epoch;
    Ok(payout)
}
