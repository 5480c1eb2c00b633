use anchor_lang::prelude::*;

// Events for off-chain indexers. Each carries the post-state of the
// records the instruction touched.

#[event]
pub struct Initialized {
    pub admin: Pubkey,
    pub mint: Pubkey,
    pub holder: Pubkey,
    pub locked_vault: Pubkey,
    pub epoch: u64,
}

#[event]
pub struct GlobalDataModified {
    pub admin: Pubkey,
    pub epoch_length: u64,
    pub epoch_lock_time: u64,
    pub reward_mode: u8,
    pub reward_amount: u64,
    pub reward_percent: u64,
}

#[event]
pub struct AdminChanged {
    pub previous: Pubkey,
    pub admin: Pubkey,
}

#[event]
pub struct PoolDeposited {
    pub amount: u64,
    pub pool_balance: u64,
}

#[event]
pub struct PoolWithdrawn {
    pub amount: u64,
    pub pool_balance: u64,
    pub reserved_rewards: u64,
}

#[event]
pub struct TreasuryWithdrawn {
    pub admin: Pubkey,
    pub lamports: u64,
}

/// Emitted when an epoch is frozen and its successor opened.
#[event]
pub struct EpochClosed {
    pub epoch: u64,
    pub winner: u64,
    pub reward: u64,
    pub voters: u64,
    pub reserved_rewards: u64,
    pub closed_by: Pubkey,
}

#[event]
pub struct LockCreated {
    pub owner: Pubkey,
    pub series_id: u64,
}

#[event]
pub struct Locked {
    pub owner: Pubkey,
    pub series_id: u64,
    pub amount: u64,
    pub lock_amount: u64,
    pub unlock_epoch: u64,
    pub voting_power: u64,
}

#[event]
pub struct Unlocked {
    pub owner: Pubkey,
    pub series_id: u64,
    pub amount: u64,
    pub lock_amount: u64,
    pub voting_power: u64,
    pub closed: bool,
}

#[event]
pub struct VoteCast {
    pub owner: Pubkey,
    pub epoch: u64,
    pub weight: u64,
    pub created: bool,
}

#[event]
pub struct Claimed {
    pub owner: Pubkey,
    pub epoch: u64,
    pub payout: u64,
    pub amount_claimed: u64,
}
