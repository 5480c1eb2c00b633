use anchor_lang::prelude::*;

#[error_code]
pub enum ReserveError {
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Already initialized")]
    AlreadyInitialized,
    #[msg("Record not found")]
    NotFound,

    // -----------------
    // Epoch sequencing
    // -----------------
    #[msg("Epoch out of order (must be current + 1)")]
    EpochOutOfOrder,
    #[msg("Epoch record does not match the current epoch")]
    WrongEpochRecord,
    #[msg("Epoch is closed")]
    EpochClosed,
    #[msg("Epoch is still open")]
    EpochStillOpen,
    #[msg("Epoch length has not elapsed")]
    EpochNotElapsed,

    // -----------------
    // Locks
    // -----------------
    #[msg("Position is still locked")]
    StillLocked,
    #[msg("Insufficient locked amount")]
    InsufficientLocked,

    // -----------------
    // Votes / claims
    // -----------------
    #[msg("Vote exceeds remaining voting power")]
    InsufficientVotingPower,
    #[msg("Nothing to claim for this epoch")]
    NothingToClaim,

    #[msg("Insufficient funds")]
    InsufficientFunds,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,

    // -----------------
    // Parameters
    // -----------------
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Invalid reward percent (must be <= 100)")]
    InvalidRewardPercent,
    #[msg("Invalid reward mode")]
    InvalidRewardMode,
    #[msg("Invalid admin")]
    InvalidAdmin,
}
