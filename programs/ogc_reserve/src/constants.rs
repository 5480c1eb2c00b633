// Centralized Protocol Constants

// Voting layout
// =============

/// Number of fixed voting fields. Every tally and vote record is a
/// `[u64; NUM_FIELDS]`.
pub const NUM_FIELDS: usize = 16;

/// Percentages are expressed out of this denominator.
pub const PERCENT_DENOMINATOR: u64 = 100;

// Centralized Protocol Defaults
// =============================

/// Default epoch length in seconds. Only gates the permissionless
/// `new_epoch` crank; the admin may advance at any time.
pub const DEFAULT_EPOCH_LENGTH: u64 = 10;

/// Default number of epochs a lock stays locked after the last `lock` call.
pub const DEFAULT_EPOCH_LOCK_TIME: u64 = 1;

/// Default share of the available reward pool paid out per epoch.
pub const DEFAULT_REWARD_PERCENT: u64 = 10;

/// Default fixed reward (only used in fixed mode).
pub const DEFAULT_REWARD_AMOUNT: u64 = 0;

/// Initial version for account structures.
pub const INITIAL_VERSION: u16 = 1;

/// First epoch opened by `initialize`.
pub const INITIAL_EPOCH: u64 = 0;
