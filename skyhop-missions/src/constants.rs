//! Shared constants for mission persistence and scheduling.

/// Prefix applied to every mission record key.
pub const DEFAULT_KEY_PREFIX: &str = "mission_";
/// Scalar entry holding the date of the last daily reset.
pub const DEFAULT_DAILY_RESET_KEY: &str = "missions_last_daily_reset";
/// Scalar entry holding the date of the last weekly reset.
pub const DEFAULT_WEEKLY_RESET_KEY: &str = "missions_last_weekly_reset";
/// Scalar entry holding the soft-currency balance.
pub const DEFAULT_CURRENCY_KEY: &str = "currency.balance";
/// Prefix applied to unlock flags.
pub const DEFAULT_UNLOCK_PREFIX: &str = "unlock.";

/// Format used for persisted reset dates.
pub const RESET_DATE_FORMAT: &str = "%Y-%m-%d";
/// Days between weekly boundaries.
pub const DAYS_PER_WEEK: i64 = 7;
