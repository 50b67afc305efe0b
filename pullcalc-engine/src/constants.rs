//! Centralized preset and tuning constants for the pull-count engine.
//!
//! Rates are stored as `(mantissa, scale)` pairs so every preset value is an
//! exact decimal; nothing here passes through binary floating point.

// Precision ------------------------------------------------------------------
/// Significant digits kept per accumulated cell (about a 256-bit mantissa).
pub const DEFAULT_PRECISION_DIGITS: u64 = 80;
/// Lower bound accepted by configuration validation.
pub const MIN_PRECISION_DIGITS: u64 = 30;
/// Fractional digits printed in exported tables.
pub const TABLE_FRACTION_DIGITS: usize = 24;

// Primary resource (90-draw pool, two-outcome selection) ----------------------
pub const PRIMARY_LABEL: &str = "primary";
pub const PRIMARY_POOL_SIZE: usize = 90;
pub const PRIMARY_BASE_RATE: (i64, i64) = (6, 3);
pub const PRIMARY_PITY_START: usize = 73;
pub const PRIMARY_PITY_INCREMENT: (i64, i64) = (6, 2);
pub const PRIMARY_LEVELS: usize = 7;

// Secondary resource (80-draw pool, dual-feature selection) -------------------
pub const SECONDARY_LABEL: &str = "secondary";
pub const SECONDARY_POOL_SIZE: usize = 80;
pub const SECONDARY_BASE_RATE: (i64, i64) = (7, 3);
pub const SECONDARY_PITY_START: usize = 62;
pub const SECONDARY_PITY_INCREMENT: (i64, i64) = (7, 2);
pub const SECONDARY_LEVELS: usize = 5;

// Selection -------------------------------------------------------------------
/// Two-outcome split weight applied at both lookahead offsets.
pub const FIFTY_FIFTY_WEIGHT: (i64, i64) = (5, 1);
/// Chance a rare occurrence lands in the featured pair.
pub const FATE_POINT_FEATURED_RATE: (i64, i64) = (75, 2);
/// Chance a featured occurrence is the specific item.
pub const FATE_POINT_SPECIFIC_RATE: (i64, i64) = (5, 1);
