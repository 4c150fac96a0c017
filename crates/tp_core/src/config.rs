//! Compile-time tuning constants shared by the validators and templates.

/// Animation frame rate, used by the `F` time suffix.
pub const FPS: f64 = 60.0;

/// Logic tick rate of the runtime.
pub const LOGIC_FPS: f64 = 30.0;

/// Duration of one logic tick in seconds.
pub const LOGIC_SPF: f64 = 1.0 / LOGIC_FPS;

/// Warn about times that do not land on a logic tick.
pub const ENABLE_TIME_WARNING: bool = true;

/// Longest display name accepted for most resources.
pub const MAX_NAME_LEN: usize = 48;

/// Longest display name accepted for characters.
pub const MAX_CHARACTER_NAME_LEN: usize = 32;

/// Number of `+` upgrades that add up to one extra entry piece.
pub const MAX_ENTRY_PLUS: i64 = 3;

/// Extra window after an action ends in which derive levels may still apply.
pub const DERIVE_TAIL: f64 = 5.0;

/// Default export directory when neither a flag nor `OUTPUT_ASSET` is set.
pub const DEFAULT_OUTPUT_DIR: &str = "./out";
