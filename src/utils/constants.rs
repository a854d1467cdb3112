//! Shared configuration constants
//!
//! Default values used by the config layer and the pipeline, kept in one
//! place to avoid magic numbers.

/// Chrome user agent string presented by every session
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Pause after each lazy-load scroll step
pub const DEFAULT_SCROLL_SETTLE_MS: u64 = 100;

/// Upper bound on scroll steps so infinite-scroll pages terminate
pub const DEFAULT_MAX_SCROLL_STEPS: u32 = 50;

pub const DEFAULT_LAUNCH_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CLOSE_TIMEOUT_MS: u64 = 10_000;
