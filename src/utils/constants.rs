//! Shared constants used throughout the engine.

/// Chrome user agent string applied when a configuration does not specify
/// its own.
///
/// Updated: 2025-01-29 to Chrome 132 (current stable).
/// Reference: <https://chromiumdash.appspot.com/schedule>
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Default viewport width, in CSS pixels.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1920;

/// Default viewport height, in CSS pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1080;

/// Number of domains considered during cold-start similarity lookup.
pub const COLD_START_NEIGHBOR_LIMIT: i64 = 5;

/// Minimum confidence a similar domain must have before its configuration
/// is adopted as a cold-start seed.
pub const COLD_START_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Window size, in outcomes, used for drift detection's "recent" bucket.
pub const DRIFT_RECENT_WINDOW: i64 = 10;

/// Historical success rate floor for drift detection to trigger.
pub const DRIFT_HISTORICAL_FLOOR: f64 = 0.8;

/// Recent success rate ceiling for drift detection to trigger.
pub const DRIFT_RECENT_CEILING: f64 = 0.3;
