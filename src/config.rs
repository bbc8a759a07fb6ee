//! Runtime configuration for a scan session.
//!
//! Every knob has a default and can be overridden from `QR_SCAN_*` environment
//! variables. Unparseable values fall back to the default.

use std::str::FromStr;
use std::time::Duration;

use crate::decoder::engine::InversionMode;

/// Path prefix a scanned URL must carry to be navigable
pub const DEFAULT_PRODUCT_PREFIX: &str = "/products/";

/// Roughly one tick per 60 Hz display refresh
pub const DEFAULT_TICK_MS: u64 = 16;

/// How long an upload waits for the worker
pub const DEFAULT_STILL_TIMEOUT_MS: u64 = 2000;

/// VGA and larger frames take the parallel luma path
pub const DEFAULT_PARALLEL_MIN_PIXELS: usize = 640 * 480;

/// Longest side an uploaded image keeps before downscaling
pub const DEFAULT_MAX_STILL_DIM: u32 = 1600;

/// Session configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Scanned URLs must have a path starting with this prefix
    pub product_prefix: String,
    /// Inversion attempts made by the decoder engine
    pub inversion: InversionMode,
    /// Interval between live decode ticks
    pub tick_interval: Duration,
    /// How long an uploaded image waits for a decode outcome
    pub still_timeout: Duration,
    /// Frames with at least this many pixels are converted to luma in parallel
    pub parallel_min_pixels: usize,
    /// Uploaded images larger than this on either side are downscaled; 0 disables
    pub max_still_dimension: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            product_prefix: DEFAULT_PRODUCT_PREFIX.to_string(),
            inversion: InversionMode::default(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            still_timeout: Duration::from_millis(DEFAULT_STILL_TIMEOUT_MS),
            parallel_min_pixels: DEFAULT_PARALLEL_MIN_PIXELS,
            max_still_dimension: DEFAULT_MAX_STILL_DIM,
        }
    }
}

impl ScanConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let product_prefix = lookup("QR_SCAN_PRODUCT_PREFIX")
            .map(|v| v.trim().to_string())
            .filter(|v| v.starts_with('/'))
            .unwrap_or(defaults.product_prefix);

        Self {
            product_prefix,
            inversion: parse_or(&lookup, "QR_SCAN_INVERSION", defaults.inversion),
            tick_interval: Duration::from_millis(
                parse_or(&lookup, "QR_SCAN_TICK_MS", DEFAULT_TICK_MS).max(1),
            ),
            still_timeout: Duration::from_millis(parse_or(
                &lookup,
                "QR_SCAN_STILL_TIMEOUT_MS",
                DEFAULT_STILL_TIMEOUT_MS,
            )),
            parallel_min_pixels: parse_or(
                &lookup,
                "QR_SCAN_PARALLEL_MIN_PIXELS",
                DEFAULT_PARALLEL_MIN_PIXELS,
            ),
            max_still_dimension: parse_or(&lookup, "QR_SCAN_MAX_STILL_DIM", DEFAULT_MAX_STILL_DIM),
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
