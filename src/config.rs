//! Global configuration for gene file loading.
//!
//! Flags are set once at startup from the command line and read during
//! parsing.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the gene file reader accepts records with `start > end`.
///
/// The tree itself stores such records without complaint (they overlap
/// nothing), but a file containing them is usually a data error, so the
/// reader rejects them unless this is enabled.
static ALLOW_INVERTED: AtomicBool = AtomicBool::new(false);

/// Allow or reject inverted intervals during gene file parsing.
///
/// # Example
///
/// ```
/// use generange::config;
///
/// config::set_allow_inverted(true);
/// assert!(config::is_inverted_allowed());
/// config::set_allow_inverted(false);
/// ```
#[inline]
pub fn set_allow_inverted(enabled: bool) {
    ALLOW_INVERTED.store(enabled, Ordering::Release);
}

/// Check if inverted intervals are accepted by the reader.
#[inline]
pub fn is_inverted_allowed() -> bool {
    ALLOW_INVERTED.load(Ordering::Acquire)
}

/// Default TCP port for `generange serve`.
pub const DEFAULT_PORT: u16 = 8080;
