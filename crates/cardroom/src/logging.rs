//! Tracing subscriber setup for the `cardroom` binary.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. Matches every `cardroom*` crate.
pub const DEFAULT_FILTER: &str = "cardroom=info";

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Call once, early in `main`. Does nothing if a global subscriber is
/// already set (tests, embedding applications).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
