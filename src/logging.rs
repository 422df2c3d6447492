//! Tracing subscriber setup for the binary.

use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// Results go to stdout, so all diagnostics are kept on stderr. Calling this
/// twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_log = fmt::layer().with_writer(io::stderr).with_target(false);

    let _ = tracing_subscriber::registry()
        .with(stderr_log.with_filter(env_filter))
        .try_init();
}
