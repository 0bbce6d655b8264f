//! cli::logging
//!
//! Diagnostic logging setup.
//!
//! Events go to stderr through a `tracing-subscriber` fmt layer. `$UGH_LOG`
//! takes a full filter directive; without it the level follows `--debug`.

use std::io;

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "UGH_LOG";

/// The filter used when `$UGH_LOG` is unset or invalid.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "ugh=debug"
    } else {
        "ugh=warn"
    }
}

/// Install the global subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(debug);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
