//! Logging prelude and subscriber setup
//!
//! Log output goes to stderr. Connection activity on the server is reported
//! by [`TracingSink`](crate::events::TracingSink) under the
//! `lan_transfer::events` target, one line per event prefixed with the peer
//! address. The accept loop logs under `lan_transfer::serve`, and a push that
//! ends a client session is logged under `lan_transfer::client`.
//!
//! Results meant for the user of the interactive client (transfer reports,
//! fetched paths, remote errors) are written to stdout and never go through
//! tracing.
//!
//! ```ignore
//! use crate::logging::*;
//!
//! warn!("({}) cannot serve fetch for {}: {}", peer, name, reason);
//! ```

pub use tracing::{debug, error, info, warn};

/// Initialize the tracing subscriber with environment filter support.
///
/// By default, logs at INFO level and above are displayed. Control the log level
/// with the `RUST_LOG` environment variable:
///
/// ```bash
/// RUST_LOG=debug lan-transfer server
/// RUST_LOG=lan_transfer::events=warn lan-transfer server --port 9000
/// ```
pub fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();
}

// vim: ts=4
