//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt};

/// Directives used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVES: &str = "server=info,services=info,db=info,tower_http=info";

/// Install the global `fmt` subscriber. Honours `RUST_LOG` and falls back to
/// `default_directives`. Calling it twice is a no-op.
pub fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    if fmt().with_env_filter(filter).with_target(true).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
