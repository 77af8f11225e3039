#![forbid(unsafe_code)]

//! Process-wide log subscriber.
//!
//! Library crates only emit `tracing` events; applications opt into output by
//! calling [`init`] once at startup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g.
/// `VISTA_LOG=vista_layout=debug`.
pub const ENV_VAR: &str = "VISTA_LOG";

/// Install the global subscriber. `default_filter` applies when
/// [`ENV_VAR`] is unset or invalid.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_env(ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    #[cfg(feature = "json")]
    let installed = builder.json().try_init().is_ok();
    #[cfg(not(feature = "json"))]
    let installed = builder.try_init().is_ok();

    if installed {
        tracing::debug!(env = ENV_VAR, "logging initialized");
    }
    installed
}
