//! Logging setup for the replay binary.

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber on stderr (stdout carries the JSON report).
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks debug over info.
pub fn setup(verbose: bool) {
    let default_filter = if verbose {
        "tapguard_core=debug,tapguard_replay=debug"
    } else {
        "tapguard_core=info,tapguard_replay=info"
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!("Logging initialized (verbose={})", verbose);
}
