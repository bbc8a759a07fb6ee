//! Logging setup shared by the `qrscan` binary and embedding hosts.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "rust_qr_scan=info,qrscan=info";

/// Install a stderr `tracing` subscriber
///
/// `RUST_LOG` wins when set; otherwise `verbose` switches the crate to debug.
/// Calling this twice is harmless: the second call reports an error and the
/// first subscriber stays installed.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("rust_qr_scan=debug,qrscan=debug")
        } else {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
