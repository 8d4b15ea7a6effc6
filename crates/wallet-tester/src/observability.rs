//! Where workflow results go, and logging setup for the binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Receives transaction identifiers and signatures produced by workflows.
///
/// `log` is a plain record; `notify` is meant to reach the user directly.
pub trait ActivitySink: Send + Sync {
    fn log(&self, entry: &str);
    fn notify(&self, message: &str);
}

/// Forwards everything to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ActivitySink for TracingSink {
    fn log(&self, entry: &str) {
        tracing::info!(target: "wallet_tester::activity", "{entry}");
    }

    fn notify(&self, message: &str) {
        tracing::info!(target: "wallet_tester::notification", "{message}");
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `default_filter`.
pub fn init_logging(default_filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
