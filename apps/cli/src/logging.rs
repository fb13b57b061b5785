use anyhow::{Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a compact stderr subscriber; `RUST_LOG` still overrides the default level.
///
/// Stdout is reserved for command output.
pub(crate) fn init(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer().compact().with_writer(std::io::stderr).with_ansi(false))
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
