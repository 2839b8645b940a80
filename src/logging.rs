//! Logging setup

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logger(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if settings.json { builder.json().try_init() } else { builder.try_init() };
    installed.map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))?;
    Ok(())
}
