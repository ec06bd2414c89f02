use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV_VAR: &str = "TOOLIT_LOG";

pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

// TOOLIT_LOG wins over the verbosity flag when set.
pub fn setup_logging(verbosity: u8, color: bool) -> Result<()> {
    let env_filter = match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid {} filter: {}", LOG_ENV_VAR, directives))?,
        _ => EnvFilter::new(default_directive(verbosity)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(color)
                .with_target(verbosity > 1)
                .without_time(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    tracing::debug!(verbosity, "logging initialized");

    Ok(())
}
