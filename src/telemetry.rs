use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::{Config, LogFormat};

/// Default directives when `RUST_LOG` is unset.
fn default_filter() -> String {
    format!("{}=debug,tower_http=info", env!("CARGO_CRATE_NAME"))
}

/// Installs the global tracing subscriber.
pub fn init_telemetry(config: &Config) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let registry = Registry::default().with(env_filter);
    match config.app.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
    .context("Failed to initialize tracing subscriber")?;

    info!(
        service = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        environment = config.app.environment.as_str(),
        "Tracing subscriber initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_targets_this_crate() {
        let filter = default_filter();
        assert!(filter.starts_with(env!("CARGO_CRATE_NAME")));
        assert!(EnvFilter::try_new(filter).is_ok());
    }
}
