//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration (or fall back to built-in defaults)
//! - Bind the listener once the configuration is known to be good
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::path::Path;

use tokio::net::TcpListener;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::SiteConfig;
use crate::config::validation::validate_config;

/// Load the configuration file, or validated defaults when no path is given.
pub fn load_startup_config(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = SiteConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Log the settings that shape routing.
pub fn log_summary(config: &SiteConfig) {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_url = %config.site.base_url,
        default_locale = %config.site.default_locale,
        locales = config.locales.len(),
        legacy_routes = config.legacy.routes.len(),
        upstream = config.upstream.address.as_deref().unwrap_or("none"),
        "Configuration loaded"
    );
}

pub async fn bind_listener(config: &SiteConfig) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}
