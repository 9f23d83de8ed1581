//! Locale router.
//!
//! Sits in front of the site renderer and decides, for every request,
//! whether to serve it in a locale, redirect it, or pass it through.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ routing engine ──┬─ Redirect ──▶ 301/302 + Location
//!                     (request id,    (pass-through,   │
//!                      signals)        locale prefix,  ├─ Serve ─────▶ upstream renderer
//!                                      legacy routes,  │               + x-locale headers
//!                                      preference)     └─ PassThrough ▶ upstream renderer
//!
//!     Cross-cutting: config (+ hot reload), observability, lifecycle, security headers
//! ```

use std::path::PathBuf;

use clap::Parser;

use locale_router::config::watcher::ConfigWatcher;
use locale_router::http::HttpServer;
use locale_router::lifecycle::{signals, startup, Shutdown};
use locale_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "locale-router")]
#[command(about = "Locale routing and redirect gateway", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logging is configured by the file, so load errors go to stderr.
    let config = match startup::load_startup_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    tracing::info!("locale-router v{} starting", env!("CARGO_PKG_VERSION"));
    startup::log_summary(&config);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must stay alive for the lifetime of the server.
    let (_watcher, config_updates) = match cli.config.as_deref() {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(handle), Some(updates)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload disabled");
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    let listener = startup::bind_listener(&config).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, config_updates, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
