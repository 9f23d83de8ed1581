//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, legacy overlap detection)
//!     → SiteConfig (validated, immutable)
//!     → compiled into a LocaleEngine shared via Arc
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the compiled engine
//!     → in-flight requests keep the snapshot they started with
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    FormatConfig, LegacyConfig, ListenerConfig, LocaleConfig, LogFormat, ObservabilityConfig,
    PassthroughConfig, SiteConfig, SiteSettings, TextDirection,
};
pub use validation::{validate_config, ValidationError};
