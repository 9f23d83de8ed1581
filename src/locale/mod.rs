//! Locale subsystem.
//!
//! # Data Flow
//! ```text
//! LocaleConfig[] (validated)
//!     → registry.rs (closed set of Locale values, code ↔ prefix bijection)
//!     → path.rs (RequestPath → (Locale?, remainder))
//!     → preference.rs (signals → single resolved Locale)
//!     → format.rs (per-locale number/date rules for the renderer)
//! ```
//!
//! # Design Decisions
//! - Registry built once, shared read-only; no process-wide current locale
//! - A Locale value can only come from a registry
//! - Every function here is total: unknown input yields None or a fallback

pub mod format;
pub mod path;
pub mod preference;
pub mod registry;

pub use format::FormatRules;
pub use path::{join_prefix, PathLocaleMapper, RequestPath};
pub use preference::{
    parse_accept_language, parse_language_id, PreferenceResolver, PreferenceSignals,
    PreferenceSource, PreferenceTier, Resolution,
};
pub use registry::{LanguageOption, Locale, LocaleRegistry};
