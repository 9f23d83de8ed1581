//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query, origin, stored preference, Accept-Language)
//!     → matcher.rs (pass-through rules)
//!     → locale::path (known locale prefix?)
//!     → legacy.rs (pre-localization URL?)
//!     → planner.rs (state machine → Serve | Redirect | PassThrough)
//!
//! Engine Compilation (at startup and on reload):
//!     SiteConfig
//!     → validate (all errors)
//!     → registry, pass-through matchers, legacy table
//!     → Freeze as immutable LocaleEngine
//! ```
//!
//! # Design Decisions
//! - Engine compiled once per config, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always yields the same decision
//! - Redirect targets never redirect again

pub mod engine;
pub mod legacy;
pub mod matcher;
pub mod planner;
pub mod static_routes;

pub use engine::LocaleEngine;
pub use legacy::{LegacyKind, LegacyMatch, LegacyPattern, LegacyRouteClassifier};
pub use matcher::{AnyMatcher, Matcher};
pub use planner::{
    RedirectDecision, RedirectPlanner, RedirectStatus, RequestContext, RoutingOutcome, RoutingState,
};
pub use static_routes::{static_routes, StaticRoute};
