//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, routing signals)
//!     → routing engine (Serve | Redirect | PassThrough)
//!     → response.rs (redirect, locale headers, page context)
//!     → upstream renderer (served and pass-through requests)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, RequestSignals, X_LOCALE, X_LOCALE_REMAINDER, X_REQUEST_ID, X_ROUTING_STATE};
pub use server::HttpServer;
