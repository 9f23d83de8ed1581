//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → body limit and timeout layers (server.rs)
//!     → headers.rs (strip hop-by-hop before forwarding)
//!     → Pass to routing
//!
//! Outgoing response:
//!     → headers.rs (strip hop-by-hop, add security headers)
//! ```
//!
//! # Design Decisions
//! - No trust in client input: locale headers are set by the router only

pub mod headers;
