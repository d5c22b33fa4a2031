//! chainproxy-server: the HTTP boundary around the failover engine.
//!
//! - [`router`]: axum routes and shared [`router::AppState`]
//! - [`handlers`]: request handlers and the error → status mapping
//! - [`telemetry`]: `tracing` subscriber setup

pub mod handlers;
pub mod router;
pub mod telemetry;

pub use router::{build_router, AppState};
