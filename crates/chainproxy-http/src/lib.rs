//! chainproxy-http: HTTP upstream dispatcher backed by `reqwest`.
//!
//! One [`HttpDispatcher`] (and its connection pool) is shared by every
//! request; endpoints are addressed by full URL per call.

pub mod client;

pub use client::{HttpDispatcher, HttpDispatcherConfig, HttpDispatcherError};
