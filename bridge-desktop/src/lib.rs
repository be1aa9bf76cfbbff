//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides working implementations of the bridge traits using
//! desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `PlayerEngine` as a clock-driven simulation for demos and tests
//! - `MediaSession` as a tracing-backed recorder with a real command feed
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SimulatedEngine, TracingMediaSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = Arc::new(SimulatedEngine::new());
//!     let http_client = Arc::new(ReqwestHttpClient::new());
//!     let session = Arc::new(TracingMediaSession::new());
//!
//!     // Use in core configuration
//! }
//! ```

mod engine;
mod http;
mod media_session;

pub use engine::{SimulatedEngine, SimulatedEngineBuilder};
pub use http::ReqwestHttpClient;
pub use media_session::TracingMediaSession;
