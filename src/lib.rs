//! Bifrost - WebSocket bridge to local LLM backends
//!
//! This crate exposes a request/response and streaming protocol over a
//! persistent WebSocket connection, routing generation requests to
//! per-model backend clients with per-model response caching.
//!
//! # Library Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bifrost::{Bridge, Config, ServiceRouter};
//!
//! #[tokio::main]
//! async fn main() -> bifrost::Result<()> {
//!     let config = Config::load(None)?;
//!     let router = Arc::new(ServiceRouter::new(&config));
//!     let bridge = Bridge::bind(&config, router).await?;
//!     bridge.run().await
//! }
//! ```
//!
//! # Wire Protocol
//!
//! One JSON object per text message. A client sends
//! `{"id":"1","type":"llm.generate","prompt":"Ping"}` and receives
//! `{"id":"1","data":"...","model":"..."}`; `llm.stream` yields
//! `{"id","chunk","model"}` envelopes followed by exactly one
//! `{"id","done":true,"model"}`. Failures come back as
//! `{"id","error":"..."}` and never close the connection.

pub mod bridge;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod options;
pub mod router;
pub mod service;
pub mod telemetry;

// Re-export main types at crate root
pub use bridge::{Bridge, BridgeHandle, Operation, Outbound};
pub use cache::ResponseCache;
pub use client::{CompletionClient, OllamaClient, TokenStream};
pub use config::Config;
pub use error::{BifrostError, Result};
pub use options::{GenerateOptions, ResolvedOptions};
pub use router::ServiceRouter;
pub use service::GenerationService;
