//! Backend completion clients.
//!
//! A [`CompletionClient`] issues actual model-inference calls against an
//! external model-serving process. Each client instance is scoped to one
//! model; the [`ServiceRouter`](crate::router::ServiceRouter) constructs
//! one per distinct model identifier.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::Result;
use crate::options::ResolvedOptions;

pub mod ollama;

pub use ollama::OllamaClient;

/// A finite, single-pass stream of completion tokens.
///
/// Dropping the stream cancels the in-flight backend call.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Client for a single backend model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Client name for logging/debugging.
    fn name(&self) -> &str;

    /// Model this client is scoped to.
    fn model(&self) -> &str;

    /// Blocking completion: the full generated text in one response.
    async fn complete(&self, prompt: &str, options: &ResolvedOptions) -> Result<String>;

    /// Streaming completion: tokens as the backend produces them.
    ///
    /// The stream ends when the backend signals completion and yields an
    /// `Err` item on malformed or error-carrying backend output.
    async fn stream(&self, prompt: &str, options: &ResolvedOptions) -> Result<TokenStream>;
}
