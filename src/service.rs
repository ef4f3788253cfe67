//! Generation service: validation, caching, and backend dispatch.
//!
//! One [`GenerationService`] wraps one [`CompletionClient`] and one
//! [`ResponseCache`], all scoped to a single backend model. Non-streaming
//! completions are cached; streaming completions never touch the cache.
//! Each call produces a fresh single-pass token stream.

use std::sync::Arc;

use tracing::info;

use crate::Result;
use crate::cache::ResponseCache;
use crate::client::{CompletionClient, TokenStream};
use crate::config::GenerationConfig;
use crate::options::GenerateOptions;
use crate::BifrostError;

/// High-level wrapper around a completion client for one model.
pub struct GenerationService {
    client: Arc<dyn CompletionClient>,
    cache: ResponseCache,
    defaults: GenerationConfig,
}

impl GenerationService {
    /// Create a service around `client`, with defaults and limits from
    /// `defaults` (which also sizes the response cache).
    pub fn new(client: Arc<dyn CompletionClient>, defaults: GenerationConfig) -> Self {
        let cache = ResponseCache::new(defaults.cache_capacity);
        Self {
            client,
            cache,
            defaults,
        }
    }

    /// The backend model this service is scoped to.
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Validate a prompt before any cache or network interaction.
    fn validate_prompt(&self, prompt: &str) -> Result<()> {
        if prompt.is_empty() {
            return Err(BifrostError::EmptyPrompt);
        }
        let length = prompt.chars().count();
        if length > self.defaults.max_prompt_len {
            return Err(BifrostError::PromptTooLong {
                length,
                limit: self.defaults.max_prompt_len,
            });
        }
        Ok(())
    }

    /// Blocking completion, served from cache when possible.
    ///
    /// On a cache miss the backend result is stored before returning;
    /// backend failures propagate without caching.
    pub async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        self.validate_prompt(prompt)?;
        let resolved = options.resolve(&self.defaults);

        if let Some(cached) = self.cache.get(self.model(), prompt, &resolved) {
            info!(model = %self.model(), "cache hit");
            return Ok(cached);
        }

        let output = self.client.complete(prompt, &resolved).await?;
        self.cache
            .insert(self.model(), prompt, &resolved, output.clone());
        Ok(output)
    }

    /// Streaming completion. Never consults or populates the cache; each
    /// call starts a fresh backend invocation.
    pub async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<TokenStream> {
        self.validate_prompt(prompt)?;
        let resolved = options.resolve(&self.defaults);
        info!(model = %self.model(), "streaming generate");
        self.client.stream(prompt, &resolved).await
    }
}
