//! Per-model service router.
//!
//! Maps a model identifier to a lazily-constructed
//! [`GenerationService`] (with its own backend client and response
//! cache) and reuses instances across requests. The registry only grows:
//! entries live for the process lifetime, which is bounded in practice by
//! the small, operator-controlled set of model names in use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::client::OllamaClient;
use crate::config::{BackendConfig, Config, GenerationConfig};
use crate::service::GenerationService;

/// Provides per-model [`GenerationService`] instances (lazy init + reuse).
pub struct ServiceRouter {
    services: Mutex<HashMap<String, Arc<GenerationService>>>,
    backend: BackendConfig,
    generation: GenerationConfig,
    /// One connection pool shared by every client the router builds.
    http: reqwest::Client,
}

impl ServiceRouter {
    pub fn new(config: &Config) -> Self {
        Self {
            services: Mutex::new(HashMap::new()),
            backend: config.backend.clone(),
            generation: config.generation.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// The model a request targets: the requested name, or the configured
    /// default when absent or empty.
    pub fn resolved_model<'a>(&'a self, model: Option<&'a str>) -> &'a str {
        match model {
            Some(name) if !name.is_empty() => name,
            _ => &self.backend.default_model,
        }
    }

    /// Get the service for `model`, constructing it on first use.
    ///
    /// Repeated calls with the same (possibly defaulted) identifier
    /// return the identical instance, preserving its cache contents.
    pub fn service(&self, model: Option<&str>) -> Arc<GenerationService> {
        let target = self.resolved_model(model).to_string();
        let mut services = self.services.lock().unwrap_or_else(|e| e.into_inner());
        services
            .entry(target.clone())
            .or_insert_with(|| {
                info!(model = %target, "creating generation service");
                let client = Arc::new(OllamaClient::with_http_client(
                    target,
                    self.backend.base_url.clone(),
                    self.http.clone(),
                ));
                Arc::new(GenerationService::new(client, self.generation.clone()))
            })
            .clone()
    }

    /// Number of distinct models with a live service.
    pub fn len(&self) -> usize {
        self.services
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Whether any service has been constructed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
