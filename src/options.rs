//! Generation option types.
//!
//! [`GenerateOptions`] is the caller-facing shape deserialized from the
//! wire; [`ResolvedOptions`] is the fully-defaulted form handed to the
//! backend client and hashed into cache keys.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::GenerationConfig;

/// Options for a generation request.
///
/// Every field is optional; absent fields fall back to the process-wide
/// defaults in [`GenerationConfig`]. `extra` is an opaque mapping passed
/// through to the backend untouched (provider-specific knobs such as
/// `top_k` or `seed`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Provider-specific extra fields, forwarded verbatim.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl GenerateOptions {
    /// Create empty options (everything defaulted at resolution time).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Add a provider-specific extra field.
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Merge with process-wide defaults; caller values win when present.
    pub fn resolve(&self, defaults: &GenerationConfig) -> ResolvedOptions {
        ResolvedOptions {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            extra: self.extra.clone(),
        }
    }
}

/// Fully-resolved generation options: what actually reaches the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub extra: Map<String, Value>,
}

/// Hash participates in cache-key derivation, so it must be deterministic:
/// the float hashes by bit pattern and the extra map iterates in its
/// sorted key order (serde_json's map is a BTreeMap).
impl Hash for ResolvedOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.temperature.to_bits().hash(state);
        self.max_tokens.hash(state);
        for (key, value) in &self.extra {
            key.hash(state);
            value.to_string().hash(state);
        }
    }
}
