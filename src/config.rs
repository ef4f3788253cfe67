//! Configuration loading for bifrostd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.bifrost/config.toml` (user)
//! 3. `/etc/bifrost/config.toml` (system)
//!
//! Unlike most fields, nothing is mandatory: when no file exists the daemon
//! starts with built-in defaults, pointed at a local Ollama instance.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{BifrostError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Mock mode: answer every request with deterministic literal output
    /// and never touch the backend. Used by tests and local development.
    #[serde(default)]
    pub mock: bool,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket bridge binds to (default: 127.0.0.1:3001).
    #[serde(default = "default_bridge_address")]
    pub bridge_address: String,
    /// Address the health endpoint binds to (default: 127.0.0.1:3000).
    #[serde(default = "default_health_address")]
    pub health_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bridge_address: default_bridge_address(),
            health_address: default_health_address(),
        }
    }
}

fn default_bridge_address() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_health_address() -> String {
    "127.0.0.1:3000".to_string()
}

/// Backend (model-serving process) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the completion backend (default: http://localhost:11434).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used when a request names none (default: llama3.2).
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

/// Generation defaults and limits.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature applied when a request omits one (default: 0.7).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Token budget applied when a request omits one (default: 1024).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Maximum accepted prompt length in characters (default: 8000).
    #[serde(default = "default_max_prompt_len")]
    pub max_prompt_len: usize,
    /// Per-service response cache capacity in entries (default: 50).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_prompt_len: default_max_prompt_len(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_max_prompt_len() -> usize {
    8000
}

fn default_cache_capacity() -> usize {
    50
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; missing file is an error)
    /// 2. `~/.bifrost/config.toml`
    /// 3. `/etc/bifrost/config.toml`
    /// 4. Built-in defaults when no file exists
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit_path)? else {
            return Ok(Config::default());
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            BifrostError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            BifrostError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path. `Ok(None)` means "use defaults".
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(BifrostError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".bifrost").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/bifrost/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
