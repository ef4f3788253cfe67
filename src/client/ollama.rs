//! Ollama-style completion client.
//!
//! Talks to a local model-serving process over `POST {base}/api/generate`,
//! in both blocking and token-streaming form. The streaming endpoint
//! produces newline-delimited JSON objects; tokens arrive in the
//! `response` field and the final object carries `done: true`.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, instrument};

use crate::options::ResolvedOptions;
use crate::{BifrostError, Result};

use super::{CompletionClient, TokenStream};

/// Buffered tokens between the backend reader and the consumer.
///
/// Bounded so a fast backend cannot fill unbounded memory when the
/// consumer (typically a socket write) falls behind.
const STREAM_BUFFER: usize = 64;

/// Client for one model served by a local Ollama-compatible process.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

/// Non-streaming response body. Older backends use `output` instead of
/// `response`; an `error` field overrides either.
#[derive(Debug, Deserialize)]
struct CompletionBody {
    response: Option<String>,
    output: Option<String>,
    error: Option<String>,
}

/// One newline-delimited object of the streaming response.
#[derive(Debug, Deserialize)]
struct StreamLine {
    response: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

impl OllamaClient {
    /// Create a client for `model` against the backend at `base_url`.
    pub fn new(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_http_client(model, base_url, reqwest::Client::new())
    }

    /// Create a client sharing an existing HTTP connection pool.
    ///
    /// Prefer this over [`new`](Self::new) when multiple clients run in
    /// one process (the router passes one pool to every client it builds).
    pub fn with_http_client(
        model: impl Into<String>,
        base_url: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn payload(&self, prompt: &str, options: &ResolvedOptions, stream: bool) -> Value {
        json!({
            "model": self.model,
            "prompt": prompt,
            "stream": stream,
            "options": request_options(options),
        })
    }
}

/// Build the backend `options` object: temperature and token budget under
/// the backend's names, extra fields forwarded verbatim (and allowed to
/// override the named ones, matching caller intent).
fn request_options(options: &ResolvedOptions) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("temperature".to_string(), json!(options.temperature));
    map.insert("num_predict".to_string(), json!(options.max_tokens));
    for (key, value) in &options.extra {
        map.insert(key.clone(), value.clone());
    }
    map
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(name = "ollama.complete", skip(self, prompt, options), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, options: &ResolvedOptions) -> Result<String> {
        let response = self
            .http
            .post(self.generate_url())
            .json(&self.payload(prompt, options, false))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BifrostError::Api {
                status: status.as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".into()),
            });
        }

        let body: CompletionBody = response.json().await?;
        if let Some(error) = body.error {
            return Err(BifrostError::Backend(error));
        }
        Ok(body.response.or(body.output).unwrap_or_default())
    }

    #[instrument(name = "ollama.stream", skip(self, prompt, options), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn stream(&self, prompt: &str, options: &ResolvedOptions) -> Result<TokenStream> {
        let response = self
            .http
            .post(self.generate_url())
            .json(&self.payload(prompt, options, true))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BifrostError::Api {
                status: status.as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".into()),
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel::<Result<String>>(STREAM_BUFFER);

        // Reader task: reassemble newline-delimited JSON across chunk
        // boundaries and forward tokens. When the consumer drops the
        // stream, send() fails and the task exits, dropping the response
        // body and aborting the in-flight backend call.
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buf = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(BifrostError::Stream(e.to_string()))).await;
                        return;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buf.find('\n') {
                    let line: String = buf.drain(..=pos).collect();
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let parsed: StreamLine = match serde_json::from_str(line) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            let _ = tx
                                .send(Err(BifrostError::Stream(format!(
                                    "malformed stream line: {e}"
                                ))))
                                .await;
                            return;
                        }
                    };
                    if let Some(error) = parsed.error {
                        let _ = tx.send(Err(BifrostError::Stream(error))).await;
                        return;
                    }
                    if let Some(token) = parsed.response {
                        if !token.is_empty() && tx.send(Ok(token)).await.is_err() {
                            debug!("stream consumer dropped, aborting backend read");
                            return;
                        }
                    }
                    if parsed.done {
                        return;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
