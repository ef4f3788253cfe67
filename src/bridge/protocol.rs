//! Wire protocol envelopes and inbound-message parsing.
//!
//! One JSON object per WebSocket text message, both directions. Inbound:
//! `{id, type, prompt, options?, model?}`. Outbound: one of the
//! [`Outbound`] shapes, always echoing the request's `id` verbatim, as
//! raw JSON, so clients that send non-string ids get them back unchanged.

use serde::Serialize;
use serde_json::Value;

use crate::BifrostError;
use crate::options::GenerateOptions;

/// Operation kind of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `llm.generate`: one terminal data envelope.
    Generate,
    /// `llm.stream`: chunk envelopes followed by one done envelope.
    Stream,
}

impl Operation {
    /// Label used in metrics and logs.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Generate => "generate",
            Operation::Stream => "stream",
        }
    }
}

/// A validated inbound request envelope.
#[derive(Debug)]
pub struct Envelope {
    /// Correlation id, echoed verbatim on every response.
    pub id: Value,
    pub operation: Operation,
    /// `None` when the `prompt` field is absent or not a string; the
    /// dispatcher converts that into an `InvalidPrompt` error reply.
    pub prompt: Option<String>,
    pub options: GenerateOptions,
    pub model: Option<String>,
}

/// Outbound response envelopes.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    /// Terminal success for `llm.generate`.
    Data { id: Value, data: String, model: String },
    /// One streamed token for `llm.stream`.
    Chunk {
        id: Value,
        chunk: String,
        model: String,
    },
    /// Stream terminator, exactly one per successful stream.
    Done { id: Value, done: bool, model: String },
    /// Failure, replacing any of the above at the point of failure.
    Error { id: Value, error: String },
}

impl Outbound {
    pub fn data(id: Value, data: String, model: String) -> Self {
        Outbound::Data { id, data, model }
    }

    pub fn chunk(id: Value, chunk: String, model: String) -> Self {
        Outbound::Chunk { id, chunk, model }
    }

    pub fn done(id: Value, model: String) -> Self {
        Outbound::Done {
            id,
            done: true,
            model,
        }
    }

    pub fn error(id: Value, error: &BifrostError) -> Self {
        Outbound::Error {
            id,
            error: error.to_string(),
        }
    }

    /// Serialize for the wire. These shapes cannot fail to serialize;
    /// the fallback mirrors the best-effort error path of the transport.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"id":null,"error":"internal_error"}"#.to_string())
    }
}

/// Parse one inbound text message into an [`Envelope`], or the error
/// reply that should be sent instead.
///
/// Failure ladder: unparsable JSON → `invalid_json` with a null id;
/// missing `id` or `type` → `invalid_message` echoing the id when
/// present; unrecognized `type` → `unknown_type`.
pub fn parse(text: &str) -> Result<Envelope, Outbound> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            return Err(Outbound::error(
                Value::Null,
                &BifrostError::UnparsableMessage,
            ));
        }
    };

    let id = value.get("id").cloned().filter(|id| !id.is_null());
    let kind = value.get("type").and_then(Value::as_str);
    let (id, kind) = match (id, kind) {
        (Some(id), Some(kind)) => (id, kind),
        (id, _) => {
            return Err(Outbound::error(
                id.unwrap_or(Value::Null),
                &BifrostError::MalformedMessage,
            ));
        }
    };

    let operation = match kind {
        "llm.generate" => Operation::Generate,
        "llm.stream" => Operation::Stream,
        _ => return Err(Outbound::error(id, &BifrostError::UnknownOperation)),
    };

    let prompt = value
        .get("prompt")
        .and_then(Value::as_str)
        .map(str::to_string);

    let options = match value.get("options") {
        Some(options) => match serde_json::from_value(options.clone()) {
            Ok(options) => options,
            Err(e) => return Err(Outbound::error(id, &BifrostError::Json(e))),
        },
        None => GenerateOptions::default(),
    };

    let model = value
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Envelope {
        id,
        operation,
        prompt,
        options,
        model,
    })
}
