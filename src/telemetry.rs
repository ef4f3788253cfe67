//! Telemetry metric name constants.
//!
//! Centralised metric names for bifrost operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `bifrost_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `model` — backend model identifier
//! - `operation` — request kind ("generate" | "stream")
//! - `status` — outcome: "ok" or "error"

/// Total requests dispatched through the bridge.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "bifrost_requests_total";

/// Total WebSocket connections accepted.
pub const CONNECTIONS_TOTAL: &str = "bifrost_connections_total";

/// Total response cache hits.
///
/// Labels: `model`.
pub const CACHE_HITS_TOTAL: &str = "bifrost_cache_hits_total";

/// Total response cache misses.
///
/// Labels: `model`.
pub const CACHE_MISSES_TOTAL: &str = "bifrost_cache_misses_total";

/// Total stream tokens relayed to clients.
///
/// Labels: `model`.
pub const STREAM_TOKENS_TOTAL: &str = "bifrost_stream_tokens_total";
