//! Wiremock tests for [`OllamaClient`] against a fake `/api/generate`.

use futures_util::StreamExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bifrost::config::GenerationConfig;
use bifrost::{BifrostError, CompletionClient, GenerateOptions, OllamaClient, ResolvedOptions};

fn opts() -> ResolvedOptions {
    GenerateOptions::new().resolve(&GenerationConfig::default())
}

#[tokio::test]
async fn complete_returns_response_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "model": "m",
            "prompt": "Hi",
            "stream": false,
            "options": { "temperature": 0.7, "num_predict": 1024 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "Hello there"
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    let out = client.complete("Hi", &opts()).await.unwrap();
    assert_eq!(out, "Hello there");
}

#[tokio::test]
async fn complete_falls_back_to_output_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "output": "legacy shape" })),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    assert_eq!(client.complete("Hi", &opts()).await.unwrap(), "legacy shape");
}

#[tokio::test]
async fn extra_options_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({
            "options": { "top_k": 40 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "ok"
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    let options = GenerateOptions::new()
        .extra("top_k", serde_json::json!(40))
        .resolve(&GenerationConfig::default());
    assert_eq!(client.complete("Hi", &options).await.unwrap(), "ok");
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    let err = client.complete("Hi", &opts()).await.unwrap_err();
    match err {
        BifrostError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_in_body_is_a_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "model not loaded"
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    let err = client.complete("Hi", &opts()).await.unwrap_err();
    assert!(matches!(err, BifrostError::Backend(message) if message == "model not loaded"));
}

#[tokio::test]
async fn stream_reassembles_newline_delimited_tokens() {
    let server = MockServer::start().await;
    let body = concat!(
        r#"{"response":"Hel"}"#,
        "\n",
        r#"{"response":"lo"}"#,
        "\n",
        r#"{"response":"","done":true}"#,
        "\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({ "stream": true })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    let mut stream = client.stream("Hi", &opts()).await.unwrap();

    let mut tokens = Vec::new();
    while let Some(token) = stream.next().await {
        tokens.push(token.unwrap());
    }
    assert_eq!(tokens, vec!["Hel".to_string(), "lo".to_string()]);
}

#[tokio::test]
async fn stream_error_line_terminates_with_error() {
    let server = MockServer::start().await;
    let body = concat!(
        r#"{"response":"x"}"#,
        "\n",
        r#"{"error":"exploded mid-stream"}"#,
        "\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    let mut stream = client.stream("Hi", &opts()).await.unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), "x");
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, BifrostError::Stream(message) if message == "exploded mid-stream"));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn stream_malformed_line_terminates_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("not json\n", "application/x-ndjson"),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    let mut stream = client.stream("Hi", &opts()).await.unwrap();

    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, BifrostError::Stream(_)));
}

#[tokio::test]
async fn stream_rejects_non_success_status_up_front() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = OllamaClient::new("m", server.uri());
    let err = client.stream("Hi", &opts()).await.err().unwrap();
    assert!(matches!(err, BifrostError::Api { status: 503, .. }));
}
