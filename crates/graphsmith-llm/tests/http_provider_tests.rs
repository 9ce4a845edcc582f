//! HTTP provider tests against a wiremock server.
//!
//! Covers the request shape each provider sends, success-path decoding,
//! non-2xx handling, and embedding dimension checks.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use graphsmith_core::traits::llm::{EmbeddingProvider, LlmError, TextGenerationProvider};
use graphsmith_llm::embeddings::{OllamaEmbeddingProvider, OpenAiEmbeddingProvider};
use graphsmith_llm::providers::{OllamaTextProvider, OpenAiTextProvider};

// ============================================================================
// Ollama text generation
// ============================================================================

#[tokio::test]
async fn ollama_generate_returns_response_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "stream": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "response": "{\"entities\": [], \"relationships\": []}",
            "done": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OllamaTextProvider::new(server.uri(), "llama3.2".to_string(), 30);
    let text = provider.generate("extract something").await.unwrap();

    assert_eq!(text, "{\"entities\": [], \"relationships\": []}");
}

#[tokio::test]
async fn ollama_generate_http_error_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"{"error": "model crashed"}"#),
        )
        .mount(&server)
        .await;

    let provider = OllamaTextProvider::new(server.uri(), "llama3.2".to_string(), 30);
    let error = provider.generate("hi").await.unwrap_err();

    match error {
        LlmError::InvalidResponse(message) => {
            assert!(message.contains("500"), "message: {message}");
            assert!(message.contains("model crashed"), "message: {message}");
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_generate_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let provider = OllamaTextProvider::new(server.uri(), "llama3.2".to_string(), 30);
    let error = provider.generate("hi").await.unwrap_err();

    assert!(matches!(error, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn ollama_generate_unreachable_host_is_http_error() {
    // Port 9 (discard) refuses connections on a loopback without a listener.
    let provider =
        OllamaTextProvider::new("http://127.0.0.1:9".to_string(), "llama3.2".to_string(), 2);
    let error = provider.generate("hi").await.unwrap_err();

    assert!(matches!(error, LlmError::Http(_)));
}

// ============================================================================
// OpenAI text generation
// ============================================================================

#[tokio::test]
async fn openai_generate_sends_bearer_auth_and_reads_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiTextProvider::new(
        "test-key".to_string(),
        server.uri(),
        "gpt-4o-mini".to_string(),
        30,
    );
    let text = provider.generate("hi").await.unwrap();

    assert_eq!(text, "first");
}

#[tokio::test]
async fn openai_generate_without_choices_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = OpenAiTextProvider::new(
        "test-key".to_string(),
        server.uri(),
        "gpt-4o-mini".to_string(),
        30,
    );
    let error = provider.generate("hi").await.unwrap_err();

    assert!(matches!(error, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn openai_generate_auth_failure_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error": "invalid api key"}"#),
        )
        .mount(&server)
        .await;

    let provider = OpenAiTextProvider::new(
        "bad-key".to_string(),
        server.uri(),
        "gpt-4o-mini".to_string(),
        30,
    );
    let error = provider.generate("hi").await.unwrap_err();

    match error {
        LlmError::InvalidResponse(message) => {
            assert!(message.contains("401"), "message: {message}");
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
}

// ============================================================================
// Ollama embeddings
// ============================================================================

#[tokio::test]
async fn ollama_embed_returns_vector_of_expected_length() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({
            "model": "nomic-embed-text",
            "prompt": "Marie Curie",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [0.1, 0.2, 0.3, 0.4],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        OllamaEmbeddingProvider::new(server.uri(), "nomic-embed-text".to_string(), 4, 30);
    let vector = provider.embed("Marie Curie").await.unwrap();

    assert_eq!(vector, vec![0.1, 0.2, 0.3, 0.4]);
}

#[tokio::test]
async fn ollama_embed_rejects_wrong_dimensions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [0.1, 0.2, 0.3],
        })))
        .mount(&server)
        .await;

    // Provider is configured for 768 dimensions, server returns 3.
    let provider =
        OllamaEmbeddingProvider::new(server.uri(), "nomic-embed-text".to_string(), 768, 30);
    let error = provider.embed("text").await.unwrap_err();

    match error {
        LlmError::DimensionMismatch { expected, actual } => {
            assert_eq!(expected, 768);
            assert_eq!(actual, 3);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_embed_http_error_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error": "no such model"}"#))
        .mount(&server)
        .await;

    let provider = OllamaEmbeddingProvider::new(server.uri(), "missing".to_string(), 4, 30);
    let error = provider.embed("text").await.unwrap_err();

    match error {
        LlmError::InvalidResponse(message) => {
            assert!(message.contains("404"), "message: {message}");
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
}

// ============================================================================
// OpenAI embeddings
// ============================================================================

#[tokio::test]
async fn openai_embed_batch_restores_order_from_indices() {
    let server = MockServer::start().await;
    // The API may return items in any order; each carries its input index.
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"index": 2, "embedding": [3.0, 3.0]},
                {"index": 0, "embedding": [1.0, 1.0]},
                {"index": 1, "embedding": [2.0, 2.0]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiEmbeddingProvider::new(
        "test-key".to_string(),
        server.uri(),
        "text-embedding-3-small".to_string(),
        2,
        30,
    );
    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let vectors = provider.embed_batch(&texts).await.unwrap();

    assert_eq!(vectors, vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]]);
}

#[tokio::test]
async fn openai_embed_batch_rejects_out_of_range_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"index": 5, "embedding": [1.0, 1.0]}]
        })))
        .mount(&server)
        .await;

    let provider = OpenAiEmbeddingProvider::new(
        "test-key".to_string(),
        server.uri(),
        "text-embedding-3-small".to_string(),
        2,
        30,
    );
    let error = provider.embed_batch(&["a".to_string()]).await.unwrap_err();

    assert!(matches!(error, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn openai_embed_batch_rejects_count_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"index": 0, "embedding": [1.0, 1.0]}]
        })))
        .mount(&server)
        .await;

    let provider = OpenAiEmbeddingProvider::new(
        "test-key".to_string(),
        server.uri(),
        "text-embedding-3-small".to_string(),
        2,
        30,
    );
    let texts = vec!["a".to_string(), "b".to_string()];
    let error = provider.embed_batch(&texts).await.unwrap_err();

    assert!(matches!(error, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn openai_embed_rejects_wrong_dimensions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"index": 0, "embedding": [1.0, 2.0, 3.0]}]
        })))
        .mount(&server)
        .await;

    let provider = OpenAiEmbeddingProvider::new(
        "test-key".to_string(),
        server.uri(),
        "text-embedding-3-small".to_string(),
        1536,
        30,
    );
    let error = provider.embed("text").await.unwrap_err();

    match error {
        LlmError::DimensionMismatch { expected, actual } => {
            assert_eq!(expected, 1536);
            assert_eq!(actual, 3);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_embed_http_error_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_string(r#"{"error": "rate limited"}"#))
        .mount(&server)
        .await;

    let provider = OpenAiEmbeddingProvider::new(
        "test-key".to_string(),
        server.uri(),
        "text-embedding-3-small".to_string(),
        2,
        30,
    );
    let error = provider.embed("text").await.unwrap_err();

    match error {
        LlmError::InvalidResponse(message) => {
            assert!(message.contains("429"), "message: {message}");
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
}
