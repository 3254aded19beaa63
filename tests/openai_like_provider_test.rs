//! Integration tests for the OpenAI-compatible embedding provider
//!
//! All tests run against a mockito server standing in for the
//! `/embeddings` endpoint.
//!
//! Test coverage:
//! - Ordering, index sorting and count validation
//! - Input truncation to the token budget
//! - Single retry when `dimensions` is rejected
//! - Error surfacing for other failures and timeouts
//! - Concurrent calls on a shared provider

use std::io::Write;
use std::time::Duration;

use embedlike::domain::models::config::DimensionPolicy;
use embedlike::{
    EmbeddingError, EmbeddingOverrides, EmbeddingParameters, EmbeddingProvider, EmbeddingStage,
    ProviderConfig,
};
use mockito::{Matcher, Server};
use serde_json::json;

mod common;

use common::{
    DIMENSION_REJECTION, TEST_API_KEY, TEST_MODEL, embeddings_body, error_body, provider,
    provider_config, provider_with_dimension,
};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_get_embeddings_preserves_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_header("authorization", format!("Bearer {TEST_API_KEY}").as_str())
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "input": ["first", "second", "third"],
            "model": TEST_MODEL,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embeddings_body(&[
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
        ]))
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let vectors = provider
        .get_embeddings(
            &texts(&["first", "second", "third"]),
            EmbeddingStage::Base,
            EmbeddingOverrides::new(),
        )
        .await
        .expect("Embedding request failed");

    assert_eq!(vectors.len(), 3);
    assert_eq!(vectors[0], vec![1.0, 0.0]);
    assert_eq!(vectors[2], vec![3.0, 0.0]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_out_of_order_response_is_sorted_by_index() {
    let mut server = Server::new_async().await;
    let body = json!({
        "data": [
            { "index": 1, "embedding": [0.2] },
            { "index": 0, "embedding": [0.1] },
        ]
    });
    let _mock = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let vectors = provider
        .get_embeddings(&texts(&["a", "b"]), EmbeddingStage::Base, EmbeddingOverrides::new())
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![0.1], vec![0.2]]);
}

#[tokio::test]
async fn test_vector_count_mismatch_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body(embeddings_body(&[vec![0.5]]))
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let err = provider
        .get_embeddings(&texts(&["a", "b"]), EmbeddingStage::Base, EmbeddingOverrides::new())
        .await
        .unwrap_err();

    assert!(matches!(err, EmbeddingError::AsyncRequest(_)));
    assert!(err.to_string().contains("1 vectors for 2 inputs"));
}

#[tokio::test]
async fn test_single_embedding_with_model_override_and_extras() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::Json(json!({
            "input": ["hello"],
            "model": "bge-m3",
            "encoding_format": "float",
        })))
        .with_status(200)
        .with_body(embeddings_body(&[vec![0.25, 0.5, 0.75]]))
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let overrides = EmbeddingOverrides::new()
        .with_model("bge-m3")
        .with_param("encoding_format", json!("float"));
    let vector = provider
        .get_embedding("hello", EmbeddingStage::Base, overrides)
        .await
        .unwrap();

    assert_eq!(vector, vec![0.25, 0.5, 0.75]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_oversized_input_is_truncated_before_sending() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(json!({
            "input": ["x".repeat(40), "short"],
        })))
        .with_status(200)
        .with_body(embeddings_body(&[vec![1.0], vec![2.0]]))
        .create_async()
        .await;

    let provider = provider(ProviderConfig {
        max_input_tokens: 10,
        ..provider_config(&server.url())
    });
    let vectors = provider
        .get_embeddings(
            &["x".repeat(500_000), "short".to_string()],
            EmbeddingStage::Base,
            EmbeddingOverrides::new(),
        )
        .await
        .unwrap();

    assert_eq!(vectors.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_dimension_rejection_retries_once_without_dimensions() {
    let mut server = Server::new_async().await;
    let rejected = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::Json(json!({
            "input": ["hello"],
            "model": TEST_MODEL,
            "dimensions": 256,
        })))
        .with_status(400)
        .with_body(error_body(DIMENSION_REJECTION))
        .expect(1)
        .create_async()
        .await;
    let retried = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::Json(json!({
            "input": ["hello"],
            "model": TEST_MODEL,
        })))
        .with_status(200)
        .with_body(embeddings_body(&[vec![0.1; 1024]]))
        .expect(1)
        .create_async()
        .await;

    let provider = provider_with_dimension(&server.url(), 256);
    let vector = provider
        .get_embedding("hello", EmbeddingStage::Base, EmbeddingOverrides::new())
        .await
        .expect("Retry without dimensions should succeed");

    // The server's native size wins after the fallback.
    assert_eq!(vector.len(), 1024);
    rejected.assert_async().await;
    retried.assert_async().await;
}

#[tokio::test]
async fn test_failed_retry_surfaces_second_error() {
    let mut server = Server::new_async().await;
    let _rejected = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(json!({ "dimensions": 256 })))
        .with_status(400)
        .with_body(error_body(DIMENSION_REJECTION))
        .create_async()
        .await;
    let retried = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::Json(json!({
            "input": ["hello"],
            "model": TEST_MODEL,
        })))
        .with_status(503)
        .with_body(error_body("server overloaded"))
        .expect(1)
        .create_async()
        .await;

    let provider = provider_with_dimension(&server.url(), 256);
    let err = provider
        .get_embedding("hello", EmbeddingStage::Base, EmbeddingOverrides::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("server overloaded"));
    retried.assert_async().await;
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .with_status(500)
        .with_body(error_body("internal failure"))
        .expect(1)
        .create_async()
        .await;

    let provider = provider_with_dimension(&server.url(), 256);
    let err = provider
        .get_embedding("hello", EmbeddingStage::Base, EmbeddingOverrides::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.upstream_message(),
        Some("HTTP 500 Internal Server Error: internal failure")
    );
    assert!(err
        .to_string()
        .starts_with("Error getting embeddings (async): "));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejection_without_dimensions_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .with_status(400)
        .with_body(error_body(DIMENSION_REJECTION))
        .expect(1)
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let result = provider
        .get_embedding("hello", EmbeddingStage::Base, EmbeddingOverrides::new())
        .await;

    assert!(result.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_omit_policy_never_sends_dimensions() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::Json(json!({
            "input": ["hello"],
            "model": TEST_MODEL,
        })))
        .with_status(200)
        .with_body(embeddings_body(&[vec![0.0; 8]]))
        .expect(1)
        .create_async()
        .await;

    let provider = provider(ProviderConfig {
        default_dimension: Some(768),
        dimension_policy: DimensionPolicy::Omit,
        ..provider_config(&server.url())
    });
    let overrides = EmbeddingOverrides::new().with_dimensions(256.0);
    provider
        .get_embedding("hello", EmbeddingStage::Base, overrides)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_dimension_override_is_dropped() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::Json(json!({
            "input": ["hello"],
            "model": TEST_MODEL,
        })))
        .with_status(200)
        .with_body(embeddings_body(&[vec![0.0; 4]]))
        .expect(1)
        .create_async()
        .await;

    let provider = provider_with_dimension(&server.url(), 256);
    let overrides = EmbeddingOverrides::new().with_dimensions(f64::NAN);
    provider
        .get_embedding("hello", EmbeddingStage::Base, overrides)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_rerank_stage_is_rejected_without_a_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .expect(0)
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let err = provider
        .get_embedding("hello", EmbeddingStage::Rerank, EmbeddingOverrides::new())
        .await
        .unwrap_err();

    assert!(matches!(err, EmbeddingError::UnsupportedStage(EmbeddingStage::Rerank)));
    assert!(err.is_configuration());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_batch_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .expect(0)
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let vectors = provider
        .get_embeddings(&[], EmbeddingStage::Base, EmbeddingOverrides::new())
        .await
        .unwrap();

    assert!(vectors.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_success_body_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let err = provider
        .get_embedding("hello", EmbeddingStage::Base, EmbeddingOverrides::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Failed to parse embedding response"));
}

#[tokio::test]
async fn test_concurrent_calls_share_one_provider() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body(embeddings_body(&[vec![0.5, 0.5]]))
        .expect(4)
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let inputs: Vec<String> = (0..4).map(|i| format!("text {i}")).collect();
    let calls = inputs.iter().map(|text| {
        provider.get_embedding(text, EmbeddingStage::Base, EmbeddingOverrides::new())
    });
    let results = futures::future::join_all(calls).await;

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.as_ref().is_ok_and(|v| v.len() == 2)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_timeout_surfaces_as_request_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(1500));
            w.write_all(embeddings_body(&[vec![1.0]]).as_bytes())
        })
        .create_async()
        .await;

    let provider = provider(ProviderConfig {
        timeout: Duration::from_millis(200),
        ..provider_config(&server.url())
    });
    let err = provider
        .get_embedding("slow", EmbeddingStage::Base, EmbeddingOverrides::new())
        .await
        .unwrap_err();

    assert!(matches!(err, EmbeddingError::AsyncRequest(_)));
}

#[tokio::test]
async fn test_rerank_passes_results_through() {
    let server = Server::new_async().await;
    let provider = provider(provider_config(&server.url()));

    let results = (0..5)
        .map(|i| embedlike::ChunkSearchResult::new(i.to_string(), format!("chunk {i}"), 0.0))
        .collect();
    let kept = provider
        .rerank("query", results, EmbeddingStage::Rerank, 3)
        .await;

    let ids: Vec<_> = kept.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2"]);
}

#[tokio::test]
async fn test_adapter_keys_in_overrides_are_never_forwarded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::Json(json!({
            "input": ["hello"],
            "model": TEST_MODEL,
            "user": "tests",
        })))
        .with_status(200)
        .with_body(embeddings_body(&[vec![0.0; 4]]))
        .expect(1)
        .create_async()
        .await;

    let provider = provider(provider_config(&server.url()));
    let overrides: EmbeddingOverrides = serde_json::from_value(json!({
        "input": ["smuggled"],
        "dimensions": 256,
        "user": "tests",
    }))
    .unwrap();
    provider
        .get_embedding("hello", EmbeddingStage::Base, overrides)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_dimensions_in_raw_extras_follow_policy_and_retry() {
    let mut server = Server::new_async().await;
    let rejected = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(json!({ "dimensions": 128 })))
        .with_status(400)
        .with_body(error_body(DIMENSION_REJECTION))
        .expect(1)
        .create_async()
        .await;
    let retried = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::Json(json!({
            "input": ["hello"],
            "model": TEST_MODEL,
        })))
        .with_status(200)
        .with_body(embeddings_body(&[vec![0.0; 4]]))
        .expect(2)
        .create_async()
        .await;

    let mut extra = serde_json::Map::new();
    extra.insert("dimensions".into(), json!(128));
    extra.insert("input".into(), json!(["smuggled"]));
    let params = EmbeddingParameters {
        model: TEST_MODEL.to_string(),
        dimensions: None,
        extra,
    };

    // Omit drops the stray dimension outright.
    let omitting = provider(provider_config(&server.url()));
    omitting
        .execute_embedding_request(vec!["hello".to_string()], params.clone())
        .await
        .unwrap();

    // Include sends it, and its rejection triggers the single retry.
    let including = provider(ProviderConfig {
        dimension_policy: DimensionPolicy::IncludeWhenValid,
        ..provider_config(&server.url())
    });
    including
        .execute_embedding_request(vec!["hello".to_string()], params)
        .await
        .unwrap();

    rejected.assert_async().await;
    retried.assert_async().await;
}
