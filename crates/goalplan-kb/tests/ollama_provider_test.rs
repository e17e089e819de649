//! HTTP-level tests for the Ollama provider

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use goalplan_interfaces::{ProviderError, TextCompletionProvider};
use goalplan_kb::OllamaProvider;

async fn setup_mock_ollama() -> (MockServer, OllamaProvider) {
    let mock_server = MockServer::start().await;
    let provider = OllamaProvider::with_url_and_timeout(mock_server.uri(), 5).unwrap();
    (mock_server, provider)
}

#[tokio::test]
async fn test_complete_returns_message_content() {
    let (mock_server, provider) = setup_mock_ollama().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama2",
            "stream": false,
            "messages": [{"role": "user", "content": "Say hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama2",
            "message": {"role": "assistant", "content": "Hi!"},
            "done": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = provider.complete("llama2", "Say hi").await.unwrap();
    assert_eq!(reply, "Hi!");
}

#[tokio::test]
async fn test_error_status_carries_server_message() {
    let (mock_server, provider) = setup_mock_ollama().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'ghost' not found"})),
        )
        .mount(&mock_server)
        .await;

    match provider.complete("ghost", "hello").await {
        Err(ProviderError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "model 'ghost' not found");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unexpected_body_is_invalid_response() {
    let (mock_server, provider) = setup_mock_ollama().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    assert!(matches!(
        provider.complete("llama2", "hello").await,
        Err(ProviderError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_list_models_sorted_smallest_first() {
    let (mock_server, provider) = setup_mock_ollama().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "llama2:13b", "model": "llama2:13b", "size": 7_365_960_935u64},
                {"name": "phi:latest", "model": "phi:latest", "size": 1_602_463_378u64},
                {"name": "", "size": 1},
                {"name": "mistral:latest", "size": 4_109_865_159u64}
            ]
        })))
        .mount(&mock_server)
        .await;

    let models = provider.list_models().await.unwrap();
    assert_eq!(models, vec!["phi:latest", "mistral:latest", "llama2:13b"]);
    assert_eq!(provider.default_model().await.unwrap().as_deref(), Some("phi:latest"));
}

#[tokio::test]
async fn test_unreachable_server() {
    let (mock_server, provider) = setup_mock_ollama().await;
    drop(mock_server);

    assert!(matches!(
        provider.list_models().await,
        Err(ProviderError::Unreachable(_))
    ));
}
