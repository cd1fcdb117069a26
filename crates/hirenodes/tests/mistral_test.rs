// crates/hirenodes/tests/mistral_test.rs

use hirecore::NodeError;
use hirenodes::{CompletionClient, CompletionRequest, MistralClient, MistralConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MistralClient {
    let mut config = MistralConfig::new("test-key");
    config.base_url = server.uri();
    config.timeout_secs = 5;
    MistralClient::new(config).unwrap()
}

fn request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        model: None,
        prompt: prompt.to_string(),
    }
}

#[tokio::test]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "mistral-large-latest",
            "messages": [{"role": "user", "content": "Rate this candidate"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Strong hire"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .complete(request("Rate this candidate"))
        .await
        .unwrap();

    assert_eq!(reply, "Strong hire");
}

#[tokio::test]
async fn request_model_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "mistral-small-latest"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .complete(CompletionRequest {
            model: Some("mistral-small-latest".to_string()),
            prompt: "hi".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn missing_content_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(request("hi")).await.unwrap_err();

    assert_eq!(
        err,
        NodeError::MalformedResponse("missing choices[0].message.content".to_string())
    );
}

#[tokio::test]
async fn error_status_is_execution_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(request("hi")).await.unwrap_err();

    match err {
        NodeError::ExecutionFailed(message) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid api key"));
        }
        other => panic!("expected execution failure, got {:?}", other),
    }
}

#[test]
fn empty_key_is_rejected() {
    let result = MistralClient::new(MistralConfig::new("  "));
    assert!(matches!(result, Err(NodeError::Configuration(_))));
}
