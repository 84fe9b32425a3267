mod harness;

use harness::config::ConfigBuilder;
use harness::runtime::ScriptedRuntime;
use harness::server::TestServer;
use serde_json::{Value, json};

const CLAUDE: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

async fn post_chat(server: &TestServer, body: reqwest::Body) -> (reqwest::StatusCode, Value) {
    let resp = server
        .client()
        .post(server.url("/api/v1/chat/completions"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

fn assert_envelope(body: &Value, error_type: &str) {
    assert_eq!(body["error"]["type"], error_type);
    assert!(body["error"]["message"].is_string());
    assert!(body["error"]["code"].is_null());
}

#[tokio::test]
async fn malformed_json_body() {
    let server = TestServer::start(ConfigBuilder::new().build(), ScriptedRuntime::new()).await.unwrap();

    let (status, body) = post_chat(&server, "{not json".into()).await;

    assert_eq!(status, 400);
    assert_envelope(&body, "invalid_request_error");
}

#[tokio::test]
async fn unknown_model_family() {
    let server = TestServer::start(ConfigBuilder::new().build(), ScriptedRuntime::new()).await.unwrap();

    let request = json!({"model": "mistral.mistral-7b-instruct-v0:2", "messages": [{"role": "user", "content": "Hi"}]});
    let (status, body) = post_chat(&server, request.to_string().into()).await;

    assert_eq!(status, 400);
    assert_envelope(&body, "unsupported_model");
    assert!(body["error"]["message"].as_str().unwrap().contains("mistral.mistral-7b-instruct-v0:2"));
}

#[tokio::test]
async fn unknown_role() {
    let server = TestServer::start(ConfigBuilder::new().build(), ScriptedRuntime::new()).await.unwrap();

    let request = json!({"model": CLAUDE, "messages": [{"role": "narrator", "content": "Hi"}]});
    let (status, body) = post_chat(&server, request.to_string().into()).await;

    assert_eq!(status, 400);
    assert_envelope(&body, "invalid_request_error");
    assert!(server.runtime().invocations().is_empty());
}

#[tokio::test]
async fn negative_temperature() {
    let server = TestServer::start(ConfigBuilder::new().build(), ScriptedRuntime::new()).await.unwrap();

    let request = json!({"model": CLAUDE, "temperature": -1.0, "messages": [{"role": "user", "content": "Hi"}]});
    let (status, body) = post_chat(&server, request.to_string().into()).await;

    assert_eq!(status, 400);
    assert_envelope(&body, "invalid_request_error");
}

#[tokio::test]
async fn upstream_transport_failure() {
    // Nothing scripted for the model, so the invocation fails
    let server = TestServer::start(ConfigBuilder::new().build(), ScriptedRuntime::new()).await.unwrap();

    let request = json!({"model": CLAUDE, "messages": [{"role": "user", "content": "Hi"}]});
    let (status, body) = post_chat(&server, request.to_string().into()).await;

    assert_eq!(status, 502);
    assert_envelope(&body, "upstream_error");
}

#[tokio::test]
async fn malformed_upstream_reply() {
    let runtime = ScriptedRuntime::new().with_reply(CLAUDE, json!({"unexpected": true}));
    let server = TestServer::start(ConfigBuilder::new().build(), runtime).await.unwrap();

    let request = json!({"model": CLAUDE, "messages": [{"role": "user", "content": "Hi"}]});
    let (status, body) = post_chat(&server, request.to_string().into()).await;

    assert_eq!(status, 502);
    assert_envelope(&body, "upstream_response_error");
}

#[tokio::test]
async fn non_data_uri_image_for_messages_family_is_rejected() {
    let server = TestServer::start(ConfigBuilder::new().build(), ScriptedRuntime::new()).await.unwrap();

    let request = json!({
        "model": CLAUDE,
        "messages": [{
            "role": "user",
            "content": [{"type": "image_url", "image_url": {"url": "ftp://example.com/cat.png"}}]
        }]
    });
    let (status, body) = post_chat(&server, request.to_string().into()).await;

    assert_eq!(status, 422);
    assert_envelope(&body, "image_fetch_error");
}
