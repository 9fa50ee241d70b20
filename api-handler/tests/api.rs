//! Integration tests for the local server.
//!
//! These run against mock adapters and need no AWS access.
//! Run with: cargo test -p api-handler --test api

use api_handler::config::HandlerConfig;
use api_handler::models::{FieldValue, QueryRow};
use api_handler::router::RequestRouter;
use api_handler::services::{MockModelInvoker, MockTabularQuery};
use api_handler::startup::{build_request_router, Application};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> HandlerConfig {
    std::env::set_var("ENVIRONMENT", "test");
    std::env::set_var("APP__PORT", "0"); // Random port
    std::env::set_var("HANDLER_BACKEND", "mock");
    std::env::set_var("AWS_REGION", "us-east-1");

    HandlerConfig::load().expect("Failed to load config")
}

/// Spawn the application on a random port and return the port number.
async fn spawn_app(router: RequestRouter) -> u16 {
    let app = Application::build(&test_config(), router)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    port
}

fn assert_cors(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization"
    );
}

#[tokio::test]
async fn bedrock_route_returns_result() {
    let port = spawn_app(build_request_router(&test_config()).await).await;
    let client = Client::new();

    let response = client
        .post(format!("http://localhost:{}/api/bedrock", port))
        .body(r#"{"prompt":"hi"}"#)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    assert_cors(&response);
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({"result": "Mock response for: hi"}));
}

#[tokio::test]
async fn data_route_returns_rows() {
    let rows = vec![QueryRow::from([
        ("id".to_string(), FieldValue::Integer(1)),
        ("name".to_string(), FieldValue::String("a".to_string())),
    ])];
    let router = RequestRouter::new(
        Arc::new(MockModelInvoker::new(true)),
        Arc::new(MockTabularQuery::with_rows(rows)),
        "SELECT 1",
    );
    let port = spawn_app(router).await;

    let response = Client::new()
        .get(format!("http://localhost:{}/api/data?limit=5", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    assert_cors(&response);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({"data": [{"id": 1, "name": "a"}]}));
}

#[tokio::test]
async fn adapter_failures_return_generic_errors() {
    let router = RequestRouter::new(
        Arc::new(MockModelInvoker::new(false)),
        Arc::new(MockTabularQuery::new(false)),
        "SELECT 1",
    );
    let port = spawn_app(router).await;
    let client = Client::new();

    let response = client
        .post(format!("http://localhost:{}/api/bedrock", port))
        .body(r#"{"prompt":"hi"}"#)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 500);
    assert_cors(&response);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({"error": "Failed to invoke model"}));

    let response = client
        .get(format!("http://localhost:{}/api/data", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 500);
    assert_cors(&response);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({"error": "Failed to query data store"}));
}

#[tokio::test]
async fn unknown_routes_return_404_envelope() {
    let port = spawn_app(build_request_router(&test_config()).await).await;
    let client = Client::new();

    for (method, path) in [
        (reqwest::Method::GET, "/api/bedrock"),
        (reqwest::Method::POST, "/api/data"),
        (reqwest::Method::OPTIONS, "/api/data"),
        (reqwest::Method::GET, "/health"),
    ] {
        let response = client
            .request(method.clone(), format!("http://localhost:{}{}", port, path))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status().as_u16(), 404, "{} {}", method, path);
        assert_cors(&response);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body, json!({"error": "Not found"}));
    }
}

#[tokio::test]
async fn malformed_body_returns_400() {
    let port = spawn_app(build_request_router(&test_config()).await).await;

    let response = Client::new()
        .post(format!("http://localhost:{}/api/bedrock", port))
        .body("{not json")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 400);
    assert_cors(&response);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Invalid request body");
}
