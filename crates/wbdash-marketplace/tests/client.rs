//! Integration tests for `MarketplaceClient` using wiremock HTTP mocks.

use wbdash_marketplace::{MarketplaceClient, UpstreamError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> MarketplaceClient {
    MarketplaceClient::new("test-token", 5, base_url, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn get_sends_raw_token_and_query_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/orders"))
        .and(header("Authorization", "test-token"))
        .and(query_param("take", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "orders": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let body = client
        .get(&client.orders_url(), &[("take", "1000".to_string())])
        .await
        .expect("request should succeed");

    assert_eq!(body, Some(serde_json::json!({ "orders": [] })));
}

#[tokio::test]
async fn non_success_status_yields_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/supplier/stocks"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let body = client
        .get(&client.stocks_url(), &[])
        .await
        .expect("non-2xx is not a transport error");

    assert!(body.is_none());
}

#[tokio::test]
async fn invalid_json_yields_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/supplies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let body = client
        .get(&client.supplies_url(), &[])
        .await
        .expect("bad body is not a transport error");

    assert!(body.is_none());
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let client = MarketplaceClient::new("test-token", 2, "http://127.0.0.1:1", "http://127.0.0.1:1")
        .expect("client construction should not fail");

    let result = client.get(&client.orders_url(), &[]).await;

    assert!(
        matches!(result, Err(UpstreamError::Http(_))),
        "expected Http error, got: {result:?}"
    );
}
