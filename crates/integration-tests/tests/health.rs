//! Health endpoint tests.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use stride_integration_tests::{TestServer, issued_visitor_id};

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let resp = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(issued_visitor_id(&resp).is_none());
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client.get(server.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let resp = client
        .get(server.url("/health"))
        .header("x-request-id", "it-1234")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "it-1234");
}
