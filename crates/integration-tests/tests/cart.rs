//! Cart integration tests: add to cart, cart containers and the
//! `cart-updated` trigger.

#![allow(clippy::unwrap_used)]

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use stride_core::view::EMPTY_CART_TEXT;
use stride_integration_tests::TestServer;

async fn add(server: &TestServer, client: &Client, name: &str, price: &str) -> Response {
    client
        .post(server.url("/cart/add"))
        .form(&[("name", name), ("price", price)])
        .send()
        .await
        .unwrap()
}

fn item_count(response: &Response) -> u64 {
    let trigger = response.headers().get("HX-Trigger").unwrap().to_str().unwrap();
    let events: Value = serde_json::from_str(trigger).unwrap();
    events["cart-updated"]["itemCount"].as_u64().unwrap()
}

#[tokio::test]
async fn test_cart_accumulates_quantities_and_total() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let resp = add(&server, &client, "Yoga Mat", "20.00").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(item_count(&resp), 1);
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"id="cartNotice" hx-swap-oob="innerHTML""#));
    assert!(body.contains("Yoga Mat has been added to your cart."));

    let resp = add(&server, &client, "Yoga Mat", "20.00").await;
    assert_eq!(item_count(&resp), 2);

    let resp = add(&server, &client, "Water Bottle", "5.50").await;
    assert_eq!(item_count(&resp), 3);
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"id="cartTotal" hx-swap-oob="innerHTML">Total: $45.50<"#));

    let cart = client
        .get(server.url("/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(cart.contains("<li>Yoga Mat \u{d7} 2 \u{2013} $40.00</li>"));
    assert!(cart.contains("<li>Water Bottle \u{d7} 1 \u{2013} $5.50</li>"));
    assert!(cart.contains("Total: $45.50"));

    let page = client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains(r#"<span id="cartCount">3</span>"#));
}

#[tokio::test]
async fn test_first_price_wins_for_repeat_adds() {
    let server = TestServer::spawn().await;
    let client = server.client();

    add(&server, &client, "Kettlebell", "45.00").await;
    add(&server, &client, "Kettlebell", "99.00").await;

    let cart = client
        .get(server.url("/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(cart.contains("Kettlebell \u{d7} 2 \u{2013} $90.00"));
    assert!(cart.contains("Total: $90.00"));
}

#[tokio::test]
async fn test_invalid_adds_are_ignored() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let zero = add(&server, &client, "Jump Rope", "0").await;
    assert_eq!(zero.status(), StatusCode::NO_CONTENT);
    assert!(zero.headers().get("HX-Trigger").is_none());

    let garbage = add(&server, &client, "Jump Rope", "free").await;
    assert_eq!(garbage.status(), StatusCode::NO_CONTENT);

    let nameless = add(&server, &client, "", "8.00").await;
    assert_eq!(nameless.status(), StatusCode::NO_CONTENT);

    let cart = client
        .get(server.url("/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(cart.contains(EMPTY_CART_TEXT));
    assert!(cart.contains(r#"<p id="cartTotal"></p>"#));
}

#[tokio::test]
async fn test_concurrent_adds_are_not_lost() {
    let server = TestServer::spawn().await;
    let client = server.client();

    // Establish the visitor first so every add targets the same records.
    client.get(server.url("/")).send().await.unwrap();

    let (a, b, c) = tokio::join!(
        add(&server, &client, "Foam Roller", "24.99"),
        add(&server, &client, "Foam Roller", "24.99"),
        add(&server, &client, "Foam Roller", "24.99"),
    );
    assert!([a, b, c].iter().all(|r| r.status() == StatusCode::OK));

    let cart = client
        .get(server.url("/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(cart.contains("Foam Roller \u{d7} 3 \u{2013} $74.97"));
}
