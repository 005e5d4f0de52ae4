//! Slot lifetime tests: durable records follow the visitor cookie, the
//! custom program lives only as long as the session cookie.

#![allow(clippy::unwrap_used)]

use stride_core::view::PROGRAM_ADVISORY_TEXT;
use stride_integration_tests::{TestServer, issued_visitor_id};

#[tokio::test]
async fn test_program_is_session_scoped_and_cart_is_durable() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let first = client.get(server.url("/")).send().await.unwrap();
    let visitor_id = issued_visitor_id(&first).unwrap();

    client
        .post(server.url("/cart/add"))
        .form(&[("name", "Resistance Bands"), ("price", "15.00")])
        .send()
        .await
        .unwrap();

    let body = client
        .post(server.url("/program"))
        .form(&[
            ("goal", "Endurance"),
            ("daysPerWeek", "4"),
            ("intensity", "High"),
            ("preferences", ""),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Your custom program has been generated and saved for this session."));
    assert!(body.contains("<p><strong>Goal:</strong> Endurance</p>"));
    assert!(body.contains("<p><strong>Notes:</strong> None provided.</p>"));

    let page = client.get(server.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains(PROGRAM_ADVISORY_TEXT));
    assert!(page.contains("Resistance Bands \u{d7} 1"));

    // A reopened browser keeps the visitor cookie but not the session cookie.
    let reopened = server.reopened_client(&visitor_id);
    let resp = reopened.get(server.url("/")).send().await.unwrap();
    assert!(issued_visitor_id(&resp).is_none());
    let page = resp.text().await.unwrap();
    assert!(page.contains("Resistance Bands \u{d7} 1"));
    assert!(!page.contains(PROGRAM_ADVISORY_TEXT));
    assert!(page.contains(r#"<div id="programSummary" class="program-summary"></div>"#));
}

#[tokio::test]
async fn test_program_overwrites_previous_selection() {
    let server = TestServer::spawn().await;
    let client = server.client();

    for goal in ["Weight Loss", "Flexibility"] {
        client
            .post(server.url("/program"))
            .form(&[
                ("goal", goal),
                ("daysPerWeek", "3"),
                ("intensity", "Low"),
                ("preferences", "Mornings"),
            ])
            .send()
            .await
            .unwrap();
    }

    let page = client.get(server.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("<strong>Goal:</strong> Flexibility"));
    assert!(!page.contains("<strong>Goal:</strong> Weight Loss"));
    assert_eq!(page.matches(PROGRAM_ADVISORY_TEXT).count(), 1);
}

#[tokio::test]
async fn test_unknown_visitor_cookie_starts_empty() {
    let server = TestServer::spawn().await;
    let client = server.client();

    client
        .post(server.url("/cart/add"))
        .form(&[("name", "Jump Rope"), ("price", "8.00")])
        .send()
        .await
        .unwrap();

    let stranger = server.reopened_client("00000000-0000-4000-8000-000000000000");
    let cart = stranger
        .get(server.url("/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!cart.contains("Jump Rope"));
}
