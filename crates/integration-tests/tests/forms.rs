//! Form integration tests: status lines, reset vs echo, and persisted lists.

#![allow(clippy::unwrap_used)]

use reqwest::Client;
use stride_core::view::EMPTY_FEEDBACK_TEXT;
use stride_integration_tests::TestServer;

async fn post(server: &TestServer, client: &Client, path: &str, form: &[(&str, &str)]) -> String {
    let resp = client.post(server.url(path)).form(form).send().await.unwrap();
    assert!(resp.status().is_success());
    resp.text().await.unwrap()
}

#[tokio::test]
async fn test_newsletter_rejects_blank_email_and_echoes_it() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let body = post(&server, &client, "/newsletter", &[("email", "   ")]).await;
    assert!(body.contains(r#"<span style="color: red">Please enter a valid email address.</span>"#));
    assert!(body.contains(r#"name="email" type="email" value="   ""#));
}

#[tokio::test]
async fn test_newsletter_accepts_any_non_blank_email() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let body = post(&server, &client, "/newsletter", &[("email", "not-an-email")]).await;
    assert!(body.contains(
        r#"<span style="color: green">Thanks for subscribing! Check your inbox for updates.</span>"#
    ));
    assert!(!body.contains("color: red"));
}

#[tokio::test]
async fn test_newsletter_success_resets_form() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let body = post(&server, &client, "/newsletter", &[("email", "  ana@example.com ")]).await;
    assert!(body.contains(
        r#"<span style="color: green">Thanks for subscribing! Check your inbox for updates.</span>"#
    ));
    assert!(body.contains(r#"name="email" type="email" value="""#));
}

#[tokio::test]
async fn test_contact_requires_name_and_email() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let body = post(
        &server,
        &client,
        "/contact",
        &[("name", ""), ("email", "lee@example.com"), ("message", "Hi")],
    )
    .await;
    assert!(body.contains("Please provide your name and email."));
    assert!(body.contains(r#"value="lee@example.com""#));

    let body = post(
        &server,
        &client,
        "/contact",
        &[("name", "Lee"), ("email", "lee@example.com"), ("message", "")],
    )
    .await;
    assert!(body.contains("Thank you for contacting us! We will follow up soon."));
}

#[tokio::test]
async fn test_feedback_list_survives_reload_in_order() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let page = client.get(server.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains(EMPTY_FEEDBACK_TEXT));

    let body = post(
        &server,
        &client,
        "/feedback",
        &[("name", "Ana"), ("rating", "4"), ("comments", "")],
    )
    .await;
    assert!(body.contains(r#"id="feedbackList" hx-swap-oob="innerHTML""#));

    post(
        &server,
        &client,
        "/feedback",
        &[("name", "Lee"), ("rating", "5"), ("comments", "Great!")],
    )
    .await;

    let page = client.get(server.url("/")).send().await.unwrap().text().await.unwrap();
    let ana = page.find("<h3>Ana (Rating: 4/5)</h3>").unwrap();
    let lee = page.find("<h3>Lee (Rating: 5/5)</h3><p>Great!</p>").unwrap();
    assert!(ana < lee);
    assert!(!page.contains(EMPTY_FEEDBACK_TEXT));
}

#[tokio::test]
async fn test_feedback_without_name_is_rejected() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let body = post(
        &server,
        &client,
        "/feedback",
        &[("name", " "), ("rating", "3"), ("comments", "meh")],
    )
    .await;
    assert!(body.contains("Please provide your name for feedback."));
    assert!(!body.contains("hx-swap-oob"));
}

#[tokio::test]
async fn test_markup_in_input_is_escaped() {
    let server = TestServer::spawn().await;
    let client = server.client();

    post(
        &server,
        &client,
        "/feedback",
        &[("name", "<b>Eve</b>"), ("rating", "5"), ("comments", "Tom & Jerry")],
    )
    .await;

    let page = client.get(server.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("&lt;b&gt;Eve&lt;/b&gt; (Rating: 5/5)"));
    assert!(page.contains("Tom &amp; Jerry"));
    assert!(!page.contains("<b>Eve</b>"));
}
