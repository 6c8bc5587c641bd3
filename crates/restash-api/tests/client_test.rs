// Integration tests for `CollectionClient` using wiremock.

use indexmap::IndexMap;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use restash_api::{CollectionClient, Error, RequestContext, UNKNOWN_CODE};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(defaults: &[(&str, &str)]) -> (MockServer, CollectionClient) {
    let server = MockServer::start().await;
    let defaults: IndexMap<String, String> = defaults
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    let client = CollectionClient::from_reqwest(
        &format!("{}/wp/v2/posts", server.uri()),
        defaults,
        reqwest::Client::new(),
    )
    .unwrap()
    .with_auth_param("_token", &SecretString::from("nonce-123".to_owned()));
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_query_merges_defaults_and_params() {
    let (server, client) = setup(&[("per_page", "10")]).await;

    let body = json!([
        { "id": 1, "title": "First" },
        { "id": 2, "title": "Second" },
    ]);

    Mock::given(method("GET"))
        .and(path("/wp/v2/posts"))
        .and(query_param("per_page", "10"))
        .and(query_param("orderby", "date"))
        .and(query_param("_token", "nonce-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let results = client
        .query(&[("orderby".to_owned(), "date".to_owned())])
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], 1);
    assert_eq!(results[1]["title"], "Second");
}

#[tokio::test]
async fn test_fetch_single_sends_view_context() {
    let (server, client) = setup(&[]).await;

    let body = json!({ "id": 7, "title": "Hello" });

    Mock::given(method("GET"))
        .and(path("/wp/v2/posts/7"))
        .and(query_param("context", "view"))
        .and(query_param("_token", "nonce-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let entity = client.fetch("7", RequestContext::View).await.unwrap();

    assert_eq!(entity["id"], 7);
    assert_eq!(entity["title"], "Hello");
}

#[tokio::test]
async fn test_create_posts_json_body() {
    let (server, client) = setup(&[]).await;

    let payload = json!({ "title": "new" });
    let created = json!({ "id": 42, "title": "new" });

    Mock::given(method("POST"))
        .and(path("/wp/v2/posts"))
        .and(query_param("context", "edit"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(&created))
        .mount(&server)
        .await;

    let entity = client.create(&payload, RequestContext::Edit).await.unwrap();

    assert_eq!(entity["id"], 42);
}

#[tokio::test]
async fn test_update_puts_json_body() {
    let (server, client) = setup(&[]).await;

    let payload = json!({ "id": 5, "title": "x" });
    let updated = json!({ "id": 5, "title": "x", "revision": 2 });

    Mock::given(method("PUT"))
        .and(path("/wp/v2/posts/5"))
        .and(query_param("context", "edit"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(&updated))
        .mount(&server)
        .await;

    let entity = client.update("5", &payload, RequestContext::Edit).await.unwrap();

    assert_eq!(entity["revision"], 2);
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_body_decoded_into_message_and_code() {
    let (server, client) = setup(&[]).await;

    Mock::given(method("GET"))
        .and(path("/wp/v2/posts/9"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Sorry, you are not allowed to do that.",
            "code": "rest_forbidden"
        })))
        .mount(&server)
        .await;

    let result = client.fetch("9", RequestContext::View).await;

    match result {
        Err(Error::Api {
            status,
            ref message,
            ref code,
            ref body,
        }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Sorry, you are not allowed to do that.");
            assert_eq!(code, "rest_forbidden");
            assert!(body.is_some());
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_code_uses_unknown_sentinel() {
    let (server, client) = setup(&[]).await;

    Mock::given(method("GET"))
        .and(path("/wp/v2/posts"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })),
        )
        .mount(&server)
        .await;

    let result = client.query(&[]).await;

    match result {
        Err(Error::Api {
            status,
            ref message,
            ref code,
            ..
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
            assert_eq!(code, UNKNOWN_CODE);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_with_non_json_body() {
    let (server, client) = setup(&[]).await;

    Mock::given(method("GET"))
        .and(path("/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let result = client.query(&[]).await;

    match result {
        Err(Error::Api {
            status,
            ref message,
            ref code,
            ref body,
        }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
            assert_eq!(code, UNKNOWN_CODE);
            assert!(body.is_none());
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_success_body_that_is_not_an_array_fails_decode() {
    let (server, client) = setup(&[]).await;

    Mock::given(method("GET"))
        .and(path("/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .mount(&server)
        .await;

    let result = client.query(&[]).await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
