//! HTTP contract tests for `NewsClient` against a mock backend.
//!
//! Each test starts its own `MockServer`, so they run in isolation and in
//! parallel.

use newsdesk::api::{FetchError, FetchRequest, NewsClient};
use newsdesk::render::{DisplayFragment, Renderer, NO_CONTENT};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> NewsClient {
    NewsClient::new(&server.uri()).unwrap()
}

#[tokio::test]
async fn test_single_article_renders_with_fallbacks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/news/fetch"))
        .and(query_param("category", "technology"))
        .and(query_param_is_missing("search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": [{"title": "A"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let articles = client
        .fetch_articles(&FetchRequest::new("technology"))
        .await
        .unwrap();
    assert_eq!(articles.len(), 1);

    let fragment = Renderer::default().render(&articles);
    let cards = fragment.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "A");
    assert_eq!(cards[0].body, NO_CONTENT);
    assert_eq!(cards[0].image_url, None);
}

#[tokio::test]
async fn test_http_500_surfaces_body_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/news/fetch"))
        .and(query_param("category", "business"))
        .and(query_param("search", "ai"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch_articles(&FetchRequest::new("business").with_search("ai"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "boom");
}

#[tokio::test]
async fn test_http_error_without_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch_articles(&FetchRequest::new("health"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! Status: 503");
}

#[tokio::test]
async fn test_application_failure_uses_error_or_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("category", "sports"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": "quota exceeded"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("category", "science"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch_articles(&FetchRequest::new("sports"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Application(ref m) if m == "quota exceeded"));

    let err = client
        .fetch_articles(&FetchRequest::new("science"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch news");
}

#[tokio::test]
async fn test_null_or_missing_data_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("category", "general"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": null})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("category", "entertainment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    for category in ["general", "entertainment"] {
        let articles = client
            .fetch_articles(&FetchRequest::new(category))
            .await
            .unwrap();
        assert!(articles.is_empty());
        assert_eq!(Renderer::default().render(&articles), DisplayFragment::NoResults);
    }
}

#[tokio::test]
async fn test_non_json_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch_articles(&FetchRequest::new("business"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_custom_source_forwarded_as_query_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/news/fetch"))
        .and(query_param("category", "business"))
        .and(query_param("api_url", "https://api.example.com/v2/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let articles = client
        .fetch_articles(&FetchRequest::new("business").with_source("https://api.example.com/v2/news"))
        .await
        .unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_private_custom_source_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    for source in ["http://localhost:8080/feed", "http://10.0.0.5/feed", "file:///etc/passwd"] {
        let err = client
            .fetch_articles(&FetchRequest::new("business").with_source(source))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidSourceUrl(_)), "{source}");
    }
}

#[tokio::test]
async fn test_oversized_response_rejected() {
    let server = MockServer::start().await;
    let huge = "x".repeat(newsdesk::api::MAX_RESPONSE_SIZE + 1);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(huge))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch_articles(&FetchRequest::new("business"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::ResponseTooLarge(_)));
}

#[tokio::test]
async fn test_source_lookup_success_and_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/news/admin/fetch_source"))
        .and(query_param("id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"success": true, "source": {"id": 7, "name": "Wire"}}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apps/news/admin/fetch_source"))
        .and(query_param("id", "8"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let source = client.fetch_source("7").await.unwrap();
    assert_eq!(source, json!({"id": 7, "name": "Wire"}));

    let err = client.fetch_source("8").await.unwrap_err();
    assert_eq!(err.to_string(), "Source not found");
}

#[tokio::test]
async fn test_import_posts_form_and_reports_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps/news/import"))
        .and(body_string_contains("data=ZGF0YQ%3D%3D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "count": 4})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.import_data("ZGF0YQ==").await.unwrap(), 4);
}

#[tokio::test]
async fn test_import_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"success": false, "error": "bad payload"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.import_data("!!").await.unwrap_err();
    assert_eq!(err.to_string(), "bad payload");
}

#[tokio::test]
async fn test_empty_admin_inputs_send_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(matches!(
        client.fetch_source("  ").await,
        Err(FetchError::EmptyInput(_))
    ));
    let err = client.import_data("").await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter base64 encoded data");
}

#[tokio::test]
async fn test_oversized_error_pages_report_status() {
    let server = MockServer::start().await;
    let page = "<html>".repeat(newsdesk::api::MAX_RESPONSE_SIZE / 6 + 1);
    Mock::given(method("GET"))
        .and(path("/apps/news/fetch"))
        .respond_with(ResponseTemplate::new(502).set_body_string(page.clone()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/apps/news/import"))
        .respond_with(ResponseTemplate::new(502).set_body_string(page))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch_articles(&FetchRequest::new("business").with_search("ai"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "HTTP error! Status: 502");

    let err = client.import_data("ZGF0YQ==").await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}
