//! Integration tests for `BrowserFetcher` against a scripted WebDriver.
//!
//! `wiremock` plays the driver: it accepts a session, answers navigation and
//! page-source commands, and either finds or never finds the ready element.
//! No browser is started.

use bbts_core::PaginationStyle;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bbts_scraper::{
    run_pagination, BrowserFetcher, BrowserOptions, FetchError, ListingExtractor, PageFetcher,
    PageRequest, SearchPlan, StopReason,
};

const SESSION_ID: &str = "bbts-session";

fn session_path(suffix: &str) -> String {
    format!("/session/{SESSION_ID}{suffix}")
}

fn wd_value(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": value }))
}

/// Mounts session creation, navigation and session deletion.
async fn scripted_driver() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(wd_value(json!({
            "sessionId": SESSION_ID,
            "capabilities": { "browserName": "chrome" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(session_path("/url")))
        .respond_with(wd_value(json!("about:blank")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(session_path("/url")))
        .respond_with(wd_value(json!(null)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(session_path("")))
        .respond_with(wd_value(json!(null)))
        .mount(&server)
        .await;

    server
}

/// The ready selector matches.
async fn element_found(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(session_path("/element")))
        .respond_with(wd_value(
            json!({ "element-6066-11e4-a52e-4f735466cecf": "ready-1" }),
        ))
        .mount(server)
        .await;
}

/// The ready selector never matches.
async fn element_never_found(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(session_path("/element")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": {
                "error": "no such element",
                "message": "no such element: Unable to locate element",
                "stacktrace": ""
            }
        })))
        .mount(server)
        .await;
}

async fn page_source(server: &MockServer, html: &str) {
    Mock::given(method("GET"))
        .and(path(session_path("/source")))
        .respond_with(wd_value(json!(html)))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer, ready_timeout_secs: u64) -> BrowserFetcher {
    let uri = server.uri();
    let options = BrowserOptions {
        webdriver_url: &uri,
        user_agent: "bbts-test/0.1",
        headless: true,
        ready_timeout_secs,
    };
    match BrowserFetcher::connect(
        "https://www.bigbadtoystore.com",
        PaginationStyle::PageIndex,
        &options,
    )
    .await
    {
        Ok(fetcher) => fetcher,
        Err(e) => panic!("failed to open scripted WebDriver session: {e}"),
    }
}

fn plan(max_pages: u32) -> SearchPlan<'static> {
    SearchPlan {
        search_term: "iron man",
        page_size: 100,
        max_pages,
        pagination: PaginationStyle::PageIndex,
        inter_request_delay_ms: 0,
    }
}

async fn deleted_session(server: &MockServer) -> bool {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .any(|r| r.method.as_str() == "DELETE" && r.url.path() == session_path(""))
}

// ---------------------------------------------------------------------------
// ready wait
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ready_wait_expiry_maps_to_timeout() {
    let server = scripted_driver().await;
    element_never_found(&server).await;
    page_source(&server, "<html><body></body></html>").await;

    let fetcher = connect(&server, 1).await;
    let request = PageRequest {
        page_index: 1,
        search_term: "iron man",
        page_size: 100,
    };
    let err = fetcher.fetch(&request).await.unwrap_err();

    match err {
        FetchError::Timeout { url, waited_secs } => {
            assert_eq!(waited_secs, 1);
            assert!(url.contains("PageIndex=1"), "got: {url}");
        }
        other => panic!("expected Timeout, got: {other:?}"),
    }
    fetcher.close().await.unwrap();
}

#[tokio::test]
async fn no_results_marker_ends_pagination_cleanly() {
    let server = scripted_driver().await;
    element_found(&server).await;
    page_source(
        &server,
        r#"<html><body><div class="search-no-results">No products found.</div></body></html>"#,
    )
    .await;

    let fetcher = connect(&server, 5).await;
    let extractor = ListingExtractor::standard().unwrap();
    let outcome = run_pagination(&fetcher, &extractor, &plan(3)).await;
    fetcher.close().await.unwrap();

    assert!(
        matches!(outcome.stop, StopReason::EndOfResults { page: 1 }),
        "expected EndOfResults on page 1, got: {:?}",
        outcome.stop
    );
    assert!(!outcome.fetch_failed());
    assert_eq!(outcome.pages_fetched, 1);
    assert!(outcome.records.is_empty());
}

#[tokio::test]
async fn rendered_results_are_extracted_with_photo() {
    let server = scripted_driver().await;
    element_found(&server).await;
    page_source(
        &server,
        r#"<html><body><div class="results-list">
            <div class="row">
                <img class="search-product-thumbnail" src="https://images.example.com/thanos.jpg">
                <div class="product-name">Thanos</div>
                <div class="search-product-companies">Hasbro</div>
            </div>
        </div></body></html>"#,
    )
    .await;

    let fetcher = connect(&server, 5).await;
    let request = PageRequest {
        page_index: 2,
        search_term: "iron man",
        page_size: 100,
    };
    let doc = fetcher.fetch(&request).await.unwrap();
    fetcher.close().await.unwrap();

    let records = ListingExtractor::standard().unwrap().extract(&doc.html).records;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].photo, "https://images.example.com/thanos.jpg");

    let navigations: Vec<String> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == session_path("/url"))
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect();
    assert_eq!(navigations.len(), 1);
    assert!(
        navigations[0].contains("PageIndex=2"),
        "got: {}",
        navigations[0]
    );
}

// ---------------------------------------------------------------------------
// session lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn close_after_failed_page_deletes_session() {
    let server = scripted_driver().await;
    element_never_found(&server).await;

    let fetcher = connect(&server, 1).await;
    let extractor = ListingExtractor::standard().unwrap();
    let outcome = run_pagination(&fetcher, &extractor, &plan(3)).await;

    assert!(matches!(
        outcome.stop,
        StopReason::FetchFailed {
            page: 1,
            error: FetchError::Timeout { .. }
        }
    ));
    assert!(!deleted_session(&server).await);

    fetcher.close().await.unwrap();

    assert!(deleted_session(&server).await);
}

#[tokio::test]
async fn refused_session_maps_to_driver_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": {
                "error": "session not created",
                "message": "Chrome failed to start",
                "stacktrace": ""
            }
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let options = BrowserOptions {
        webdriver_url: &uri,
        user_agent: "bbts-test/0.1",
        headless: true,
        ready_timeout_secs: 1,
    };
    let result = BrowserFetcher::connect(
        "https://www.bigbadtoystore.com",
        PaginationStyle::PageIndex,
        &options,
    )
    .await;

    match result {
        Err(FetchError::DriverUnavailable { webdriver_url, .. }) => {
            assert_eq!(webdriver_url, uri);
        }
        Err(other) => panic!("expected DriverUnavailable, got: {other:?}"),
        Ok(_) => panic!("expected DriverUnavailable, got a session"),
    }
}
