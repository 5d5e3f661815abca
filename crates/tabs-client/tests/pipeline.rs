//! Request pipeline behavior against a mock backend: bearer injection,
//! single refresh-and-replay on 401, and session teardown on refresh
//! failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use tabs_client::api::expenses::{self, ExpenseQuery};
use tabs_client::client::{ApiClient, ApiRequest};
use tabs_client::credentials::{CredentialPair, CredentialStore, MemoryCredentialStore};
use tabs_client::error::ApiError;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seeded_store(access: &str, refresh: &str) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_pair(CredentialPair {
        access: access.to_string(),
        refresh: refresh.to_string(),
    }))
}

fn empty_page() -> serde_json::Value {
    json!({ "results": [], "total_pages": 1 })
}

#[tokio::test]
async fn test_bearer_header_attached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/expenses/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("A1", "R1");
    let client = ApiClient::new(server.uri(), store);

    let page = expenses::list(&client, &ExpenseQuery::default()).await.unwrap();
    assert!(page.results.is_empty());
}

/// Happy-path recovery: A1 is rejected, refresh mints A2, the replay
/// succeeds, and the store ends up holding A2 alongside R1.
#[tokio::test]
async fn test_refresh_and_replay_once_on_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/expenses/1/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .and(body_json(json!({ "refresh": "R1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/expenses/1/"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("A1", "R1");
    let client = ApiClient::new(server.uri(), store.clone());

    let body: serde_json::Value = client
        .execute(&ApiRequest::get("/expenses/1/"))
        .await
        .unwrap();
    assert_eq!(body, json!({ "id": 1 }));

    let pair = store.get().unwrap().unwrap();
    assert_eq!(pair.access, "A2");
    assert_eq!(pair.refresh, "R1");
}

/// A 401 on the replay propagates; no second refresh call is made.
#[tokio::test]
async fn test_second_401_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/expenses/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "still no"})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("A1", "R1");
    let client = ApiClient::new(server.uri(), store);

    let err = expenses::list(&client, &ExpenseQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
}

/// No refresh token stored: the failure is immediate and no refresh call
/// hits the network.
#[tokio::test]
async fn test_missing_refresh_token_fails_immediately() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/expenses/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = ApiClient::new(server.uri(), store);

    let err = expenses::list(&client, &ExpenseQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Unauthenticated);
}

/// Refresh failure tears the session down: tokens cleared, hook fired
/// exactly once, and the caller receives the original 401 (not the
/// refresh error).
#[tokio::test]
async fn test_refresh_failure_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/expenses/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "original failure"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "refresh rejected"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("A1", "R1");
    let expirations = Arc::new(AtomicUsize::new(0));
    let counter = expirations.clone();
    let client = ApiClient::new(server.uri(), store.clone())
        .with_session_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let err = expenses::list(&client, &ExpenseQuery::default())
        .await
        .unwrap_err();

    let ApiError::Http { status, message } = err else {
        panic!("expected Http error, got {err:?}");
    };
    assert_eq!(status, 401);
    assert!(message.contains("original failure"), "got: {message}");

    assert_eq!(store.get().unwrap(), None);
    assert_eq!(expirations.load(Ordering::SeqCst), 1);
}

/// Anonymous requests skip both the bearer header and the interception:
/// a 401 from the token endpoint surfaces as-is with no refresh attempt.
#[tokio::test]
async fn test_anonymous_request_not_intercepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "No active account found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(0)
        .mount(&server)
        .await;

    let store = seeded_store("A1", "R1");
    let client = ApiClient::new(server.uri(), store.clone());

    let err = tabs_client::api::auth::login(&client, "sam", "wrong")
        .await
        .unwrap_err();
    let ApiError::Http { status, message } = err else {
        panic!("expected Http error, got {err:?}");
    };
    assert_eq!(status, 401);
    assert!(message.contains("No active account found"));

    // The stored pair is untouched by a failed login.
    assert_eq!(store.get().unwrap().unwrap().access, "A1");
}

/// Connection failures are never retried and never touch the store.
#[tokio::test]
async fn test_network_error_propagates_without_retry() {
    let store = seeded_store("A1", "R1");
    // Nothing listens here; connections are refused.
    let client = ApiClient::new("http://127.0.0.1:1", store.clone());

    let err = expenses::list(&client, &ExpenseQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
    assert_eq!(store.get().unwrap().unwrap().access, "A1");
}
