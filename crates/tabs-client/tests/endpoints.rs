//! Endpoint wrappers build the documented paths, query strings and bodies,
//! and decode the documented response shapes.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tabs_client::api::{auth, categories, expenses, profile};
use tabs_client::client::ApiClient;
use tabs_client::credentials::{CredentialPair, CredentialStore, MemoryCredentialStore};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authed_client(server: &MockServer) -> (ApiClient, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::with_pair(CredentialPair {
        access: "A1".to_string(),
        refresh: "R1".to_string(),
    }));
    (ApiClient::new(server.uri(), store.clone()), store)
}

#[tokio::test]
async fn test_login_stores_pair() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/"))
        .and(body_json(json!({ "username": "sam", "password": "hunter2" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "A1", "refresh": "R1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = ApiClient::new(server.uri(), store.clone());

    let pair = auth::login(&client, "sam", "hunter2").await.unwrap();
    assert_eq!(pair.access, "A1");
    assert_eq!(
        store.get().unwrap(),
        Some(CredentialPair {
            access: "A1".to_string(),
            refresh: "R1".to_string()
        })
    );
}

#[tokio::test]
async fn test_logout_clears_store() {
    let server = MockServer::start().await;
    let (client, store) = authed_client(&server);

    auth::logout(&client).unwrap();
    assert_eq!(store.get().unwrap(), None);
}

#[tokio::test]
async fn test_expense_list_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/expenses/"))
        .and(query_param("page", "2"))
        .and(query_param("category", "Food"))
        .and(query_param("ordering", "-date"))
        .and(query_param("date__gte", "2025-01-01"))
        .and(query_param("date__lte", "2025-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": 1, "amount": "9.99", "category": "Food", "description": "lunch", "date": "2025-01-15" }
            ],
            "total_pages": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = authed_client(&server);
    let query = expenses::ExpenseQuery {
        page: Some(2),
        category: Some("Food".to_string()),
        ordering: Some(expenses::SortOrder::DateDesc),
        date_from: NaiveDate::from_ymd_opt(2025, 1, 1),
        date_to: NaiveDate::from_ymd_opt(2025, 1, 31),
    };

    let page = expenses::list(&client, &query).await.unwrap();
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].description, "lunch");
}

#[tokio::test]
async fn test_expense_create_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/expenses/"))
        .and(body_json(json!({
            "amount": "12.00",
            "category": "Transport",
            "description": "bus pass",
            "date": "2025-02-01"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42, "amount": "12.00", "category": "Transport",
            "description": "bus pass", "date": "2025-02-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = authed_client(&server);
    let expense = expenses::create(
        &client,
        &expenses::NewExpense {
            amount: "12.00".to_string(),
            category: "Transport".to_string(),
            description: "bus pass".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        },
    )
    .await
    .unwrap();
    assert_eq!(expense.id, 42);
}

#[tokio::test]
async fn test_expense_patch_sends_only_set_fields() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/expenses/7/"))
        .and(body_json(json!({ "amount": "20.00" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "amount": "20.00", "category": "Food",
            "description": "dinner", "date": "2025-02-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = authed_client(&server);
    let patch = expenses::ExpensePatch {
        amount: Some("20.00".to_string()),
        ..expenses::ExpensePatch::default()
    };
    let expense = expenses::update(&client, 7, &patch).await.unwrap();
    assert_eq!(expense.amount, "20.00");
}

#[tokio::test]
async fn test_expense_delete() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/expenses/7/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = authed_client(&server);
    expenses::delete(&client, 7).await.unwrap();
}

#[tokio::test]
async fn test_category_create_sends_null_budget() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/categories/"))
        .and(body_json(json!({ "name": "Rent", "color": "#64748b", "budget": null })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3, "name": "Rent", "color": "#64748b", "budget": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = authed_client(&server);
    let category = categories::create(
        &client,
        &categories::NewCategory {
            name: "Rent".to_string(),
            color: "#64748b".to_string(),
            budget: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(category.id, 3);
    assert_eq!(category.budget, None);
}

#[tokio::test]
async fn test_category_list_and_update() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Food", "color": "#ff0000", "budget": 250.0 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/categories/1/"))
        .and(body_json(json!({ "budget": 300.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "name": "Food", "color": "#ff0000", "budget": 300.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = authed_client(&server);

    let list = categories::list(&client).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].budget, Some(250.0));

    let patch = categories::CategoryPatch {
        budget: Some(Some(300.0)),
        ..categories::CategoryPatch::default()
    };
    let updated = categories::update(&client, 1, &patch).await.unwrap();
    assert_eq!(updated.budget, Some(300.0));
}

#[tokio::test]
async fn test_profile_get_carries_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/user/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "sam", "email": "sam@example.com",
            "full_name": "Sam Doe", "gender": "other"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = authed_client(&server);
    let p = profile::get(&client).await.unwrap();
    assert_eq!(p.username, "sam");
    assert_eq!(p.profile_picture, None);
}

#[tokio::test]
async fn test_verify_email_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/verify-email/dXNlcg/abc123/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "verified" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = ApiClient::new(server.uri(), store);
    auth::verify_email(&client, "dXNlcg", "abc123").await.unwrap();
}

#[tokio::test]
async fn test_password_reset_flow_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/password-reset/"))
        .and(body_json(json!({ "email": "sam@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "sent" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/password-reset/confirm/"))
        .and(body_json(json!({
            "email": "sam@example.com",
            "otp": "123456",
            "new_password": "s3cret!",
            "confirm_password": "s3cret!"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "done" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = ApiClient::new(server.uri(), store);

    auth::request_password_reset(&client, "sam@example.com")
        .await
        .unwrap();
    auth::confirm_password_reset(
        &client,
        &auth::PasswordResetConfirm {
            email: "sam@example.com".to_string(),
            otp: "123456".to_string(),
            new_password: "s3cret!".to_string(),
            confirm_password: "s3cret!".to_string(),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_backend_error_detail_surfaces() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/expenses/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"category": ["Invalid choice."]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = authed_client(&server);
    let err = expenses::create(
        &client,
        &expenses::NewExpense {
            amount: "1.00".to_string(),
            category: "Nope".to_string(),
            description: "x".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Invalid choice."));
}
