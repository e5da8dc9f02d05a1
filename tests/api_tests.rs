//! API integration tests
//!
//! These run against a live server with a migrated database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:5000";

fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}+{}@example.com", prefix, nanos)
}

/// Register an account and return (token, email)
async fn register(client: &Client, prefix: &str, role: Option<&str>) -> (String, String) {
    let email = unique_email(prefix);
    let mut body = json!({
        "name": "Test User",
        "email": email,
        "password": "password123",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }

    let response = client
        .post(format!("{}/api/auth/register", BASE_URL))
        .json(&body)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("No token in response");
    (token.to_string(), email)
}

/// Create a book as admin and return its id
async fn create_book(client: &Client, admin_token: &str, title: &str, copies: i64) -> String {
    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .bearer_auth(admin_token)
        .json(&json!({
            "title": title,
            "author": "Integration Author",
            "totalCopies": copies,
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_str().expect("No id in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_login_me_roundtrip() {
    let client = Client::new();
    let (_, email) = register(&client, "roundtrip", None).await;

    // Fresh login returns a new sealed token
    let response = client
        .post(format!("{}/api/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("No token in response");

    // The token resolves back to the same account with role member
    let response = client
        .get(format!("{}/api/auth/me", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send me request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], email);
    assert_eq!(body["role"], "member");
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (_, email) = register(&client, "badlogin", None).await;

    let response = client
        .post(format!("{}/api/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_conflict() {
    let client = Client::new();
    let (_, email) = register(&client, "duplicate", None).await;

    let response = client
        .post(format!("{}/api/auth/register", BASE_URL))
        .json(&json!({
            "name": "Someone Else",
            "email": email,
            "password": "password456",
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_me_requires_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_tampered_token_rejected() {
    let client = Client::new();
    let (token, _) = register(&client, "tampered", None).await;

    let mut tampered = token;
    tampered.push('x');

    let response = client
        .get(format!("{}/api/auth/me", BASE_URL))
        .bearer_auth(tampered)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_create_book() {
    let client = Client::new();
    let (member_token, _) = register(&client, "member-gate", None).await;

    let response = client
        .post(format!("{}/api/books", BASE_URL))
        .bearer_auth(member_token)
        .json(&json!({ "title": "Forbidden", "author": "Nobody" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_list_books_paginated() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "lister", Some("admin")).await;
    create_book(&client, &admin_token, "Paginated Book", 2).await;

    let response = client
        .get(format!("{}/api/books?page=1&limit=5", BASE_URL))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 5);
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
    assert!(body["totalPages"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_roundtrip() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "circ-admin", Some("admin")).await;
    let (member_token, _) = register(&client, "circ-member", None).await;
    let book_id = create_book(&client, &admin_token, "Single Copy", 1).await;

    // Borrow takes the only copy
    let response = client
        .post(format!("{}/api/borrow/borrow", BASE_URL))
        .bearer_auth(&member_token)
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let borrow: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = borrow["id"].as_str().expect("No borrow id").to_string();
    assert!(borrow["returnDate"].is_null());

    // A second borrow finds no copies
    let response = client
        .post(format!("{}/api/borrow/borrow", BASE_URL))
        .bearer_auth(&member_token)
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 409);

    // Return restores the copy
    let response = client
        .post(format!("{}/api/borrow/return", BASE_URL))
        .bearer_auth(&member_token)
        .json(&json!({ "borrowId": borrow_id }))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 200);

    let returned: Value = response.json().await.expect("Failed to parse response");
    assert!(!returned["returnDate"].is_null());

    // Returning twice conflicts
    let response = client
        .post(format!("{}/api/borrow/return", BASE_URL))
        .bearer_auth(&member_token)
        .json(&json!({ "borrowId": borrow_id }))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_return_by_other_user_forbidden() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "owner-admin", Some("admin")).await;
    let (borrower_token, _) = register(&client, "owner-borrower", None).await;
    let (other_token, _) = register(&client, "owner-other", None).await;
    let book_id = create_book(&client, &admin_token, "Owned Copy", 1).await;

    let response = client
        .post(format!("{}/api/borrow/borrow", BASE_URL))
        .bearer_auth(&borrower_token)
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let borrow: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = borrow["id"].as_str().expect("No borrow id");

    let response = client
        .post(format!("{}/api/borrow/return", BASE_URL))
        .bearer_auth(&other_token)
        .json(&json!({ "borrowId": borrow_id }))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_borrow_history() {
    let client = Client::new();
    let (admin_token, _) = register(&client, "history-admin", Some("admin")).await;
    let (member_token, _) = register(&client, "history-member", None).await;
    let book_id = create_book(&client, &admin_token, "History Book", 3).await;

    let response = client
        .post(format!("{}/api/borrow/borrow", BASE_URL))
        .bearer_auth(&member_token)
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/api/borrow/history/me", BASE_URL))
        .bearer_auth(&member_token)
        .send()
        .await
        .expect("Failed to send history request");
    assert!(response.status().is_success());

    let history: Value = response.json().await.expect("Failed to parse response");
    let entries = history.as_array().expect("History is not an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["book"]["title"], "History Book");
}

#[tokio::test]
#[ignore]
async fn test_active_members_report_is_admin_only() {
    let client = Client::new();
    let (member_token, _) = register(&client, "report-member", None).await;

    let response = client
        .get(format!("{}/api/borrow/reports/active-members", BASE_URL))
        .bearer_auth(&member_token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_graphql_me_and_books() {
    let client = Client::new();
    let (token, email) = register(&client, "graphql", None).await;

    let response = client
        .post(format!("{}/graphql", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "query": "{ me { email role } books(page: 1, limit: 5) { title availableCopies } }"
        }))
        .send()
        .await
        .expect("Failed to send graphql request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["me"]["email"], email);
    assert_eq!(body["data"]["me"]["role"], "member");
    assert!(body["data"]["books"].is_array());
}
