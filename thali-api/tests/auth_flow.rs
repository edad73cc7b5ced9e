/// Integration tests for registration and login
///
/// Covers the three principal flows end to end through the router:
/// - Duplicate registration is a conflict, never an overwrite
/// - Login echoes the principal without any password material
/// - Role assertions on login
/// - Owner bootstrap is idempotent and limited to the configured pair

mod common;

use axum::http::StatusCode;
use common::{unique_email, TestContext};
use serde_json::json;
use thali_shared::{
    auth::jwt::TokenIssuer,
    models::{delivery_agent::DeliveryAgent, owner::Owner, role::Role, user::User},
};

#[tokio::test]
async fn test_register_then_duplicate_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("dup");
    let body = json!({ "username": "a", "email": email, "password": "p1" });

    let (status, response) = ctx.post("/register", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["message"], "User created successfully");

    let (status, response) = ctx.post("/register", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "User already exists");

    assert_eq!(User::count_by_email(&ctx.db, &email).await.unwrap(), 1);
}

#[tokio::test]
async fn test_login_returns_token_and_user_without_password() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("login");

    ctx.post("/register", json!({ "username": "a", "email": email, "password": "p1" }))
        .await;

    let (status, response) = ctx
        .post("/login", json!({ "email": email, "password": "p1" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let user = &response["user"];
    assert_eq!(user["username"], "a");
    assert_eq!(user["email"], email.as_str());
    assert_eq!(user["role"], "user");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    let token = response["token"].as_str().unwrap();
    let claims = TokenIssuer::new(&ctx.config.jwt.secret).verify(token).unwrap();
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.email.as_deref(), Some(email.as_str()));
    assert_eq!(claims.sub.to_string(), user["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_login_with_wrong_password_or_unknown_email() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("wrong");

    ctx.post("/register", json!({ "username": "a", "email": email, "password": "p1" }))
        .await;

    let (status, response) = ctx
        .post("/login", json!({ "email": email, "password": "p2" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Invalid credentials");

    let (status, response) = ctx
        .post("/login", json!({ "email": unique_email("nobody"), "password": "p1" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_with_mismatched_role_is_denied() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("role");

    let (status, _) = ctx
        .post(
            "/register",
            json!({ "username": "d", "email": email, "password": "p1", "role": "delivery" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = ctx
        .post("/login", json!({ "email": email, "password": "p1", "role": "owner" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Access denied for this role");

    let (status, response) = ctx
        .post("/login", json!({ "email": email, "password": "p1", "role": "delivery" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["user"]["role"], "delivery");
}

#[tokio::test]
async fn test_delivery_register_and_login() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("rider");
    let body = json!({ "name": "Ravi", "email": email, "password": "p1", "phone": "9876543210" });

    let (status, response) = ctx.post("/api/delivery/register", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["message"], "Delivery boy registered successfully");

    let (status, response) = ctx.post("/api/delivery/register", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Delivery boy already exists");
    assert_eq!(DeliveryAgent::count_by_email(&ctx.db, &email).await.unwrap(), 1);

    let (status, response) = ctx
        .post("/api/delivery/login", json!({ "email": email, "password": "p1" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let agent = &response["deliveryBoy"];
    assert_eq!(agent["name"], "Ravi");
    assert_eq!(agent["phone"], "9876543210");
    assert_eq!(agent["role"], "delivery");
    assert!(agent["createdAt"].is_string());
    assert!(!response.to_string().contains("$argon2"));

    let claims = TokenIssuer::new(&ctx.config.jwt.secret)
        .verify(response["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.role, Role::Delivery);
    assert!(claims.email.is_none());
}

#[tokio::test]
async fn test_same_email_may_exist_in_different_principal_tables() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("both");

    let (status, _) = ctx
        .post("/register", json!({ "username": "a", "email": email, "password": "p1" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = ctx
        .post(
            "/api/delivery/register",
            json!({ "name": "a", "email": email, "password": "p1", "phone": "1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_owner_login_bootstraps_once() {
    let owner_email = unique_email("owner");
    let ctx = TestContext::with_config(|config| {
        config.owner.email = owner_email.clone();
        config.owner.password = "12345".to_string();
    })
    .await
    .unwrap();

    let credentials = json!({ "email": owner_email, "password": "12345" });

    let (status, first) = ctx.post("/owner/login", credentials.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["user"]["username"], "Owner");
    assert_eq!(first["user"]["role"], "owner");

    let (status, second) = ctx.post("/owner/login", credentials).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["user"]["id"], second["user"]["id"]);

    assert_eq!(Owner::count_by_email(&ctx.db, &owner_email).await.unwrap(), 1);

    let claims = TokenIssuer::new(&ctx.config.jwt.secret)
        .verify(second["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.role, Role::Owner);
}

#[tokio::test]
async fn test_owner_login_rejects_other_pairs() {
    let owner_email = unique_email("owner");
    let ctx = TestContext::with_config(|config| {
        config.owner.email = owner_email.clone();
    })
    .await
    .unwrap();

    let (status, response) = ctx
        .post("/owner/login", json!({ "email": owner_email, "password": "nope" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Invalid owner credentials");

    assert_eq!(Owner::count_by_email(&ctx.db, &owner_email).await.unwrap(), 0);
}

#[tokio::test]
async fn test_owner_login_rejects_stored_pair_once_configuration_changes() {
    let owner_email = unique_email("owner");
    let original_password = "12345".to_string();

    let before = TestContext::with_config(|config| {
        config.owner.email = owner_email.clone();
        config.owner.password = original_password.clone();
    })
    .await
    .unwrap();

    let stored_pair = json!({ "email": owner_email, "password": original_password });
    let (status, _) = before.post("/owner/login", stored_pair.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(Owner::count_by_email(&before.db, &owner_email).await.unwrap(), 1);

    // The stored row still carries a hash of the old password.
    let after = TestContext::with_config(|config| {
        config.owner.email = owner_email.clone();
        config.owner.password = "rotated-password".to_string();
    })
    .await
    .unwrap();

    let (status, response) = after.post("/owner/login", stored_pair).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Invalid owner credentials");

    assert_eq!(Owner::count_by_email(&after.db, &owner_email).await.unwrap(), 1);
}
