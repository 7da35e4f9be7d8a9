mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_creates_account() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.register("alice", "pw1").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User created");
    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_conflict() -> Result<()> {
    let server = common::TestServer::start().await?;

    server.register("alice", "pw1").await?;
    let res = server.register("alice", "other").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn register_requires_both_fields() -> Result<()> {
    let server = common::TestServer::start().await?;

    for body in [json!({}), json!({ "username": "bob" }), json!({ "password": "pw" })] {
        let res = server
            .client
            .post(server.url("/api/register"))
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");

        let err: Value = res.json().await?;
        assert_eq!(err["code"], "VALIDATION_ERROR");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn login_returns_token() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.register("alice", "pw1").await?;

    let res = server.login("alice", "pw1").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["expires_in"], 3600);
    Ok(())
}

#[tokio::test]
async fn unknown_user_and_wrong_password_look_the_same() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.register("alice", "pw1").await?;

    let wrong_password = server.login("alice", "nope").await?;
    let unknown_user = server.login("mallory", "pw1").await?;

    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_user.status(), StatusCode::BAD_REQUEST);

    let a: Value = wrong_password.json().await?;
    let b: Value = unknown_user.json().await?;
    assert_eq!(a, b);
    assert_eq!(a["code"], "INVALID_CREDENTIALS");
    Ok(())
}

#[tokio::test]
async fn profile_returns_caller() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.signup("alice", "pw1").await?;

    let res = server
        .client
        .get(server.url("/api/profile"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["username"], "alice");
    assert!(body["id"].as_i64().is_some());
    assert!(body.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn missing_token_is_401() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.client.get(server.url("/api/transactions")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_403() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .get(server.url("/api/transactions"))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_403() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.register("alice", "pw1").await?;

    let keys = server.token_keys()?;
    let issued_at = chrono::Utc::now() - chrono::Duration::hours(2);
    let expired = keys.issue_at(1, "alice", issued_at)?;

    let res = server
        .client
        .get(server.url("/api/transactions"))
        .bearer_auth(&expired.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_403() -> Result<()> {
    let server = common::TestServer::start().await?;

    let foreign = ledger_api::auth::TokenKeys::new("some-other-secret", chrono::Duration::hours(1))?
        .issue(1, "alice")?;

    let res = server
        .client
        .get(server.url("/api/profile"))
        .bearer_auth(&foreign.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn lowercase_bearer_scheme_is_accepted() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.signup("alice", "pw1").await?;

    let res = server
        .client
        .get(server.url("/api/profile"))
        .header("authorization", format!("bearer {token}"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
