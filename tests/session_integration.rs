//! Integration tests for the restore-or-login session bootstrap.

use quizduell::{ApiConfig, ClientError, CookieVault, Credentials, SessionCookie, establish};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn plain_vault(dir: &tempfile::TempDir) -> CookieVault {
    CookieVault::with_master_key(dir.path().join("cookie.json"), None)
}

#[tokio::test]
async fn test_restore_skips_login_entirely() {
    let server = MockServer::start().await;
    let tempdir = tempfile::TempDir::new().unwrap();
    let vault = plain_vault(&tempdir);
    vault.save(&SessionCookie::new("auth", "cached_session")).unwrap();

    // No login mock is mounted: any login attempt would fail the call.
    Mock::given(method("GET"))
        .and(path("/users/current_user_games"))
        .and(header("cookie", "auth=\"cached\\session\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "logged_in": true,
            "user": {"user_id": "42", "name": "alice", "games": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::new("alice", "hunter2");
    let client = establish(ApiConfig::with_base_url(server.uri()).unwrap(), &credentials, &vault)
        .await
        .unwrap();

    assert_eq!(client.session_cookie().unwrap().value(), "cached_session");
    client.current_user_games().await.unwrap();
}

#[tokio::test]
async fn test_empty_vault_falls_back_to_login_and_persists() {
    let server = MockServer::start().await;
    let tempdir = tempfile::TempDir::new().unwrap();
    let vault = plain_vault(&tempdir);

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"logged_in": true}))
                .insert_header("set-cookie", "auth=\"fresh\\session\"; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::new("alice", "hunter2");
    let client = establish(ApiConfig::with_base_url(server.uri()).unwrap(), &credentials, &vault)
        .await
        .unwrap();

    assert_eq!(client.session_cookie().unwrap().value(), "fresh_session");

    // The fresh cookie must survive into the next process run.
    let restored = vault.load().unwrap();
    assert_eq!(restored.name, "auth");
    assert_eq!(restored.value(), "fresh_session");
}

#[tokio::test]
async fn test_corrupt_vault_record_falls_back_to_login() {
    let server = MockServer::start().await;
    let tempdir = tempfile::TempDir::new().unwrap();
    let vault = plain_vault(&tempdir);
    std::fs::write(vault.path(), b"definitely not a cookie").unwrap();

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"logged_in": true}))
                .insert_header("set-cookie", "auth=\"fresh\\session\"; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::new("alice", "hunter2");
    let client = establish(ApiConfig::with_base_url(server.uri()).unwrap(), &credentials, &vault)
        .await
        .unwrap();
    assert_eq!(client.session_cookie().unwrap().value(), "fresh_session");
}

#[tokio::test]
async fn test_rejected_login_surfaces_auth_error_and_persists_nothing() {
    let server = MockServer::start().await;
    let tempdir = tempfile::TempDir::new().unwrap();
    let vault = plain_vault(&tempdir);

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "logged_in": false,
            "popup_mess": "Wrong name or password",
            "popup_title": "Login failed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::new("alice", "wrong");
    let error = establish(ApiConfig::with_base_url(server.uri()).unwrap(), &credentials, &vault)
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Auth { .. }), "got: {error}");
    assert!(!vault.path().exists(), "no cookie may be persisted on rejection");
}
