//! Integration tests for the TV client's token-based authentication.

use quizduell::TvClient;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_state_sends_token_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/states/42"))
        .and(header("x-app-request", "grandc3ntr1xrul3z"))
        .and(header("x-tv-authtoken", "tv-token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "phase": "lobby", "open": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TvClient::with_base_url(server.uri(), 42, "tv-token-abc");
    let state = client.state().await.unwrap();
    assert_eq!(state.get("phase").and_then(|v| v.as_str()), Some("lobby"));
}

#[tokio::test]
async fn test_profile_update_posts_form_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/42/avatarandnick"))
        .and(body_string_contains("Nick=alice"))
        .and(body_string_contains("AvatarString=0010999912"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = TvClient::with_base_url(server.uri(), 42, "tv-token-abc");
    client
        .set_avatar_and_nickname("alice", Some("0010999912"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_user_uses_delete_method() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/profiles/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = TvClient::with_base_url(server.uri(), 42, "tv-token-abc");
    let body = client.delete_user().await.unwrap();
    assert_eq!(body.get("deleted").and_then(|v| v.as_bool()), Some(true));
}

#[tokio::test]
async fn test_image_upload_posts_base64_form_field() {
    let server = MockServer::start().await;

    // 0xFF 0xD8 0xFF (the JPEG magic) encodes to "/9j/".
    Mock::given(method("POST"))
        .and(path("/users/base64/42/jpg"))
        .and(header("x-tv-authtoken", "tv-token-abc"))
        .and(body_string_contains("img=%2F9j%2F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = TvClient::with_base_url(server.uri(), 42, "tv-token-abc");
    client
        .upload_profile_image(&[0xFF, 0xD8, 0xFF])
        .await
        .unwrap();
}
