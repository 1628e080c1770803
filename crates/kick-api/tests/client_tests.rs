//! HTTP-level tests for the Kick client against a mock server.

use kick_api::{KickClient, KickError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live_channel_json() -> serde_json::Value {
    json!({
        "user": {
            "username": "SXB",
            "profile_pic": "https://files.kick.com/images/sxb.webp",
            "bio": "Roleplay every night"
        },
        "livestream": {
            "is_live": true,
            "session_title": "MTRP | Abdulsamad",
            "viewer_count": 1532,
            "start_time": "2024-05-01 18:00:00",
            "categories": [{"name": "Grand Theft Auto V"}]
        },
        "followers_count": 42000,
        "banner_image": {"url": "https://files.kick.com/images/banner.webp"},
        "previous_livestreams": []
    })
}

async fn client_for(server: &MockServer) -> KickClient {
    KickClient::with_base_url(reqwest::Client::new(), &format!("{}/api", server.uri())).unwrap()
}

#[tokio::test]
async fn test_channel_live_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/channels/sxb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_channel_json()))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    // Usernames are lowercased into the channel slug.
    let channel = client.channel("SXB").await.unwrap();

    let user = channel.user.as_ref().unwrap();
    assert_eq!(user.username, "SXB");
    assert_eq!(channel.followers_count, Some(42000));

    let live = channel.livestream.as_ref().unwrap();
    assert_eq!(live.viewer_count, Some(1532));
    assert_eq!(live.category_name(), Some("Grand Theft Auto V"));
    assert!(live.started_at().is_some());
}

#[tokio::test]
async fn test_channel_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/channels/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).await.channel("ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_channel_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/channels/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).await.channel("flaky").await.unwrap_err();
    assert!(matches!(err, KickError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_channel_missing_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/channels/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"livestream": null})))
        .mount(&server)
        .await;

    let err = client_for(&server).await.channel("empty").await.unwrap_err();
    assert!(matches!(err, KickError::MissingUser(ref name) if name == "empty"));
}

#[tokio::test]
async fn test_channel_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/channels/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>cloudflare</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).await.channel("broken").await.unwrap_err();
    assert!(matches!(err, KickError::JsonError(_)));
}

#[tokio::test]
async fn test_recent_videos() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/channels/sxb/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"created_at": "2024-04-30T20:00:00Z"},
            {"created_at": "2024-04-29T20:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let videos = client_for(&server).await.recent_videos("sxb").await.unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(
        kick_api::Video::most_recent(&videos).map(|t| t.to_rfc3339()),
        Some("2024-04-30T20:00:00+00:00".to_string())
    );
}
