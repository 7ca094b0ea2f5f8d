use std::collections::HashMap;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tokio::runtime::Handle;
use voicemode_client::{
    APIClient, Error, Failure, SessionCredentials, VoiceModeEvent, VoiceModeService,
};

const BEARER: &str = "sk-test-4f2a";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn mock_config(server: &mut ServerGuard, enabled: bool) -> mockito::Mock {
    server
        .mock("GET", "/api/v1/voicemode/config")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "enabled": enabled, "livekit_url": "ws://localhost:7880" }).to_string())
        .create_async()
        .await
}

async fn mock_token(server: &mut ServerGuard, url: Option<&str>) -> mockito::Mock {
    let body = match url {
        Some(url) => json!({ "token": "lk-jwt", "url": url }),
        None => json!({ "token": "lk-jwt" }),
    };
    server
        .mock("POST", "/api/v1/voicemode/token")
        .match_body(Matcher::PartialJson(json!({ "room": "lobby" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn join_returns_token_url() {
    init_logger();
    let mut server = Server::new_async().await;
    let config = mock_config(&mut server, true).await;
    let token = mock_token(&mut server, Some("wss://edge.example.com")).await;

    let creds = APIClient::new(server.url())
        .join_session(BEARER, "alice", "lobby")
        .await
        .unwrap();

    config.assert_async().await;
    token.assert_async().await;
    assert_eq!(
        creds,
        SessionCredentials {
            identity: "alice".to_string(),
            room: "lobby".to_string(),
            token: "lk-jwt".to_string(),
            url: "wss://edge.example.com".to_string(),
        }
    );
}

#[tokio::test]
async fn join_falls_back_to_configured_url() {
    init_logger();
    let mut server = Server::new_async().await;
    let _config = mock_config(&mut server, true).await;
    let _token = mock_token(&mut server, None).await;

    let creds = APIClient::new(server.url())
        .join_session(BEARER, "alice", "lobby")
        .await
        .unwrap();
    assert_eq!(creds.url, "ws://localhost:7880");
}

#[tokio::test]
async fn join_stops_when_disabled() {
    init_logger();
    let mut server = Server::new_async().await;
    let config = mock_config(&mut server, false).await;
    let token = server
        .mock("POST", "/api/v1/voicemode/token")
        .expect(0)
        .create_async()
        .await;

    let err = APIClient::new(server.url())
        .join_session(BEARER, "alice", "lobby")
        .await
        .unwrap_err();

    config.assert_async().await;
    token.assert_async().await;
    assert!(matches!(err, Error::Disabled(ref url) if *url == server.url()), "got {:?}", err);
}

#[tokio::test]
async fn service_answers_every_command_by_id() {
    init_logger();
    let mut server = Server::new_async().await;
    let _config = mock_config(&mut server, true).await;
    let _token = mock_token(&mut server, Some("wss://edge.example.com")).await;

    let client = APIClient::new(server.url());
    let mut service = VoiceModeService::new(&Handle::current(), client, BEARER);
    let config_id = service.fetch_config().unwrap();
    let token_id = service.fetch_token("alice", "lobby").unwrap();
    let join_id = service.join("bob", "lobby").unwrap();

    let mut events = HashMap::new();
    for _ in 0..3 {
        let event = service.recv().await.expect("service stopped early");
        events.insert(event.id(), event);
    }

    match events.remove(&config_id) {
        Some(VoiceModeEvent::Config(_, config)) => assert!(config.enabled),
        other => panic!("unexpected config event {:?}", other),
    }
    match events.remove(&token_id) {
        Some(VoiceModeEvent::Token(_, token)) => assert_eq!(token.token, "lk-jwt"),
        other => panic!("unexpected token event {:?}", other),
    }
    match events.remove(&join_id) {
        Some(VoiceModeEvent::Joined(_, creds)) => {
            assert_eq!(creds.identity, "bob");
            assert_eq!(creds.url, "wss://edge.example.com");
        }
        other => panic!("unexpected join event {:?}", other),
    }
    assert!(service.try_recv().is_none());
}

#[tokio::test]
async fn service_reports_server_errors() {
    init_logger();
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/api/v1/voicemode/token")
        .with_status(503)
        .with_body(r#"{"detail":"Failed to connect to voicemode token server"}"#)
        .create_async()
        .await;

    let mut service = VoiceModeService::new(&Handle::current(), APIClient::new(server.url()), BEARER);
    let id = service.fetch_token("alice", "lobby").unwrap();

    assert_eq!(
        service.recv().await,
        Some(VoiceModeEvent::Failed(
            id,
            Failure {
                message: "server returned 503 Service Unavailable: Failed to connect to voicemode token server"
                    .to_string(),
                status: Some(503),
                body: Some(json!({ "detail": "Failed to connect to voicemode token server" })),
            }
        ))
    );
}
