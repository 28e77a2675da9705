//! Tests for the Melodia API client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real server connection.

use melodia_playback::{HistorySink, StreamResolver, Track};
use melodia_server_client::{HttpHistorySink, MelodiaClient, ServerClientError, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Server Config Tests
// =============================================================================

mod server_config {
    use super::*;

    #[test]
    fn test_new_with_url() {
        let config = ServerConfig::new("http://localhost:8080");
        assert_eq!(config.url, "http://localhost:8080");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_with_token() {
        let config = ServerConfig::with_token("http://localhost:8080", "token_123");
        assert_eq!(config.access_token.as_deref(), Some("token_123"));
    }
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        let result = MelodiaClient::new(ServerConfig::new(""));
        match result {
            Err(ServerClientError::InvalidUrl(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected InvalidUrl error"),
        }
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        let result = MelodiaClient::new(ServerConfig::new("localhost:8080"));
        match result {
            Err(ServerClientError::InvalidUrl(msg)) => {
                assert!(msg.contains("http://") || msg.contains("https://"));
            }
            _ => panic!("Expected InvalidUrl error"),
        }
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let client = MelodiaClient::new(ServerConfig::new("http://localhost:8080")).unwrap();
        assert!(!client.is_authenticated().await);

        client.set_token("abc").await;
        assert!(client.is_authenticated().await);

        client.clear_token().await;
        assert!(!client.is_authenticated().await);
    }
}

// =============================================================================
// History Tests
// =============================================================================

mod history {
    use super::*;

    #[tokio::test]
    async fn test_record_play_posts_song_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/history/USR001/songs"))
            .and(body_json_string(r#"{"songId":"SNG042"}"#))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "success": true,
                "message": "Song berhasil ditambahkan ke history",
                "timestamp": 1700000000000_i64
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = MelodiaClient::new(ServerConfig::new(mock_server.uri())).unwrap();
        let history = client.history().await;
        let result = history.client().record_play("USR001", "SNG042").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_record_play_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/history/USR001/songs"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            MelodiaClient::new(ServerConfig::with_token(mock_server.uri(), "secret")).unwrap();
        let history = client.history().await;
        assert!(history.client().record_play("USR001", "SNG042").await.is_ok());
    }

    #[tokio::test]
    async fn test_record_play_error_uses_envelope_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/history/USR001/songs"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "success": false,
                "message": "Song tidak ditemukan"
            })))
            .mount(&mock_server)
            .await;

        let client = MelodiaClient::new(ServerConfig::new(mock_server.uri())).unwrap();
        let history = client.history().await;
        let result = history.client().record_play("USR001", "missing").await;

        match result {
            Err(ServerClientError::ServerError { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Song tidak ditemukan");
            }
            other => panic!("Expected ServerError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_required() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/history/USR001/songs"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = MelodiaClient::new(ServerConfig::new(mock_server.uri())).unwrap();
        let history = client.history().await;
        let result = history.client().record_play("USR001", "SNG042").await;

        assert!(matches!(result, Err(ServerClientError::AuthRequired)));
    }

    #[tokio::test]
    async fn test_recent_plays_converts_songs() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/history/USR001/songs/recent"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Recent songs retrieved",
                "data": {
                    "userId": "USR001",
                    "totalSongs": 2,
                    "songs": [
                        {"songId": "SNG2", "title": "Second", "artistName": "B", "duration": 200},
                        {"songId": "SNG1", "title": "First", "artistName": "A", "duration": 0}
                    ]
                },
                "timestamp": 1700000000000_i64
            })))
            .mount(&mock_server)
            .await;

        let client = MelodiaClient::new(ServerConfig::new(mock_server.uri())).unwrap();
        let history = client.history().await;
        let tracks = history.client().recent_plays("USR001", 2).await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, "SNG2");
        assert_eq!(tracks[0].duration_seconds, Some(200.0));
        assert_eq!(
            tracks[0].stream_url,
            format!("{}/api/songs/stream/SNG2", mock_server.uri())
        );
        assert_eq!(tracks[1].duration_seconds, None);
    }

    #[tokio::test]
    async fn test_recent_plays_without_data_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/history/USR001/songs/recent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .mount(&mock_server)
            .await;

        let client = MelodiaClient::new(ServerConfig::new(mock_server.uri())).unwrap();
        let history = client.history().await;
        let result = history.client().recent_plays("USR001", 10).await;

        assert!(matches!(result, Err(ServerClientError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        // Grab a free port, then close it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = MelodiaClient::new(ServerConfig::new(format!("http://127.0.0.1:{}", port)))
            .unwrap();
        let history = client.history().await;
        let result = history.client().record_play("USR001", "SNG042").await;

        assert!(matches!(result, Err(ServerClientError::ServerUnreachable(_))));
    }
}

// =============================================================================
// Playback Integration Tests
// =============================================================================

mod playback_integration {
    use super::*;

    #[tokio::test]
    async fn test_stream_resolver_uses_client_url() {
        let client = MelodiaClient::new(ServerConfig::new("http://localhost:8080/")).unwrap();
        let resolver = client.stream_resolver().await;

        let track = Track::new("SNG9", "Nine", "Artist");
        assert_eq!(
            resolver.resolve(&track).as_deref(),
            Some("http://localhost:8080/api/songs/stream/SNG9")
        );
    }

    #[tokio::test]
    async fn test_http_sink_posts_in_background() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/history/USR001/songs"))
            .and(body_json_string(r#"{"songId":"SNG042"}"#))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Arc::new(MelodiaClient::new(ServerConfig::new(mock_server.uri())).unwrap());
        let sink = HttpHistorySink::current(client);

        assert!(sink.record_play("USR001", "SNG042").is_ok());

        // Let the spawned request complete
        for _ in 0..50 {
            let received = mock_server.received_requests().await.unwrap_or_default();
            if !received.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn test_http_sink_swallows_server_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = Arc::new(MelodiaClient::new(ServerConfig::new(mock_server.uri())).unwrap());
        let sink = HttpHistorySink::current(client);

        assert!(sink.record_play("USR001", "SNG042").is_ok());
    }
}
