//! Tests for the LearnLab client library.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real API.

use learnlab_client::{ClientConfig, ClientError, HttpProgressSink, ItemSource, LearnLabClient};
use learnlab_playback::{ProgressReport, ProgressSink};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> LearnLabClient {
    LearnLabClient::new(ClientConfig::new(server.uri()).with_token("token-123")).unwrap()
}

fn podcast_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": "Photosynthesis explained",
        "description": "Chapter 3 recap",
        "duration": 300,
        "s3_audio_key": format!("https://media.learnlab.test/{}.mp3", id),
        "transcriptVttUrl": format!("/media/{}.vtt", id),
        "transcriptTxtUrl": format!("/media/{}.txt", id),
        "current_progress": 40.0,
        "current_speed": 1.5
    })
}

fn report(item_id: &str) -> ProgressReport {
    ProgressReport {
        item_id: item_id.to_string(),
        position_seconds: 45.0,
        completion_percentage: 15.0,
    }
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(LearnLabClient::new(ClientConfig::new("https://api.learnlab.test")).is_ok());
        assert!(LearnLabClient::new(ClientConfig::new("http://localhost:8000")).is_ok());
    }

    #[test]
    fn test_empty_url_rejected() {
        match LearnLabClient::new(ClientConfig::new("")).unwrap_err() {
            ClientError::InvalidUrl(msg) => assert!(msg.contains("empty")),
            e => panic!("Expected InvalidUrl error, got: {:?}", e),
        }
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        assert!(matches!(
            LearnLabClient::new(ClientConfig::new("api.learnlab.test")),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_token_marks_authenticated() {
        let anonymous = LearnLabClient::new(ClientConfig::default()).unwrap();
        assert!(!anonymous.is_authenticated());

        let client =
            LearnLabClient::new(ClientConfig::default().with_token("token-123")).unwrap();
        assert!(client.is_authenticated());
    }
}

// =============================================================================
// Item Tests
// =============================================================================

mod items {
    use super::*;

    #[tokio::test]
    async fn test_list_items() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/podcasts/files/file-42"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([podcast_json("p1"), podcast_json("p2")])),
            )
            .mount(&server)
            .await;

        let items = client_for(&server).list_items("file-42").await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "p1");
        assert_eq!(items[0].duration, 300.0);
        assert_eq!(items[0].audio_url, "https://media.learnlab.test/p1.mp3");
        assert_eq!(items[0].transcript_url(), Some("/media/p1.vtt"));
        assert_eq!(items[1].current_speed, 1.5);
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_required() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/podcasts/files/file-42"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server).list_items("file-42").await;
        assert!(matches!(result, Err(ClientError::AuthRequired)));
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/podcasts/files/file-42"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        match client_for(&server).list_items("file-42").await.unwrap_err() {
            ClientError::ServerError { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("Internal Server Error"));
            }
            e => panic!("Expected ServerError, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/podcasts/files/file-42"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&server)
            .await;

        let result = client_for(&server).list_items("file-42").await;
        assert!(matches!(result, Err(ClientError::ParseError(_))));
    }
}

// =============================================================================
// Analytics Tests
// =============================================================================

mod analytics {
    use super::*;

    #[tokio::test]
    async fn test_fetch_analytics() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/podcasts/p1/analytics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalTimeListened": 1800.0,
                "averageSpeed": 1.25,
                "numberOfSessions": 4,
                "completionRate": 0.6
            })))
            .mount(&server)
            .await;

        let summary = client_for(&server).analytics("p1").await.unwrap();

        assert_eq!(summary.total_time_listened, 1800.0);
        assert_eq!(summary.average_speed, 1.25);
        assert_eq!(summary.session_count, 4);
        assert_eq!(summary.completion_rate, 0.6);
    }
}

// =============================================================================
// Progress Tests
// =============================================================================

mod progress {
    use super::*;

    #[tokio::test]
    async fn test_save_progress_posts_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/podcasts/p1/progress"))
            .and(header("authorization", "Bearer token-123"))
            .and(body_json(serde_json::json!({
                "position_seconds": 45.0,
                "completion_percentage": 15.0
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).save_progress(&report("p1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_progress_surfaces_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/podcasts/p1/progress"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let result = client_for(&server).save_progress(&report("p1")).await;
        assert!(matches!(
            result,
            Err(ClientError::ServerError { status: 503, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sink_saves_in_background() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/podcasts/p1/progress"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let sink = HttpProgressSink::current(client_for(&server)).unwrap();
        sink.report(&report("p1"));

        assert!(wait_for_requests(&server, 1).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sink_swallows_failures() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/podcasts/p1/progress"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = HttpProgressSink::current(client_for(&server)).unwrap();
        sink.report(&report("p1"));
        sink.report(&report("p1"));

        assert!(wait_for_requests(&server, 2).await);
    }

    #[test]
    fn test_sink_requires_runtime() {
        let client = LearnLabClient::new(ClientConfig::default()).unwrap();
        assert!(HttpProgressSink::current(client).is_none());
    }

    async fn wait_for_requests(server: &MockServer, count: usize) -> bool {
        for _ in 0..100 {
            let received = server.received_requests().await.unwrap_or_default();
            if received.len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

// =============================================================================
// Transcript Tests
// =============================================================================

mod transcripts {
    use super::*;

    #[tokio::test]
    async fn test_fetch_vtt_transcript() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/media/p1.vtt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "WEBVTT\n\n00:00:00.000 --> 00:00:05.000\nWelcome back.\n\n\
                 00:00:05.000 --> 00:00:10.000\nToday: photosynthesis.",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let item: learnlab_playback::PlaybackItem =
            serde_json::from_value(podcast_json("p1")).unwrap();

        let transcript = client.fetch_transcript(&item).await.unwrap().unwrap();

        assert_eq!(transcript.len(), 2);
        assert_eq!(
            transcript.active_line(7.0).map(|l| l.text.as_str()),
            Some("Today: photosynthesis.")
        );
    }

    #[tokio::test]
    async fn test_fetch_text_transcript() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/media/p1.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Plants need light. They make sugar."),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut item: learnlab_playback::PlaybackItem =
            serde_json::from_value(podcast_json("p1")).unwrap();
        item.transcript_vtt_url = None;

        let transcript = client.fetch_transcript(&item).await.unwrap().unwrap();

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.lines()[1].start, 150.0);
    }

    #[tokio::test]
    async fn test_item_without_transcript() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let mut item: learnlab_playback::PlaybackItem =
            serde_json::from_value(podcast_json("p1")).unwrap();
        item.transcript_vtt_url = None;
        item.transcript_txt_url = None;

        assert!(client.fetch_transcript(&item).await.unwrap().is_none());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_missing_transcript_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/media/p1.vtt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let item: learnlab_playback::PlaybackItem =
            serde_json::from_value(podcast_json("p1")).unwrap();

        assert!(matches!(
            client.fetch_transcript(&item).await,
            Err(ClientError::ServerError { status: 404, .. })
        ));
    }
}
