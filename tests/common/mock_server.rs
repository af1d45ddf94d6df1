//! WireMock server utilities that stand in for an rqbit instance.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Torrent id returned by the mocked `POST /torrents`.
pub const TORRENT_ID: u64 = 1;

/// rqbit-shaped stats body.
pub fn stats_body(state: &str, progress: u64, total: u64, finished: bool) -> serde_json::Value {
    serde_json::json!({
        "state": state,
        "file_progress": [],
        "error": null,
        "progress_bytes": progress,
        "uploaded_bytes": 0,
        "total_bytes": total,
        "finished": finished,
        "live": {
            "snapshot": {"peer_stats": {"live": 5, "queued": 2, "connecting": 1}},
            "download_speed": {"mbps": 2.0, "human_readable": "2.00 MiB/s"},
            "upload_speed": {"mbps": 0.1, "human_readable": "0.10 MiB/s"}
        }
    })
}

pub fn error_stats_body(message: &str) -> serde_json::Value {
    serde_json::json!({
        "state": "error",
        "file_progress": [],
        "error": message,
        "progress_bytes": 0,
        "uploaded_bytes": 0,
        "total_bytes": 100,
        "finished": false,
        "live": null
    })
}

/// Mock server with the health check, add and forget endpoints.
///
/// Stats responses are served in order; the last one repeats forever.
pub async fn setup_rqbit_mock(stats: Vec<serde_json::Value>) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "torrents": []
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": TORRENT_ID,
            "details": {
                "info_hash": "0123456789abcdef0123456789abcdef01234567",
                "name": "reddit",
                "files": []
            },
            "output_folder": "/downloads",
            "seen_peers": null
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/torrents/{}/forget", TORRENT_ID)))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let stats_path = format!("/torrents/{}/stats/v1", TORRENT_ID);
    let last = stats.len().saturating_sub(1);
    for (i, body) in stats.into_iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path(stats_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body));
        let mock = if i < last { mock.up_to_n_times(1) } else { mock };
        mock.mount(&mock_server).await;
    }

    mock_server
}

/// Serve `bytes` at `/<name>` for URL-source tests.
pub async fn serve_torrent(name: &str, bytes: Vec<u8>) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{}", name)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-bittorrent")
                .set_body_bytes(bytes),
        )
        .mount(&mock_server)
        .await;
    mock_server
}
