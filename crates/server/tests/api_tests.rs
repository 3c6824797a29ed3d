//! API tests against the in-process router.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use bleeparr_core::library::Episode;
use serde_json::json;

use common::{TestConfig, TestFixture};

// ============================================================================
// Health, status and metrics
// ============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_status_reports_libraries_and_queue() {
    let fixture = TestFixture::new().await;
    fixture.radarr.set_connection_error("connection refused");

    let response = fixture.get("/api/status").await;
    assert_status!(response, StatusCode::OK);

    let body = &response.body;
    assert_eq!(body["sonarr"]["connected"], true);
    assert_eq!(body["sonarr"]["version"], "4.0.0");
    assert_eq!(body["radarr"]["configured"], true);
    assert_eq!(body["radarr"]["connected"], false);
    assert!(body["radarr"]["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
    assert_eq!(body["orchestrator"]["accepting"], true);
    assert_eq!(body["orchestrator"]["running"], false);
    assert_eq!(body["stats"]["success_rate"], 0);
}

#[tokio::test]
async fn test_config_hides_secrets() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["dispatcher"]["concurrency"], 1);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/health").await;

    let response = fixture.get("/metrics").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("bleeparr_dispatcher_running"));
    assert!(response.text.contains("bleeparr_http_requests_total"));
}

// ============================================================================
// Filtered flags
// ============================================================================

#[tokio::test]
async fn test_filtered_toggle_and_list() {
    let fixture = TestFixture::new().await;

    let response = fixture.put("/api/filtered/show/1?filtered=true").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body, json!({"id": 1, "type": "show", "filtered": true}));

    fixture.enable("show", 7).await;
    fixture.put("/api/filtered/show/7?filtered=false").await;

    let response = fixture.get("/api/filtered/show").await;
    assert_status!(response, StatusCode::OK);
    let flags = response.body.as_array().unwrap();
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0]["id"], 1);

    let response = fixture.get("/api/filtered/movie").await;
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_filtered_rejects_unknown_kind() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/filtered/album").await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_reason!(response, "not_found");
}

#[tokio::test]
async fn test_malformed_requests_get_structured_errors() {
    let fixture = TestFixture::new().await;

    let response = fixture.put("/api/filtered/show/1?filtered=maybe").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_request");

    let response = fixture.post_empty("/api/process/episode/abc").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_request");

    let response = fixture.put("/api/filtered/movie/-4?filtered=true").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_request");

    let response = fixture.get("/api/admin/logs?max_entries=lots").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_request");
}

#[tokio::test]
async fn test_filtered_rejects_ids_beyond_storage_range() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .put("/api/filtered/show/18446744073709551615?filtered=true")
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_request");

    let response = fixture.get("/api/filtered/show").await;
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_filtered_requires_flag_value() {
    let fixture = TestFixture::new().await;
    let response = fixture.put("/api/filtered/movie/5").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_request");
}

// ============================================================================
// Processing requests
// ============================================================================

#[tokio::test]
async fn test_process_episode() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_empty("/api/process/episode/11").await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_reason!(response, "not_eligible");

    fixture.enable("show", 1).await;
    let response = fixture.post_empty("/api/process/episode/11").await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert_eq!(response.body["success"], true);

    let item = &response.body["item"];
    assert_eq!(item["item_type"], "show");
    assert_eq!(item["source_ref"], "episode:11");
    assert_eq!(item["title"], "The Show");
    assert_eq!(item["resolved_path"], "/media/tv/The Show/s01e01.mkv");
    assert_eq!(item["state"], "queued");
    assert!(item["created_at"].is_string());

    let response = fixture.post_empty("/api/process/episode/11").await;
    assert_status!(response, StatusCode::CONFLICT);
    assert_reason!(response, "duplicate");
}

#[tokio::test]
async fn test_process_episode_errors() {
    let fixture = TestFixture::new().await;
    fixture.enable("show", 1).await;

    let response = fixture.post_empty("/api/process/episode/13").await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_reason!(response, "no_file");

    let response = fixture.post_empty("/api/process/episode/999").await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_reason!(response, "not_found");

    fixture.sonarr.set_unavailable(true);
    let response = fixture.post_empty("/api/process/episode/12").await;
    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_reason!(response, "library_unavailable");
}

#[tokio::test]
async fn test_unfiltered_items_are_not_eligible() {
    let fixture = TestFixture::new().await;

    // No file, but the flag is checked first.
    let response = fixture.post_empty("/api/process/movie/6").await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_reason!(response, "not_eligible");

    fixture.radarr.set_unavailable(true);
    let response = fixture.post_empty("/api/process/movie/5").await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_reason!(response, "not_eligible");

    let response = fixture.post_empty("/api/process/episode/13").await;
    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_reason!(response, "not_eligible");
}

#[tokio::test]
async fn test_series_with_broken_episode_queues_nothing() {
    let fixture = TestFixture::new().await;
    fixture.enable("show", 1).await;
    fixture.sonarr.add_episode(
        Episode {
            has_file: true,
            episode_file_id: Some(99_999),
            ..common::fixtures::episode(1, 14, 1, 4, "Missing File")
        },
        None,
    );

    let response = fixture.post_empty("/api/process/series/1").await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_reason!(response, "not_found");

    let response = fixture.get("/api/processing").await;
    assert_eq!(response.body["queue"], json!([]));
}

#[tokio::test]
async fn test_process_series() {
    let fixture = TestFixture::new().await;
    fixture.enable("show", 1).await;

    let response = fixture.post_empty("/api/process/series/1").await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert_eq!(response.body["queued_count"], 2);
    assert_eq!(response.body["skipped_count"], 1);
    assert_eq!(response.body["title"], "The Show");

    let response = fixture.get("/api/processing").await;
    assert_eq!(response.body["queue"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_process_movie_queue_full() {
    let fixture = TestFixture::with_config(TestConfig {
        max_queue_items: 1,
        ..Default::default()
    })
    .await;
    fixture.enable("show", 1).await;
    fixture.enable("movie", 5).await;

    let response = fixture.post_empty("/api/process/episode/11").await;
    assert_status!(response, StatusCode::ACCEPTED);

    let response = fixture.post_empty("/api/process/movie/5").await;
    assert_status!(response, StatusCode::TOO_MANY_REQUESTS);
    assert_reason!(response, "queue_full");
}

#[tokio::test]
async fn test_jobs_run_to_history() {
    let fixture = TestFixture::with_config(TestConfig::with_dispatcher()).await;
    fixture.engine.set_swears_found(5);
    fixture.enable("movie", 5).await;

    let response = fixture.post_empty("/api/process/movie/5").await;
    assert_status!(response, StatusCode::ACCEPTED);
    fixture.wait_for_history(1).await;

    let response = fixture.get("/api/processing").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["queue"], json!([]));

    let record = &response.body["history"][0];
    assert_eq!(record["success"], true);
    assert_eq!(record["swears_found"], 5);
    assert_eq!(record["item_type"], "movie");
    assert_eq!(record["output_path"], "/media/movies/clean_heat.mkv");
    assert!(record["duration"].is_number());

    let stats = &response.body["stats"];
    assert_eq!(stats["success_rate"], 100);
    assert_eq!(stats["total_swears_found"], 5);
}

#[tokio::test]
async fn test_failed_job_is_reported() {
    let fixture = TestFixture::with_config(TestConfig::with_dispatcher()).await;
    fixture
        .engine
        .fail_path("/media/movies/heat.mkv", "no audio stream");
    fixture.enable("movie", 5).await;

    fixture.post_empty("/api/process/movie/5").await;
    fixture.wait_for_history(1).await;

    let response = fixture.get("/api/processing").await;
    let record = &response.body["history"][0];
    assert_eq!(record["success"], false);
    assert!(record["error"]
        .as_str()
        .unwrap()
        .contains("no audio stream"));
    assert_eq!(response.body["stats"]["success_rate"], 0);
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_round_trip() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/settings").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["output_prefix"], "clean_");
    assert_eq!(response.body["max_queue_items"], 50);
    assert!(response.body["path_mappings"].is_string());

    let response = fixture
        .post(
            "/api/settings",
            json!({
                "boost_db": 9,
                "maxHistoryItems": 20,
                "path_mappings": "[{\"host_path\":\"/data\",\"container_path\":\"/mnt/data\"}]"
            }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["settings"]["boost_db"], 9);

    let response = fixture.get("/api/settings").await;
    assert_eq!(response.body["boost_db"], 9);
    assert_eq!(response.body["max_history_items"], 20);
    // Untouched fields keep their values.
    assert_eq!(response.body["max_queue_items"], 50);
    let mappings: serde_json::Value =
        serde_json::from_str(response.body["path_mappings"].as_str().unwrap()).unwrap();
    assert_eq!(mappings[0]["container_path"], "/mnt/data");
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/settings", json!({"boost_db": "loud"}))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_settings");

    let response = fixture
        .post("/api/settings", json!({"max_queue_items": 0}))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_settings");

    let response = fixture.get("/api/settings").await;
    assert_eq!(response.body["max_queue_items"], 50);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_reset_queue_two_phase() {
    let fixture = TestFixture::new().await;
    fixture.enable("show", 1).await;
    fixture.post_empty("/api/process/series/1").await;

    let response = fixture.post_empty("/api/admin/reset-queue").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["confirmation_required"], true);
    assert_eq!(response.body["action"], "reset_queue");
    let token = response.body["token"].as_str().unwrap().to_string();

    // Nothing happened yet.
    let processing = fixture.get("/api/processing").await;
    assert_eq!(processing.body["queue"].as_array().unwrap().len(), 2);

    let response = fixture
        .post_empty("/api/admin/reset-queue?confirm=not-a-token")
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_reason!(response, "invalid_confirmation");

    let response = fixture
        .post_empty(&format!("/api/admin/reset-queue?confirm={token}"))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["removed"], 2);

    let processing = fixture.get("/api/processing").await;
    assert_eq!(processing.body["queue"], json!([]));

    // Tokens are single-use.
    let response = fixture
        .post_empty(&format!("/api/admin/reset-queue?confirm={token}"))
        .await;
    assert_reason!(response, "invalid_confirmation");
}

#[tokio::test]
async fn test_reset_history_token_is_action_bound() {
    let fixture = TestFixture::with_config(TestConfig::with_dispatcher()).await;
    fixture.enable("movie", 5).await;
    fixture.post_empty("/api/process/movie/5").await;
    fixture.wait_for_history(1).await;

    let response = fixture.post_empty("/api/admin/reset-queue").await;
    let queue_token = response.body["token"].as_str().unwrap().to_string();

    let response = fixture
        .post_empty(&format!("/api/admin/reset-history?confirm={queue_token}"))
        .await;
    assert_reason!(response, "invalid_confirmation");

    let response = fixture.post_empty("/api/admin/reset-history").await;
    let token = response.body["token"].as_str().unwrap().to_string();
    let response = fixture
        .post_empty(&format!("/api/admin/reset-history?confirm={token}"))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["removed"], 1);

    let processing = fixture.get("/api/processing").await;
    assert_eq!(processing.body["history"], json!([]));
}

#[tokio::test]
async fn test_reboot_keeps_status_reachable() {
    let fixture = TestFixture::with_config(TestConfig::with_dispatcher()).await;
    fixture.engine.pause();
    fixture.enable("movie", 5).await;
    fixture.post_empty("/api/process/movie/5").await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while fixture.get("/api/processing").await.body["queue"][0]["state"] != "processing" {
        assert!(tokio::time::Instant::now() < deadline, "job never started");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let response = fixture.post_empty("/api/admin/reboot").await;
    let token = response.body["token"].as_str().unwrap().to_string();
    let response = fixture
        .post_empty(&format!("/api/admin/reboot?confirm={token}"))
        .await;
    assert_status!(response, StatusCode::ACCEPTED);

    let response = fixture.get("/api/status").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["orchestrator"]["rebooting"], true);
    assert_eq!(response.body["orchestrator"]["accepting"], false);

    let response = fixture.post_empty("/api/process/movie/5").await;
    assert_status!(response, StatusCode::SERVICE_UNAVAILABLE);
    assert_reason!(response, "shutting_down");

    let response = fixture.post_empty("/api/admin/reboot").await;
    let second = response.body["token"].as_str().unwrap().to_string();
    let response = fixture
        .post_empty(&format!("/api/admin/reboot?confirm={second}"))
        .await;
    assert_status!(response, StatusCode::CONFLICT);
    assert_reason!(response, "reboot_in_progress");

    fixture.engine.resume();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let status = fixture.get("/api/status").await;
        if status.body["orchestrator"]["rebooting"] == false {
            assert_eq!(status.body["orchestrator"]["accepting"], true);
            assert_eq!(status.body["orchestrator"]["running"], true);
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "reboot never finished");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let processing = fixture.get("/api/processing").await;
    assert_eq!(processing.body["history"][0]["success"], true);
}

#[tokio::test]
async fn test_logs_endpoint() {
    let fixture = TestFixture::new().await;
    for message in ["first", "second", "third"] {
        fixture.state.logs().push(bleeparr_server::LogEntry {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            level: "INFO".to_string(),
            message: message.to_string(),
        });
    }

    let response = fixture.get("/api/admin/logs?max_entries=2").await;
    assert_status!(response, StatusCode::OK);
    let logs = response.body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["message"], "second");
    assert_eq!(logs[1]["level"], "INFO");

    let response = fixture.get("/api/admin/logs").await;
    assert_eq!(response.body["logs"].as_array().unwrap().len(), 3);
}
