//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! backed by real SQLite stores and mock library managers and censor engine,
//! so the HTTP surface can be exercised without external infrastructure.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use bleeparr_core::{
    config::{Config, DatabaseConfig},
    testing::{MockCensorEngine, MockMovieLibrary, MockSeriesLibrary},
    DispatcherConfig, Orchestrator, OrchestratorDeps, SettingsStore, SqliteFilterStore,
    SqliteSettingsStore,
};
use bleeparr_server::{create_router, AppState, LogBuffer};

/// Re-export fixtures for test convenience
pub use bleeparr_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// The mock Sonarr knows series 1 ("The Show") with episodes 11 and 12 on
/// disk and episode 13 without a file. The mock Radarr knows movie 5 with a
/// file and movie 6 without one.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_process_movie() {
///     let fixture = TestFixture::new().await;
///     fixture.put("/api/filtered/movie/5?filtered=true").await;
///
///     let response = fixture.post_empty("/api/process/movie/5").await;
///     assert_eq!(response.status, StatusCode::ACCEPTED);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub state: Arc<AppState>,
    /// Mock censor engine - control job outcomes
    pub engine: Arc<MockCensorEngine>,
    pub sonarr: Arc<MockSeriesLibrary>,
    pub radarr: Arc<MockMovieLibrary>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Start the dispatcher so queued items get processed
    pub start_dispatcher: bool,
    pub max_queue_items: usize,
    pub max_history_items: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            start_dispatcher: false,
            max_queue_items: 50,
            max_history_items: 100,
        }
    }
}

impl TestConfig {
    /// Create config with the dispatcher running.
    pub fn with_dispatcher() -> Self {
        Self {
            start_dispatcher: true,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        // Create mocks
        let engine = Arc::new(MockCensorEngine::new());
        let sonarr = Arc::new(MockSeriesLibrary::new());
        sonarr.add_series(fixtures::series(1, "The Show"));
        sonarr.add_episode(
            fixtures::episode(1, 11, 1, 1, "Pilot"),
            Some("/tv/The Show/s01e01.mkv"),
        );
        sonarr.add_episode(
            fixtures::episode(1, 12, 1, 2, "Second"),
            Some("/tv/The Show/s01e02.mkv"),
        );
        sonarr.add_episode(fixtures::episode(1, 13, 1, 3, "Unaired"), None);

        let radarr = Arc::new(MockMovieLibrary::new());
        radarr.add_movie(fixtures::movie(5, "Heat", 1995, Some("/movies/heat.mkv")));
        radarr.add_movie(fixtures::movie(6, "Upcoming", 2030, None));

        // Create stores
        let settings_store =
            Arc::new(SqliteSettingsStore::new(&db_path).expect("Failed to create settings store"));
        settings_store
            .save(&fixtures::settings(
                test_config.max_queue_items,
                test_config.max_history_items,
            ))
            .expect("Failed to seed settings");
        let filters =
            Arc::new(SqliteFilterStore::new(&db_path).expect("Failed to create filter store"));

        // Create config
        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            dispatcher: DispatcherConfig {
                concurrency: 1,
                drain_timeout_secs: 2,
            },
            ..Default::default()
        };

        let orchestrator = Arc::new(
            Orchestrator::new(
                &config,
                OrchestratorDeps {
                    settings_store,
                    filters,
                    engine: engine.clone(),
                    sonarr: Some(sonarr.clone()),
                    radarr: Some(radarr.clone()),
                },
            )
            .expect("Failed to create orchestrator"),
        );
        if test_config.start_dispatcher {
            orchestrator.start().await;
        }

        let state = Arc::new(AppState::new(config, orchestrator, LogBuffer::new(100)));
        let router = create_router(Arc::clone(&state));

        Self {
            router,
            state,
            engine,
            sonarr,
            radarr,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request without a body.
    pub async fn put(&self, path: &str) -> TestResponse {
        self.request("PUT", path, None).await
    }

    /// Mark a show or movie as filtered.
    pub async fn enable(&self, kind: &str, id: u64) {
        let response = self
            .put(&format!("/api/filtered/{kind}/{id}?filtered=true"))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    }

    /// Poll until the history holds `n` records.
    pub async fn wait_for_history(&self, n: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.state.orchestrator().history().len() < n {
            assert!(
                tokio::time::Instant::now() < deadline,
                "history never reached {n} records"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}

/// Helper to assert an API error carries the expected reason code.
#[macro_export]
macro_rules! assert_reason {
    ($response:expr, $reason:expr) => {
        assert_eq!($response.body["success"], false, "Body: {}", $response.text);
        assert_eq!(
            $response.body["reason"], $reason,
            "Body: {}",
            $response.text
        );
    };
}
