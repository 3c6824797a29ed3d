//! Admin control integration tests: confirmation tokens, resets and reboot.

use std::sync::Arc;
use std::time::Duration;

use bleeparr_core::{
    admin::{AdminAction, AdminError},
    config::Config,
    dispatcher::{DispatcherConfig, INTERRUPTED_BY_REBOOT},
    library::{FilterKind, InMemoryFilterStore},
    settings::{InMemorySettingsStore, SettingsStore},
    testing::{fixtures, MockCensorEngine, MockMovieLibrary},
    Orchestrator, OrchestratorDeps,
};

struct TestHarness {
    orchestrator: Orchestrator,
    engine: Arc<MockCensorEngine>,
    settings_store: Arc<InMemorySettingsStore>,
}

impl TestHarness {
    fn new(drain_timeout_secs: u64) -> Self {
        let radarr = Arc::new(MockMovieLibrary::new());
        for id in 1..=3 {
            radarr.add_movie(fixtures::movie(
                id,
                &format!("Movie {id}"),
                2000,
                Some(&format!("/movies/{id}.mkv")),
            ));
        }

        let filters = Arc::new(InMemoryFilterStore::new());
        let engine = Arc::new(MockCensorEngine::new());
        let settings_store = Arc::new(InMemorySettingsStore::with_snapshot(fixtures::settings(
            50, 100,
        )));

        let config = Config {
            dispatcher: DispatcherConfig {
                concurrency: 1,
                drain_timeout_secs,
            },
            ..Default::default()
        };

        let orchestrator = Orchestrator::new(
            &config,
            OrchestratorDeps {
                settings_store: settings_store.clone(),
                filters,
                engine: engine.clone(),
                sonarr: None,
                radarr: Some(radarr),
            },
        )
        .expect("orchestrator");

        for id in 1..=3 {
            orchestrator
                .set_filtered(FilterKind::Movie, id, true)
                .expect("flag movie");
        }

        Self {
            orchestrator,
            engine,
            settings_store,
        }
    }

    async fn wait_for_processing(&self) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.orchestrator.queue().counts().processing == 0 {
            assert!(
                tokio::time::Instant::now() < deadline,
                "nothing started processing"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[tokio::test]
async fn test_reset_without_valid_token_changes_nothing() {
    let h = TestHarness::new(5);
    h.orchestrator.submit_movie(1).await.unwrap();
    let admin = h.orchestrator.admin();

    let err = admin.reset_queue("bogus").unwrap_err();
    assert!(matches!(err, AdminError::InvalidConfirmation(_)));
    assert_eq!(err.reason_code(), "invalid_confirmation");
    assert_eq!(h.orchestrator.queue().len(), 1);
}

#[tokio::test]
async fn test_token_is_bound_to_its_action() {
    let h = TestHarness::new(5);
    h.orchestrator.submit_movie(1).await.unwrap();
    let admin = h.orchestrator.admin();

    let challenge = admin.request_confirmation(AdminAction::ResetHistory);
    assert!(admin.reset_queue(&challenge.token).is_err());
    assert_eq!(h.orchestrator.queue().len(), 1);

    // Still valid for the action it was issued for.
    let removed = tokio_test::assert_ok!(admin.reset_history(&challenge.token));
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn test_token_is_single_use() {
    let h = TestHarness::new(5);
    h.orchestrator.submit_movie(1).await.unwrap();
    h.orchestrator.submit_movie(2).await.unwrap();
    let admin = h.orchestrator.admin();

    let challenge = admin.request_confirmation(AdminAction::ResetQueue);
    assert_eq!(admin.reset_queue(&challenge.token).unwrap(), 2);

    h.orchestrator.submit_movie(3).await.unwrap();
    assert!(admin.reset_queue(&challenge.token).is_err());
    assert_eq!(h.orchestrator.queue().len(), 1);
}

#[tokio::test]
async fn test_reset_history_clears_stats() {
    let h = TestHarness::new(5);
    h.orchestrator.submit_movie(1).await.unwrap();
    h.orchestrator.start().await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while h.orchestrator.history().is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "job never finished");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let admin = h.orchestrator.admin();
    let challenge = admin.request_confirmation(AdminAction::ResetHistory);
    assert_eq!(admin.reset_history(&challenge.token).unwrap(), 1);

    let stats = h.orchestrator.processing().stats;
    assert_eq!(stats.total_processed, 0);
    assert_eq!(stats.success_rate, 0);

    h.orchestrator.stop().await;
}

#[tokio::test]
async fn test_reboot_drains_and_reopens_admission() {
    let h = TestHarness::new(5);
    h.engine.pause();
    h.orchestrator.submit_movie(1).await.unwrap();
    h.orchestrator.start().await;
    h.wait_for_processing().await;

    let admin = h.orchestrator.admin().clone();
    let challenge = admin.request_confirmation(AdminAction::Reboot);
    let reboot = admin.reboot(&challenge.token).unwrap();

    assert!(admin.is_rebooting());
    let err = h.orchestrator.submit_movie(2).await.unwrap_err();
    assert_eq!(err.reason_code(), "shutting_down");

    let status = h.orchestrator.status().await;
    assert!(status.orchestrator.rebooting);
    assert!(!status.orchestrator.accepting);

    h.engine.resume();
    let report = reboot.await.unwrap();
    assert_eq!(report.drained, 1);
    assert!(report.forced.is_empty());
    assert!(report.settings_reloaded);

    assert!(!admin.is_rebooting());
    assert!(h.orchestrator.is_running());
    assert_eq!(admin.last_reboot(), Some(report));
    assert!(h.orchestrator.processing().history[0].success);

    h.orchestrator.submit_movie(2).await.unwrap();
    h.orchestrator.stop().await;
}

#[tokio::test]
async fn test_reboot_forces_stuck_jobs_after_timeout() {
    let h = TestHarness::new(1);
    h.engine.pause();
    let item = h.orchestrator.submit_movie(1).await.unwrap();
    h.orchestrator.start().await;
    h.wait_for_processing().await;

    let admin = h.orchestrator.admin();
    let challenge = admin.request_confirmation(AdminAction::Reboot);
    let report = admin.reboot(&challenge.token).unwrap().await.unwrap();

    assert_eq!(report.drained, 0);
    assert_eq!(report.forced, vec![item.id]);

    let history = h.orchestrator.processing().history;
    assert_eq!(history.len(), 1);
    assert!(!history[0].success);
    assert_eq!(history[0].error.as_deref(), Some(INTERRUPTED_BY_REBOOT));
    assert!(h.orchestrator.queue().is_empty());

    h.engine.resume();
    h.orchestrator.stop().await;
}

#[tokio::test]
async fn test_second_reboot_is_rejected_while_first_runs() {
    let h = TestHarness::new(5);
    h.engine.pause();
    h.orchestrator.submit_movie(1).await.unwrap();
    h.orchestrator.start().await;
    h.wait_for_processing().await;

    let admin = h.orchestrator.admin();
    let first = admin.request_confirmation(AdminAction::Reboot);
    let second = admin.request_confirmation(AdminAction::Reboot);
    let reboot = admin.reboot(&first.token).unwrap();

    let err = admin.reboot(&second.token).unwrap_err();
    assert_eq!(err, AdminError::RebootInProgress);

    h.engine.resume();
    reboot.await.unwrap();

    // The rejected attempt did not burn its token.
    let report = admin.reboot(&second.token).unwrap().await.unwrap();
    assert_eq!(report.drained, 0);
    h.orchestrator.stop().await;
}

#[tokio::test]
async fn test_reboot_with_bad_token_leaves_no_reboot_running() {
    let h = TestHarness::new(5);
    h.orchestrator.start().await;
    let admin = h.orchestrator.admin();

    let err = admin.reboot("bogus").unwrap_err();
    assert!(matches!(err, AdminError::InvalidConfirmation(_)));
    assert!(!admin.is_rebooting());

    let challenge = admin.request_confirmation(AdminAction::Reboot);
    admin.reboot(&challenge.token).unwrap().await.unwrap();
    h.orchestrator.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_reboots_keep_the_losing_token() {
    let h = TestHarness::new(5);
    h.engine.pause();
    h.orchestrator.submit_movie(1).await.unwrap();
    h.orchestrator.start().await;
    h.wait_for_processing().await;

    let barrier = Arc::new(std::sync::Barrier::new(2));
    let attempts: Vec<_> = (0..2)
        .map(|_| {
            let admin = h.orchestrator.admin().clone();
            let token = admin.request_confirmation(AdminAction::Reboot).token;
            let barrier = Arc::clone(&barrier);
            tokio::task::spawn_blocking(move || {
                barrier.wait();
                (token.clone(), admin.reboot(&token))
            })
        })
        .collect();

    let mut winners = Vec::new();
    let mut losing_tokens = Vec::new();
    for attempt in attempts {
        let (token, result) = attempt.await.unwrap();
        match result {
            Ok(reboot) => winners.push(reboot),
            Err(err) => {
                assert_eq!(err, AdminError::RebootInProgress);
                losing_tokens.push(token);
            }
        }
    }
    // The paused job holds the drain open, so only one attempt can win.
    assert_eq!(winners.len(), 1);
    assert_eq!(losing_tokens.len(), 1);

    h.engine.resume();
    for reboot in winners {
        reboot.await.unwrap();
    }

    let admin = h.orchestrator.admin();
    let report = admin.reboot(&losing_tokens[0]).unwrap().await.unwrap();
    assert_eq!(report.drained, 0);
    h.orchestrator.stop().await;
}

#[tokio::test]
async fn test_reboot_reloads_stored_settings() {
    let h = TestHarness::new(5);
    h.orchestrator.start().await;

    let mut stored = fixtures::settings(50, 100);
    stored.boost_db = 12;
    h.settings_store.save(&stored).unwrap();
    assert_eq!(h.orchestrator.settings().boost_db, 6);

    let admin = h.orchestrator.admin();
    let challenge = admin.request_confirmation(AdminAction::Reboot);
    let report = admin.reboot(&challenge.token).unwrap().await.unwrap();

    assert!(report.settings_reloaded);
    assert_eq!(h.orchestrator.settings().boost_db, 12);
    h.orchestrator.stop().await;
}
