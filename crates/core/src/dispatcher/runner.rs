//! Dispatcher implementation.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use super::config::DispatcherConfig;
use crate::censor::CensorEngine;
use crate::history::{HistoryRecord, HistoryStore};
use crate::metrics;
use crate::queue::{QueueItem, QueueManager};
use crate::settings::SettingsHandle;

/// Error recorded for jobs aborted by a forced drain.
pub const INTERRUPTED_BY_REBOOT: &str = "interrupted by reboot";

/// Outcome of [`Dispatcher::stop`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    /// Jobs that finished on their own during the drain.
    pub completed: usize,
    /// Queue ids of jobs aborted when the drain timed out.
    pub forced: Vec<u64>,
}

/// Dispatcher runtime state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherStatus {
    pub running: bool,
    pub in_flight: usize,
    pub concurrency: usize,
}

type InFlight = Arc<Mutex<HashMap<u64, QueueItem>>>;

struct LoopHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<JoinSet<()>>,
}

/// Everything a job task needs to run and record its outcome.
#[derive(Clone)]
struct JobContext {
    queue: Arc<QueueManager>,
    history: Arc<HistoryStore>,
    engine: Arc<dyn CensorEngine>,
    settings: SettingsHandle,
    in_flight: InFlight,
}

impl JobContext {
    /// Records the outcome and frees the queue slot.
    ///
    /// The in-flight map is the gate: whoever removes the entry writes the
    /// one and only history record for it.
    fn finish(&self, id: u64, outcome: impl FnOnce(&QueueItem) -> HistoryRecord) -> bool {
        let item = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        let Some(item) = item else {
            return false;
        };

        let record = outcome(&item);
        metrics::record_job(record.success, record.duration);
        if record.success {
            info!(
                "Job {} ({}) done: {} swears, {:.1}s",
                id, item.source_ref, record.swears_found, record.duration
            );
        } else {
            warn!(
                "Job {} ({}) failed: {}",
                id,
                item.source_ref,
                record.error.as_deref().unwrap_or("unknown error")
            );
        }

        self.history.append(record);
        self.queue.complete(id);
        true
    }

    async fn run(self, item: QueueItem) {
        let started = Instant::now();
        let settings = self.settings.current();
        let resolved = settings.path_resolver().translate(&item.reported_path);
        debug!("Job {} resolved {} -> {}", item.id, item.reported_path, resolved);

        let result = AssertUnwindSafe(self.engine.process(Path::new(&resolved), &settings))
            .catch_unwind()
            .await;
        let duration = started.elapsed().as_secs_f64();

        self.finish(item.id, |item| match result {
            Ok(Ok(outcome)) => HistoryRecord::succeeded(
                item,
                outcome.swears_found,
                outcome.output_path.to_string_lossy(),
                duration,
            ),
            Ok(Err(e)) => HistoryRecord::failed(item, e.to_string(), duration),
            Err(panic) => HistoryRecord::failed(
                item,
                format!("censor engine panicked: {}", panic_message(&*panic)),
                duration,
            ),
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Pulls items off the queue and runs them through the censor engine.
pub struct Dispatcher {
    config: DispatcherConfig,
    ctx: JobContext,
    running: Arc<AtomicBool>,
    control: tokio::sync::Mutex<Option<LoopHandle>>,
}

impl Dispatcher {
    pub fn new(
        config: DispatcherConfig,
        queue: Arc<QueueManager>,
        history: Arc<HistoryStore>,
        engine: Arc<dyn CensorEngine>,
        settings: SettingsHandle,
    ) -> Self {
        Self {
            config,
            ctx: JobContext {
                queue,
                history,
                engine,
                settings,
                in_flight: Arc::new(Mutex::new(HashMap::new())),
            },
            running: Arc::new(AtomicBool::new(false)),
            control: tokio::sync::Mutex::new(None),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Start the dispatch loop. Calling it while running does nothing.
    pub async fn start(&self) {
        let mut control = self.control.lock().await;
        if control.is_some() {
            debug!("Dispatcher already running");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let task = tokio::spawn(Self::dispatch_loop(
            self.ctx.clone(),
            semaphore,
            shutdown_rx,
        ));

        self.running.store(true, Ordering::SeqCst);
        *control = Some(LoopHandle { shutdown_tx, task });
        info!(
            "Dispatcher started (concurrency {})",
            self.config.concurrency.max(1)
        );
    }

    /// Stop pulling new items and drain the ones in flight.
    ///
    /// Jobs still running after `drain_timeout` are aborted; each of them is
    /// recorded as a failure and removed from the queue.
    pub async fn stop(&self, drain_timeout: Duration) -> DrainReport {
        let Some(handle) = self.control.lock().await.take() else {
            debug!("Dispatcher not running");
            return DrainReport::default();
        };

        info!("Stopping dispatcher");
        self.running.store(false, Ordering::SeqCst);
        let _ = handle.shutdown_tx.send(true);

        let mut jobs = match handle.task.await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Dispatch loop ended abnormally: {}", e);
                JoinSet::new()
            }
        };

        let mut report = DrainReport::default();
        let drained = tokio::time::timeout(drain_timeout, async {
            let mut completed = 0;
            while let Some(result) = jobs.join_next().await {
                if let Err(e) = result {
                    warn!("Job task ended abnormally: {}", e);
                }
                completed += 1;
            }
            completed
        })
        .await;

        match drained {
            Ok(completed) => report.completed = completed,
            Err(_) => {
                warn!(
                    "Drain timed out after {:?}; aborting {} jobs",
                    drain_timeout,
                    jobs.len()
                );
                jobs.abort_all();
                while jobs.join_next().await.is_some() {}
            }
        }

        // Anything still registered never recorded an outcome.
        let leftover: Vec<u64> = self
            .ctx
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        for id in leftover {
            if self
                .ctx
                .finish(id, |item| HistoryRecord::failed(item, INTERRUPTED_BY_REBOOT, 0.0))
            {
                report.forced.push(id);
            }
        }
        report.forced.sort_unstable();

        info!(
            "Dispatcher stopped ({} drained, {} aborted)",
            report.completed,
            report.forced.len()
        );
        report
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of jobs currently executing.
    pub fn in_flight(&self) -> usize {
        self.ctx
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            running: self.is_running(),
            in_flight: self.in_flight(),
            concurrency: self.config.concurrency.max(1),
        }
    }

    async fn dispatch_loop(
        ctx: JobContext,
        semaphore: Arc<Semaphore>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinSet<()> {
        let notify = ctx.queue.notifier();
        let mut jobs: JoinSet<()> = JoinSet::new();
        info!("Dispatch loop started");

        'dispatch: loop {
            if *shutdown_rx.borrow() {
                break;
            }

            // Wait for a free worker slot.
            let permit = tokio::select! {
                _ = shutdown_rx.changed() => break 'dispatch,
                Some(_) = jobs.join_next(), if !jobs.is_empty() => continue 'dispatch,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break 'dispatch,
                },
            };

            // Wait for work.
            let item = loop {
                if let Some(item) = ctx.queue.dequeue_next() {
                    break item;
                }
                let poll = Duration::from_secs(ctx.settings.current().poll_interval_seconds.max(1));
                tokio::select! {
                    _ = shutdown_rx.changed() => break 'dispatch,
                    _ = notify.notified() => {}
                    _ = tokio::time::sleep(poll) => {}
                    Some(_) = jobs.join_next(), if !jobs.is_empty() => {}
                }
            };

            debug!("Dispatching job {} ({})", item.id, item.source_ref);
            ctx.in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(item.id, item.clone());

            let job = ctx.clone();
            jobs.spawn(async move {
                let _permit = permit;
                job.run(item).await;
            });
        }

        info!("Dispatch loop stopped");
        jobs
    }
}
