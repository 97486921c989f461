//! Recurring, cancellable batch polling
//!
//! One spawned task per scheduler polls the batch at a fixed interval. Each
//! `start`/`stop` bumps a generation counter; a poll result is applied only
//! while holding the control lock and only if its generation is current, so
//! once [`PollingScheduler::stop`] returns nothing more is applied.
//!
//! A single poll never takes longer than the interval, and details of newly
//! finished jobs are fetched on their own tasks, so the next poll always
//! fires on schedule.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use super::details::JobDetailFetcher;
use super::events::{BatchEvent, FailureKind, Reporter, ReportedFailure};
use super::state::{BatchCell, lock};
use crate::error::Error;
use crate::observability;
use crate::service::BatchService;

// `tokio::time::interval` rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Lifecycle of a [`PollingScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// Never started
    Idle,
    /// A polling task is live
    Polling,
    /// Stopped by the caller or by a terminal batch status
    Stopped,
}

/// Keeps the tracked batch fresh by polling the service.
#[derive(Debug)]
pub struct PollingScheduler {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    service: Arc<dyn BatchService>,
    batch: BatchCell,
    reporter: Reporter,
    details: JobDetailFetcher,
    interval: Duration,
    fetch_details_on_finish: bool,
    control: Mutex<Control>,
}

#[derive(Debug)]
struct Control {
    state: SchedulerState,
    generation: u64,
    target: Option<String>,
    handle: Option<JoinHandle<()>>,
    detail_tasks: JoinSet<()>,
    last_poll_failed: bool,
}

impl Control {
    fn is_current(&self, generation: u64, batch_id: &str) -> bool {
        self.state == SchedulerState::Polling
            && self.generation == generation
            && self.target.as_deref() == Some(batch_id)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PollOutcome {
    Continue,
    Finished,
    Superseded,
}

impl PollingScheduler {
    pub(crate) fn new(
        service: Arc<dyn BatchService>,
        batch: BatchCell,
        reporter: Reporter,
        details: JobDetailFetcher,
        interval: Duration,
        fetch_details_on_finish: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                service,
                batch,
                reporter,
                details,
                interval,
                fetch_details_on_finish,
                control: Mutex::new(Control {
                    state: SchedulerState::Idle,
                    generation: 0,
                    target: None,
                    handle: None,
                    detail_tasks: JoinSet::new(),
                    last_poll_failed: false,
                }),
            }),
        }
    }

    /// Start polling `batch_id`: one poll right away, then one per interval.
    ///
    /// A live polling task is cancelled first, so there is never more than
    /// one. Must be called from within a tokio runtime.
    pub fn start(&self, batch_id: impl Into<String>) {
        let batch_id = batch_id.into();
        let mut control = lock(&self.shared.control);

        if let Some(handle) = control.handle.take() {
            handle.abort();
        }
        control.detail_tasks.abort_all();
        control.generation += 1;
        control.state = SchedulerState::Polling;
        control.target = Some(batch_id.clone());
        control.last_poll_failed = false;

        let generation = control.generation;
        tracing::debug!(batch_id = %batch_id, generation, interval_ms = self.shared.interval.as_millis(), "Polling started");
        control.handle = Some(tokio::spawn(run(self.shared.clone(), batch_id, generation)));
    }

    /// Stop polling. A poll in flight is cancelled and its result ignored.
    ///
    /// Detail fetches still running, including those started by the final
    /// poll of a terminal batch, are cancelled too. Otherwise a no-op unless
    /// polling.
    pub fn stop(&self) {
        let mut control = lock(&self.shared.control);
        control.detail_tasks.abort_all();
        if control.state != SchedulerState::Polling {
            return;
        }

        control.generation += 1;
        control.state = SchedulerState::Stopped;
        if let Some(handle) = control.handle.take() {
            handle.abort();
        }
        tracing::debug!(batch_id = ?control.target, "Polling stopped");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        lock(&self.shared.control).state
    }

    /// Whether the most recent poll failed.
    pub fn last_poll_failed(&self) -> bool {
        lock(&self.shared.control).last_poll_failed
    }

    /// Batch being polled, or last polled.
    pub fn target(&self) -> Option<String> {
        lock(&self.shared.control).target.clone()
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        let mut control = lock(&self.shared.control);
        if let Some(handle) = control.handle.take() {
            handle.abort();
        }
        control.detail_tasks.abort_all();
    }
}

async fn run(shared: Arc<Shared>, batch_id: String, generation: u64) {
    let mut interval = tokio::time::interval(shared.interval.max(MIN_INTERVAL));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match shared.poll_once(&batch_id, generation).await {
            PollOutcome::Continue => {}
            PollOutcome::Finished | PollOutcome::Superseded => break,
        }
    }
}

impl Shared {
    async fn poll_once(self: &Arc<Self>, batch_id: &str, generation: u64) -> PollOutcome {
        let period = self.interval.max(MIN_INTERVAL);
        let result = match tokio::time::timeout(period, self.service.batch_status(batch_id)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(period)),
        };

        let mut control = lock(&self.control);
        if !control.is_current(generation, batch_id) {
            observability::log_poll_discarded(batch_id, "superseded");
            return PollOutcome::Superseded;
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(error) => {
                control.last_poll_failed = true;
                self.reporter.report(
                    ReportedFailure::new(FailureKind::PollingTransport, error.to_string()).batch(batch_id),
                );
                return PollOutcome::Continue;
            }
        };
        control.last_poll_failed = false;

        if snapshot.batch_id.as_deref().is_some_and(|echoed| echoed != batch_id) {
            observability::log_poll_discarded(batch_id, "batch id mismatch");
            return PollOutcome::Continue;
        }

        let Some((applied, batch)) = self.batch.update_if(batch_id, |batch| {
            (batch.apply_snapshot(&snapshot), batch.clone())
        }) else {
            observability::log_poll_discarded(batch_id, "batch no longer tracked");
            return PollOutcome::Superseded;
        };

        observability::log_poll_applied(batch_id, batch.status.as_str(), batch.completed_jobs, batch.total_jobs);
        self.reporter.emit(BatchEvent::Updated { batch: batch.clone() });

        if self.fetch_details_on_finish {
            while control.detail_tasks.try_join_next().is_some() {}
            for job_id in applied.newly_finished {
                control
                    .detail_tasks
                    .spawn(fetch_detail(self.clone(), batch_id.to_string(), job_id, generation));
            }
        }

        if applied.terminal {
            control.state = SchedulerState::Stopped;
            control.handle = None;
            observability::log_batch_terminal(batch_id, batch.status.as_str());
            self.reporter.emit(BatchEvent::Terminal { batch });
            PollOutcome::Finished
        } else {
            PollOutcome::Continue
        }
    }
}

async fn fetch_detail(shared: Arc<Shared>, batch_id: String, job_id: String, generation: u64) {
    let Ok(detail) = shared.details.request(Some(&batch_id), &job_id).await else {
        return;
    };
    let control = lock(&shared.control);
    // A terminal poll already moved the state to Stopped, so only the generation is checked.
    if control.generation == generation {
        shared.details.attach(&batch_id, &job_id, detail);
    }
}
