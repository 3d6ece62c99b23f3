//! Due-today reminders.
//!
//! [`ReminderPoller`] runs on the tokio runtime and, once per interval, opens
//! its own connection to the task database and pushes a [`Reminder`] for every
//! non-completed, reminder-enabled task whose deadline is today. The TUI owns
//! the matching [`ReminderQueue`] and drains it from its event loop.
//!
//! Delivery is best effort: there is no join on shutdown, so reminders
//! enqueued just before exit can be dropped, and a reminder can still be
//! shown for a task that was completed after it was enqueued.
//!
//! ```rust,ignore
//! let (sender, queue) = ReminderQueue::unbounded();
//! let handle = ReminderPoller::new(db_path, sender, CancellationToken::new())
//!     .spawn(runtime.handle());
//! // ... later
//! handle.stop();
//! ```

use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::database::{Database, StorageError};
use crate::models::DueTask;
use crate::utils;

/// Default time between reminder checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// A task that is due today and has its reminder flag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task_id: i64,
    pub title: String,
}

impl From<DueTask> for Reminder {
    fn from(due: DueTask) -> Self {
        Self {
            task_id: due.id,
            title: due.title,
        }
    }
}

/// Producer side of the notification queue.
#[derive(Debug, Clone)]
pub struct ReminderSender {
    tx: mpsc::UnboundedSender<Reminder>,
}

impl ReminderSender {
    /// Returns `false` once the consumer has gone away.
    pub fn send(&self, reminder: Reminder) -> bool {
        self.tx.send(reminder).is_ok()
    }
}

/// Consumer side of the notification queue. Unbounded and FIFO.
#[derive(Debug)]
pub struct ReminderQueue {
    rx: mpsc::UnboundedReceiver<Reminder>,
}

impl ReminderQueue {
    pub fn unbounded() -> (ReminderSender, ReminderQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ReminderSender { tx }, ReminderQueue { rx })
    }

    /// Take everything currently queued without blocking.
    pub fn drain(&mut self) -> Vec<Reminder> {
        let mut drained = Vec::new();
        while let Ok(reminder) = self.rx.try_recv() {
            drained.push(reminder);
        }
        drained
    }
}

/// Run one reminder check against the database at `db_path`.
///
/// Opens a fresh connection so it never shares the interactive handle.
/// Returns how many reminders were enqueued.
pub fn poll_once(
    db_path: &std::path::Path,
    today: NaiveDate,
    sender: &ReminderSender,
) -> Result<usize, StorageError> {
    let db = Database::open(db_path)?;
    let due = db.tasks_due_on(today, true)?;
    let mut sent = 0;
    for task in due {
        if sender.send(Reminder::from(task)) {
            sent += 1;
        }
    }
    Ok(sent)
}

fn join_failure(e: &JoinError) -> &'static str {
    if e.is_panic() { "panicked" } else { "cancelled" }
}

/// Lifecycle of a spawned poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Running,
    /// Cancellation requested, loop not yet exited.
    Stopping,
    Stopped,
}

const STATE_RUNNING: u8 = 0;
const STATE_STOPPED: u8 = 2;

/// Periodic background check for reminder-enabled tasks due today.
pub struct ReminderPoller {
    db_path: PathBuf,
    sender: ReminderSender,
    cancel: CancellationToken,
    interval: Duration,
    clock: fn() -> NaiveDate,
}

impl ReminderPoller {
    pub fn new(db_path: impl Into<PathBuf>, sender: ReminderSender, cancel: CancellationToken) -> Self {
        Self {
            db_path: db_path.into(),
            sender,
            cancel,
            interval: DEFAULT_POLL_INTERVAL,
            clock: utils::today,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override how "today" is computed (tests pin a fixed date).
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Run until the cancellation token fires. The first check happens
    /// immediately, then once per interval.
    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            path = %self.db_path.display(),
            "reminder poller started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("reminder poller stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.cycle().await;
                }
            }
        }
    }

    async fn cycle(&self) {
        let path = self.db_path.clone();
        let sender = self.sender.clone();
        let today = (self.clock)();

        let result = tokio::task::spawn_blocking(move || poll_once(&path, today, &sender)).await;
        match result {
            Ok(Ok(sent)) => debug!(sent, %today, "reminder check finished"),
            // A failed cycle is logged and the next one runs as usual
            Ok(Err(e)) => warn!(error = %e, "reminder check failed"),
            Err(e) if e.is_panic() => warn!(error = %e, "reminder check panicked"),
            // Runtime shutting down
            Err(e) => debug!(error = %e, "reminder check {}", join_failure(&e)),
        }
    }

    /// Spawn onto `runtime` and return a handle for stopping it.
    pub fn spawn(self, runtime: &Handle) -> PollerHandle {
        let cancel = self.cancel.clone();
        let state = Arc::new(AtomicU8::new(STATE_RUNNING));
        let finished = Arc::clone(&state);
        let join = runtime.spawn(async move {
            self.run().await;
            finished.store(STATE_STOPPED, Ordering::Release);
        });
        PollerHandle { cancel, state, join }
    }
}

/// Handle to a spawned [`ReminderPoller`].
pub struct PollerHandle {
    cancel: CancellationToken,
    state: Arc<AtomicU8>,
    join: JoinHandle<()>,
}

impl PollerHandle {
    /// Request the poller to stop. Does not wait for it.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> PollerState {
        if self.state.load(Ordering::Acquire) == STATE_STOPPED || self.join.is_finished() {
            PollerState::Stopped
        } else if self.cancel.is_cancelled() {
            PollerState::Stopping
        } else {
            PollerState::Running
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() == PollerState::Stopped
    }
}
