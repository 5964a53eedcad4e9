//! Completion Watcher - Waits for a DLP job to finish
//!
//! DLP announces job completion by publishing to the topic named in the job's
//! `pubSub` action. The watcher listens on a pull subscription for a message
//! whose `DlpJobName` attribute matches the submitted job, waits at most a
//! bounded time for it, then asks the DLP service for the job's status. The
//! status query is the source of truth; the notification only saves polling.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let session = WatchSession::open(channel, WatchSettings::default()).await?;
//! let job = client.create_inspect_job(&parent, &body).await?;
//! let outcome = session.wait_for_job(&job.name, &client).await?;
//! ```
//!
//! The subscription is opened before the job is submitted. Pub/Sub retains
//! messages published after a subscription exists, so a job that finishes
//! before the listener starts is still seen on the first pull.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::constants::{
    DEFAULT_COMPLETION_TIMEOUT_SECS, DEFAULT_MAX_MESSAGES, DEFAULT_PULL_INTERVAL_MS,
    DEFAULT_SETTLE_DELAY_MS, JOB_NAME_ATTRIBUTE,
};
use crate::dlp_types::DlpJob;
use crate::error::{RemoteError, ScanError};
use crate::pubsub::{PubsubMessage, ReceivedMessage};

/// Source of job completion notifications
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Subscription name, for logs and errors
    fn name(&self) -> &str;

    /// Verify the subscription is usable
    async fn open(&self) -> Result<(), RemoteError>;

    /// Pull a batch of pending messages
    async fn pull(&self, max_messages: u32) -> Result<Vec<ReceivedMessage>, RemoteError>;

    /// Acknowledge consumed messages
    async fn acknowledge(&self, ack_ids: &[String]) -> Result<(), RemoteError>;
}

/// Authoritative job status lookup
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, job_name: &str) -> Result<DlpJob, RemoteError>;
}

/// Timing knobs for a watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    /// Upper bound on the wait for a completion notification
    pub completion_timeout: Duration,
    /// Pause after a notification before querying the job
    pub settle_delay: Duration,
    /// Pause between pulls that returned nothing or failed
    pub pull_interval: Duration,
    pub max_messages: u32,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            completion_timeout: Duration::from_secs(DEFAULT_COMPLETION_TIMEOUT_SECS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            pull_interval: Duration::from_millis(DEFAULT_PULL_INTERVAL_MS),
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

/// One-shot flag raised when the watched job's notification arrives.
///
/// Clones share the flag. Only messages correlated to `job_name` can raise it,
/// and raising it a second time has no effect.
#[derive(Clone)]
pub struct CompletionSignal {
    job_name: Arc<str>,
    sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

/// Receiving half of a [`CompletionSignal`], consumed by the wait
pub struct CompletionReceiver {
    rx: oneshot::Receiver<()>,
}

impl CompletionSignal {
    pub fn new(job_name: &str) -> (Self, CompletionReceiver) {
        let (tx, rx) = oneshot::channel();
        let signal = Self {
            job_name: Arc::from(job_name),
            sender: Arc::new(Mutex::new(Some(tx))),
        };
        (signal, CompletionReceiver { rx })
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Raise the flag. Returns `true` only for the call that raised it.
    pub fn set(&self) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                // The receiver may already be gone after a timeout.
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn is_set(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Whether a message reports on this signal's job
    pub fn matches(&self, message: &PubsubMessage) -> bool {
        message.attribute(JOB_NAME_ATTRIBUTE) == Some(&*self.job_name)
    }
}

impl CompletionReceiver {
    /// Wait until the signal is raised or `timeout` elapses.
    ///
    /// Returns `true` if the signal was raised in time.
    pub async fn wait(self, timeout: Duration) -> bool {
        matches!(tokio::time::timeout(timeout, self.rx).await, Ok(Ok(())))
    }
}

/// What to do with a pulled message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The message reports on the watched job; consume it
    Ack,
    /// Another job's message; leave it for whoever is waiting on that job
    Ignore,
}

/// Notification handler: correlate a message with the watched job
pub fn handle_message(signal: &CompletionSignal, message: &PubsubMessage) -> Disposition {
    if signal.matches(message) {
        if signal.set() {
            info!(job = signal.job_name(), "Received job completion notification");
        } else {
            debug!(job = signal.job_name(), "Duplicate completion notification");
        }
        Disposition::Ack
    } else {
        debug!(
            message_id = %message.message_id,
            job = ?message.attribute(JOB_NAME_ATTRIBUTE),
            "Ignoring notification for another job"
        );
        Disposition::Ignore
    }
}

/// Lifecycle of a watch session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Subscription active, signal unset
    Open,
    /// Matching notification received
    Signaled,
    /// Listener torn down, status queried
    Closed,
}

/// Result of a completed watch
#[derive(Debug, Clone)]
pub struct WatchOutcome {
    /// Job as reported by the status query
    pub job: DlpJob,
    /// Whether completion was confirmed by a notification
    pub notified: bool,
    /// Time spent waiting for the notification
    pub waited: Duration,
    /// Session states in the order they were entered
    pub states: Vec<WatchState>,
}

/// A subscription opened for one job's completion
pub struct WatchSession {
    channel: Arc<dyn NotificationChannel>,
    settings: WatchSettings,
    states: Vec<WatchState>,
}

impl WatchSession {
    /// Open the subscription. Call this before submitting the job.
    pub async fn open(
        channel: Arc<dyn NotificationChannel>,
        settings: WatchSettings,
    ) -> Result<Self, ScanError> {
        channel
            .open()
            .await
            .map_err(|source| ScanError::WatchSetup {
                subscription: channel.name().to_string(),
                source,
            })?;

        debug!(subscription = channel.name(), "Watch session open");
        Ok(Self {
            channel,
            settings,
            states: vec![WatchState::Open],
        })
    }

    /// Wait for `job_name` to complete, then query its status exactly once.
    ///
    /// A missing notification is not an error: after the timeout the status
    /// query still runs and its answer is returned. The listener is stopped
    /// before this returns, whatever the outcome.
    pub async fn wait_for_job(
        mut self,
        job_name: &str,
        status: &dyn JobStatusSource,
    ) -> Result<WatchOutcome, ScanError> {
        let (signal, receiver) = CompletionSignal::new(job_name);
        let listener = Listener::spawn(self.channel.clone(), signal.clone(), &self.settings);

        let started = Instant::now();
        let notified = receiver.wait(self.settings.completion_timeout).await;
        let waited = started.elapsed();

        if notified {
            self.transition(WatchState::Signaled);
        } else {
            warn!(
                job = job_name,
                timeout_secs = self.settings.completion_timeout.as_secs(),
                "Unable to verify job completion via notification"
            );
        }

        listener.shutdown().await;
        self.transition(WatchState::Closed);

        if notified && !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        let job = match status.job_status(job_name).await {
            Ok(job) => job,
            Err(source) => {
                debug!(job = job_name, states = ?self.states, "Job status query failed");
                return Err(ScanError::StatusQuery {
                    job: job_name.to_string(),
                    source,
                });
            }
        };

        info!(job = %job.name, state = %job.state, "Job status retrieved");
        Ok(WatchOutcome {
            job,
            notified,
            waited,
            states: self.states,
        })
    }

    fn transition(&mut self, next: WatchState) {
        debug!(from = ?self.states.last(), to = ?next, "Watch state change");
        self.states.push(next);
    }
}

/// Background task pulling from the subscription
struct Listener {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Listener {
    fn spawn(
        channel: Arc<dyn NotificationChannel>,
        signal: CompletionSignal,
        settings: &WatchSettings,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(listen(
            channel,
            signal,
            settings.max_messages,
            settings.pull_interval,
            cancel.clone(),
        ));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancel the task and wait for it to exit
    async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    warn!("Notification listener panicked: {}", e);
                }
            }
        }
        debug!("Notification listener stopped");
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Pull loop; exits once the signal is raised or the token is cancelled.
async fn listen(
    channel: Arc<dyn NotificationChannel>,
    signal: CompletionSignal,
    max_messages: u32,
    pull_interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        let pulled = tokio::select! {
            _ = cancel.cancelled() => break,
            result = channel.pull(max_messages) => result,
        };

        match pulled {
            Ok(messages) if !messages.is_empty() => {
                let ack_ids = consume(&signal, &messages);
                if !ack_ids.is_empty() {
                    let acked = tokio::select! {
                        _ = cancel.cancelled() => break,
                        result = channel.acknowledge(&ack_ids) => result,
                    };
                    if let Err(e) = acked {
                        warn!("Failed to acknowledge notification: {}", e);
                    }
                }
                if signal.is_set() {
                    break;
                }
                // More may be queued; pull again straight away.
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(subscription = channel.name(), "Subscription pull failed: {}", e);
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(pull_interval) => {}
        }
    }
}

/// Run the handler over a batch, returning the ack ids to consume
fn consume(signal: &CompletionSignal, messages: &[ReceivedMessage]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| handle_message(signal, &m.message) == Disposition::Ack)
        .map(|m| m.ack_id.clone())
        .collect()
}
