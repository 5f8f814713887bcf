// ── Polling coordinator ──
//
// Owns one SNMP client, polls it on a fixed interval from a single
// background task, and publishes immutable snapshots through a watch
// channel. Cycles never overlap; a failed cycle keeps the last good
// snapshot and marks it stale.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use apcups_snmp::{Snmp2Session, SnmpSession, UpsSnmpClient};

use crate::error::CoreError;
use crate::snapshot::UpsSnapshot;

/// Default spacing between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Bounds for user-configurable poll intervals.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Coordinator tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ── PollState ────────────────────────────────────────────────────

/// Freshness of the published snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// No snapshot has been produced yet.
    Pending,
    /// The snapshot is from the most recent cycle.
    Fresh,
    /// The last cycle failed; the snapshot is from an earlier cycle.
    Stale,
    /// The agent rejected our credentials; polling is suspended until
    /// [`UpsCoordinator::reauthenticate`] succeeds.
    AuthRequired,
}

/// State observable by subscribers, republished after every cycle.
#[derive(Debug, Clone)]
pub struct PollState {
    pub status: PollStatus,
    pub snapshot: Option<Arc<UpsSnapshot>>,
}

impl PollState {
    fn initial() -> Self {
        Self {
            status: PollStatus::Pending,
            snapshot: None,
        }
    }
}

// ── UpsCoordinator ───────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Call [`first_refresh`](Self::first_refresh)
/// to validate the configuration and start the background poll task.
pub struct UpsCoordinator<S = Snmp2Session> {
    inner: Arc<CoordinatorInner<S>>,
}

impl<S> Clone for UpsCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<S> {
    client: RwLock<Arc<UpsSnmpClient<S>>>,
    state: watch::Sender<PollState>,
    interval: Duration,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: SnmpSession + Send + 'static> UpsCoordinator<S> {
    /// Create a coordinator around an existing client. Does not poll;
    /// call [`first_refresh`](Self::first_refresh) to start.
    pub fn new(client: UpsSnmpClient<S>, config: PollConfig) -> Self {
        let (state, _) = watch::channel(PollState::initial());
        Self {
            inner: Arc::new(CoordinatorInner {
                client: RwLock::new(Arc::new(client)),
                state,
                interval: config.interval,
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the initial poll. Fails loudly: when no snapshot can be
    /// produced, the error comes back to the caller instead of being
    /// swallowed into the background task. On success the periodic
    /// poll task is started.
    pub async fn first_refresh(&self) -> Result<(), CoreError> {
        self.refresh_now().await
    }

    /// Swap in a client built from fresh credentials and poll once.
    /// This is the only way out of [`PollStatus::AuthRequired`].
    pub async fn reauthenticate(&self, client: UpsSnmpClient<S>) -> Result<(), CoreError> {
        info!("swapping SNMP client after reconfiguration");
        *self.inner.client.write().await = Arc::new(client);
        self.refresh_now().await
    }

    /// Stop the background task and release the client.
    pub async fn close(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            let _ = handle.await;
        }
        self.inner.client.read().await.close().await;
        debug!("coordinator closed");
    }

    async fn refresh_now(&self) -> Result<(), CoreError> {
        match poll_once(&self.inner).await {
            Ok(snapshot) => {
                self.inner.state.send_modify(|s| {
                    s.snapshot = Some(snapshot);
                    s.status = PollStatus::Fresh;
                });
                self.spawn_poll_task().await;
                Ok(())
            }
            Err(err) => {
                self.inner.state.send_modify(|s| {
                    if matches!(err, CoreError::AuthRequired { .. }) {
                        s.status = PollStatus::AuthRequired;
                    }
                });
                Err(err)
            }
        }
    }

    async fn spawn_poll_task(&self) {
        let mut slot = self.inner.task.lock().await;
        if let Some(handle) = slot.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }
        *slot = Some(tokio::spawn(poll_task(Arc::clone(&self.inner))));
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to poll state. The sender publishes after every
    /// cycle, successful or not, so subscribers also see each
    /// freshness transition.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    /// The most recent snapshot, if any cycle has succeeded yet.
    pub fn current_snapshot(&self) -> Option<Arc<UpsSnapshot>> {
        self.inner.state.borrow().snapshot.clone()
    }

    /// Current freshness status.
    pub fn status(&self) -> PollStatus {
        self.inner.state.borrow().status
    }
}

// ── Background task ──────────────────────────────────────────────

/// Poll on a fixed interval until cancelled or authentication fails.
/// Each cycle runs to completion before the next is considered, so
/// slow agents stretch the schedule instead of stacking requests.
async fn poll_task<S: SnmpSession + Send + 'static>(inner: Arc<CoordinatorInner<S>>) {
    let mut interval = tokio::time::interval(inner.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = inner.cancel.cancelled() => break,
            _ = interval.tick() => {
                let result = poll_once(&inner).await;
                if !apply_poll_result(&inner, result) {
                    break;
                }
            }
        }
    }
}

async fn poll_once<S: SnmpSession + Send>(
    inner: &CoordinatorInner<S>,
) -> Result<Arc<UpsSnapshot>, CoreError> {
    let client = Arc::clone(&*inner.client.read().await);
    let values = client.get_all_data().await?;
    Ok(Arc::new(UpsSnapshot::new(values)))
}

/// Fold a cycle result into the published state. Returns whether the
/// poll task should keep running.
fn apply_poll_result<S>(
    inner: &CoordinatorInner<S>,
    result: Result<Arc<UpsSnapshot>, CoreError>,
) -> bool {
    match result {
        Ok(snapshot) => {
            debug!(values = snapshot.len(), "poll cycle complete");
            inner.state.send_modify(|s| {
                s.snapshot = Some(snapshot);
                s.status = PollStatus::Fresh;
            });
            true
        }
        Err(err @ CoreError::AuthRequired { .. }) => {
            warn!(error = %err, "authentication failed, polling suspended until reconfiguration");
            inner.state.send_modify(|s| s.status = PollStatus::AuthRequired);
            false
        }
        Err(err) => {
            warn!(error = %err, "poll cycle failed, keeping last snapshot");
            inner.state.send_modify(|s| {
                s.status = if s.snapshot.is_some() {
                    PollStatus::Stale
                } else {
                    PollStatus::Pending
                };
            });
            true
        }
    }
}
