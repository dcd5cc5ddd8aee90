// ── Reconciliation passes ──
//
// A pass fetches a fresh snapshot, resolves it, and applies the result to
// the indicator board. Passes are numbered when they start. On completion
// a pass is applied only if its number is still the latest one issued;
// anything older is discarded, so a slow pass can never overwrite newer
// state. Timer-style triggers coalesce into an in-flight pass instead of
// starting another one. Post-action triggers always start a fresh pass.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{Mutex, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::SnapshotMode;
use crate::indicator::{Applied, BoardView, IndicatorBoard};
use crate::model::{FetchFailure, Platform, Resolution, SnapshotSource, StateMap, StatusReport};
use crate::resolver::resolve;

/// What started a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Timer,
    /// Explicit user refresh.
    Manual,
    /// The chat assistant reported a backend state change.
    ChatRefresh,
    Configured(Platform),
    Disconnected(Platform),
    ActionFailed(Platform),
}

impl Trigger {
    /// Post-action triggers must observe state written after any
    /// in-flight pass started, so they never coalesce.
    pub fn supersedes_in_flight(self) -> bool {
        matches!(
            self,
            Self::Configured(_) | Self::Disconnected(_) | Self::ActionFailed(_)
        )
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => f.write_str("startup"),
            Self::Timer => f.write_str("timer"),
            Self::Manual => f.write_str("manual"),
            Self::ChatRefresh => f.write_str("chat-refresh"),
            Self::Configured(p) => write!(f, "configured({p})"),
            Self::Disconnected(p) => write!(f, "disconnected({p})"),
            Self::ActionFailed(p) => write!(f, "action-failed({p})"),
        }
    }
}

/// What happened to a requested pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass completed and was the latest; `changed` lists platforms
    /// whose state moved.
    Applied {
        seq: u64,
        states: StateMap,
        changed: Vec<Platform>,
    },
    /// Another pass was already running and will serve this request.
    Coalesced,
    /// A newer pass or action started while this one was running.
    Stale { seq: u64, latest: u64 },
}

/// Owns the indicator board and runs reconciliation passes against it.
pub struct Reconciler<B> {
    inner: Arc<ReconcilerInner<B>>,
}

struct ReconcilerInner<B> {
    backend: Arc<B>,
    mode: SnapshotMode,
    fetch_timeout: Duration,
    board: Mutex<IndicatorBoard>,
    updates: watch::Receiver<Arc<BoardView>>,
    latest_seq: AtomicU64,
    in_flight: AtomicUsize,
}

impl<B> Clone for Reconciler<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A started pass. Dropping it (including on abort) releases the
/// in-flight slot.
struct PassTicket<'a> {
    seq: u64,
    in_flight: &'a AtomicUsize,
}

impl Drop for PassTicket<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<B: Backend> Reconciler<B> {
    pub fn new(backend: Arc<B>, mode: SnapshotMode, fetch_timeout: Duration) -> Self {
        let board = IndicatorBoard::new();
        let updates = board.subscribe();
        Self {
            inner: Arc::new(ReconcilerInner {
                backend,
                mode,
                fetch_timeout,
                board: Mutex::new(board),
                updates,
                latest_seq: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to board changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardView>> {
        self.inner.updates.clone()
    }

    /// Current board.
    pub fn view(&self) -> Arc<BoardView> {
        self.inner.updates.borrow().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire) > 0
    }

    /// Run one pass to completion.
    pub async fn reconcile(&self, trigger: Trigger) -> PassOutcome {
        let Some(ticket) = self.begin(trigger) else {
            debug!(%trigger, "pass already in flight, coalescing");
            return PassOutcome::Coalesced;
        };

        let started = Instant::now();
        debug!(%trigger, seq = ticket.seq, "reconciliation pass started");

        let source = self.fetch().await;
        let states = resolve(&source);
        let outcome = self.commit(&ticket, states).await;

        debug!(
            %trigger,
            seq = ticket.seq,
            elapsed_ms = started.elapsed().as_millis(),
            "reconciliation pass finished"
        );
        outcome
    }

    fn begin(&self, trigger: Trigger) -> Option<PassTicket<'_>> {
        let inner = &self.inner;
        if trigger.supersedes_in_flight() {
            inner.in_flight.fetch_add(1, Ordering::AcqRel);
        } else if inner
            .in_flight
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let seq = inner.latest_seq.fetch_add(1, Ordering::AcqRel) + 1;
        Some(PassTicket {
            seq,
            in_flight: &inner.in_flight,
        })
    }

    async fn fetch(&self) -> SnapshotSource {
        let inner = &self.inner;
        match inner.mode {
            SnapshotMode::Bulk => {
                match tokio::time::timeout(inner.fetch_timeout, inner.backend.fetch_snapshot())
                    .await
                {
                    Ok(Ok(snapshot)) => SnapshotSource::Bulk(snapshot),
                    Ok(Err(e)) => {
                        warn!(error = %e, "snapshot fetch failed");
                        SnapshotSource::Unavailable(FetchFailure::from(&e))
                    }
                    Err(_) => {
                        warn!(
                            timeout_secs = inner.fetch_timeout.as_secs(),
                            "snapshot fetch timed out"
                        );
                        SnapshotSource::Unavailable(FetchFailure::timeout(inner.fetch_timeout))
                    }
                }
            }
            SnapshotMode::PerPlatform => {
                let fetches = Platform::ALL.map(|platform| async move {
                    (platform, self.fetch_status(platform).await)
                });
                SnapshotSource::PerPlatform(join_all(fetches).await.into_iter().collect())
            }
        }
    }

    async fn fetch_status(&self, platform: Platform) -> Result<StatusReport, FetchFailure> {
        let inner = &self.inner;
        match tokio::time::timeout(inner.fetch_timeout, inner.backend.fetch_status(platform)).await
        {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => {
                warn!(%platform, error = %e, "status fetch failed");
                Err(FetchFailure::from(&e))
            }
            Err(_) => {
                warn!(%platform, "status fetch timed out");
                Err(FetchFailure::timeout(inner.fetch_timeout))
            }
        }
    }

    async fn commit(&self, ticket: &PassTicket<'_>, states: StateMap) -> PassOutcome {
        let mut board = self.inner.board.lock().await;
        let latest = self.inner.latest_seq.load(Ordering::Acquire);
        if ticket.seq != latest {
            debug!(seq = ticket.seq, latest, "discarding stale pass");
            return PassOutcome::Stale {
                seq: ticket.seq,
                latest,
            };
        }
        let changed = board.apply_all(&states);
        PassOutcome::Applied {
            seq: ticket.seq,
            states,
            changed,
        }
    }

    /// Write one platform's state outside a pass (optimistic or safe-state
    /// updates after an action). Any pass already running becomes stale.
    pub(crate) async fn apply_override(
        &self,
        platform: Platform,
        resolution: &Resolution,
    ) -> Applied {
        let mut board = self.inner.board.lock().await;
        self.inner.latest_seq.fetch_add(1, Ordering::AcqRel);
        board.apply(platform, resolution)
    }

    /// Spawn the background loop: one startup pass, then a timer pass
    /// every `period` until `cancel` fires. A zero period disables the timer.
    pub fn spawn(&self, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(reconcile_task(self.clone(), period, cancel))
    }
}

// ── Background task ──────────────────────────────────────────────

async fn reconcile_task<B: Backend>(
    reconciler: Reconciler<B>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut passes = JoinSet::new();
    spawn_pass(&mut passes, &reconciler, Trigger::Startup);

    let mut interval = (!period.is_zero()).then(|| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = next_tick(interval.as_mut()) => {
                spawn_pass(&mut passes, &reconciler, Trigger::Timer);
            }
            Some(joined) = passes.join_next() => log_pass(joined),
        }
    }

    passes.abort_all();
    debug!("reconciliation loop stopped");
}

fn spawn_pass<B: Backend>(
    passes: &mut JoinSet<PassOutcome>,
    reconciler: &Reconciler<B>,
    trigger: Trigger,
) {
    let reconciler = reconciler.clone();
    passes.spawn(async move { reconciler.reconcile(trigger).await });
}

async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn log_pass(joined: Result<PassOutcome, JoinError>) {
    match joined {
        Ok(PassOutcome::Applied { changed, .. }) if !changed.is_empty() => {
            info!(?changed, "platform states changed");
        }
        Ok(_) => {}
        Err(e) if e.is_cancelled() => {}
        Err(e) => warn!(error = %e, "reconciliation pass panicked"),
    }
}
