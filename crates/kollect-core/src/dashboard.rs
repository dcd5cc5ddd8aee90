// ── Dashboard facade ──
//
// Wires the backend, reconciler and action gateway together and manages
// the background reconciliation loop. Consumers (the CLI) talk to this
// type only.

use std::sync::Arc;

use kollect_api::{ChatReply, KollectClient};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::gateway::{Ack, ActionGateway, PlatformCredentials};
use crate::indicator::BoardView;
use crate::model::{Inventory, Platform};
use crate::reconcile::{PassOutcome, Reconciler, Trigger};

/// The dashboard core. Cheaply cloneable via `Arc<DashboardInner>`.
pub struct Dashboard<B = KollectClient> {
    inner: Arc<DashboardInner<B>>,
}

struct DashboardInner<B> {
    config: DashboardConfig,
    backend: Arc<B>,
    reconciler: Reconciler<B>,
    gateway: ActionGateway<B>,
    task: Mutex<Option<LoopHandle>>,
}

/// A running reconciliation loop and the token that stops it.
struct LoopHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl<B> Clone for Dashboard<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Dashboard<KollectClient> {
    /// Build a dashboard talking HTTP to the configured backend.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let client = KollectClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::with_backend(config, client))
    }

    /// Run `f` against a dashboard that has completed one startup pass,
    /// without spawning the background loop.
    pub async fn oneshot<F, Fut, T>(config: DashboardConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Dashboard) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let dashboard = Dashboard::new(config)?;
        dashboard.refresh_with(Trigger::Startup).await;
        f(dashboard).await
    }
}

impl<B: Backend> Dashboard<B> {
    pub fn with_backend(config: DashboardConfig, backend: B) -> Self {
        Self::with_shared_backend(config, Arc::new(backend))
    }

    pub fn with_shared_backend(config: DashboardConfig, backend: Arc<B>) -> Self {
        let reconciler = Reconciler::new(
            Arc::clone(&backend),
            config.snapshot_mode,
            config.fetch_timeout,
        );
        let gateway = ActionGateway::new(Arc::clone(&backend), reconciler.clone());

        Self {
            inner: Arc::new(DashboardInner {
                config,
                backend,
                reconciler,
                gateway,
                task: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start the reconciliation loop: a startup pass immediately, then
    /// timer passes at the configured interval. Calling twice is a no-op;
    /// after [`shutdown()`](Self::shutdown) the loop can be started again.
    pub async fn start(&self) {
        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            debug!("reconciliation loop already running");
            return;
        }
        info!(
            url = %self.inner.config.url,
            mode = %self.inner.config.snapshot_mode,
            interval_secs = self.inner.config.refresh_interval.as_secs(),
            "starting reconciliation loop"
        );
        let cancel = CancellationToken::new();
        let join = self
            .inner
            .reconciler
            .spawn(self.inner.config.refresh_interval, cancel.clone());
        *task = Some(LoopHandle { cancel, join });
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(&self) {
        let Some(handle) = self.inner.task.lock().await.take() else {
            debug!("reconciliation loop not running");
            return;
        };
        handle.cancel.cancel();
        if let Err(e) = handle.join.await {
            warn!(error = %e, "reconciliation loop panicked");
        }
        debug!("dashboard shut down");
    }

    // ── Reconciliation ───────────────────────────────────────────

    /// Explicit user refresh. Coalesces into a pass already in flight.
    pub async fn refresh(&self) -> PassOutcome {
        self.refresh_with(Trigger::Manual).await
    }

    async fn refresh_with(&self, trigger: Trigger) -> PassOutcome {
        self.inner.reconciler.reconcile(trigger).await
    }

    /// Subscribe to indicator changes.
    pub fn indicators(&self) -> watch::Receiver<Arc<BoardView>> {
        self.inner.reconciler.subscribe()
    }

    /// Current indicator board.
    pub fn board(&self) -> Arc<BoardView> {
        self.inner.reconciler.view()
    }

    // ── Actions ──────────────────────────────────────────────────

    pub async fn configure(
        &self,
        platform: Platform,
        credentials: &PlatformCredentials,
    ) -> Result<Ack, CoreError> {
        self.inner.gateway.configure(platform, credentials).await
    }

    pub async fn disconnect(&self, platform: Platform) -> Result<Ack, CoreError> {
        self.inner.gateway.disconnect(platform).await
    }

    /// Relay a chat message. When the assistant reports that it changed
    /// backend state, a pass runs before the reply is returned.
    pub async fn chat(&self, message: &str) -> Result<ChatReply, CoreError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CoreError::validation("message", "must not be empty"));
        }
        let reply = self.inner.backend.chat(message).await?;
        if reply.update_ui {
            debug!("chat reply requested a refresh");
            self.refresh_with(Trigger::ChatRefresh).await;
        }
        Ok(reply)
    }

    /// Read the full inventory from a fresh bulk snapshot.
    pub async fn inventory(&self) -> Result<Inventory, CoreError> {
        let snapshot = self.inner.backend.fetch_snapshot().await?;
        Ok(Inventory::from_snapshot(&snapshot))
    }
}
