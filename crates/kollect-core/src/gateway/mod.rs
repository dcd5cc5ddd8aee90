// ── Action gateway ──
//
// Routes user actions (configure, disconnect) to the backend and owns
// the indicator's safe-state policy around them:
//
// - success: optimistic state now, then a fresh pass for ground truth
// - failure: forced Disconnected with the error as reason, then a pass
// - busy: forced Disconnected, no pass (the running action will issue one)

mod credentials;
mod pending;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

pub use credentials::{KubeconfigSource, PlatformCredentials};
pub use pending::{PendingActions, PendingGuard};

use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::{ActionKind, ConnectionState, Platform, Reason, Resolution};
use crate::reconcile::{PassOutcome, Reconciler, Trigger};

/// Acknowledgement of a completed action.
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub platform: Platform,
    pub action: ActionKind,
    /// Backend message, if it sent one.
    pub message: Option<String>,
    /// Whether the confirming pass was applied.
    #[serde(skip)]
    pub confirmation: PassOutcome,
}

pub struct ActionGateway<B> {
    backend: Arc<B>,
    reconciler: Reconciler<B>,
    pending: PendingActions,
}

impl<B: Backend> ActionGateway<B> {
    pub fn new(backend: Arc<B>, reconciler: Reconciler<B>) -> Self {
        Self {
            backend,
            reconciler,
            pending: PendingActions::new(),
        }
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Submit credentials for `platform`.
    pub async fn configure(
        &self,
        platform: Platform,
        credentials: &PlatformCredentials,
    ) -> Result<Ack, CoreError> {
        let guard = self.claim(platform, ActionKind::Configure).await?;
        let result = self.submit(platform, credentials).await;
        drop(guard);

        match result {
            Ok(message) => Ok(self
                .confirm(platform, ActionKind::Configure, ConnectionState::Connected, message)
                .await),
            Err(e) => Err(self.fail(platform, e).await),
        }
    }

    /// Disconnect `platform`. The caller is responsible for confirming
    /// with the user first.
    pub async fn disconnect(&self, platform: Platform) -> Result<Ack, CoreError> {
        let guard = self.claim(platform, ActionKind::Disconnect).await?;
        let result = self.backend.disconnect(platform).await;
        drop(guard);

        match result {
            Ok(message) => Ok(self
                .confirm(
                    platform,
                    ActionKind::Disconnect,
                    ConnectionState::Disconnected,
                    message,
                )
                .await),
            Err(e) => Err(self.fail(platform, e).await),
        }
    }

    async fn claim(
        &self,
        platform: Platform,
        kind: ActionKind,
    ) -> Result<PendingGuard<'_>, CoreError> {
        match self.pending.begin(platform, kind) {
            Ok(guard) => Ok(guard),
            Err(e) => {
                warn!(%platform, action = %kind, "action rejected: {e}");
                self.force_safe(platform, &e).await;
                Err(e)
            }
        }
    }

    async fn submit(
        &self,
        platform: Platform,
        credentials: &PlatformCredentials,
    ) -> Result<Option<String>, CoreError> {
        if credentials.platform() != platform {
            return Err(CoreError::Validation {
                field: "credentials".into(),
                reason: format!(
                    "{} credentials cannot configure {}",
                    credentials.platform().label(),
                    platform.label()
                ),
            });
        }
        credentials.validate()?;

        if matches!(credentials, PlatformCredentials::AzureCli)
            && !self.backend.azure_cli_installed().await?
        {
            return Err(CoreError::ToolingMissing {
                tool: "Azure CLI".into(),
                fallback: "configure Azure with service principal credentials instead".into(),
            });
        }

        self.backend.configure(credentials).await
    }

    async fn confirm(
        &self,
        platform: Platform,
        kind: ActionKind,
        target: ConnectionState,
        message: Option<String>,
    ) -> Ack {
        info!(%platform, action = %kind, "action accepted by backend");
        self.reconciler
            .apply_override(platform, &Resolution::new(target, Reason::Optimistic(kind)))
            .await;

        let trigger = match kind {
            ActionKind::Configure => Trigger::Configured(platform),
            ActionKind::Disconnect => Trigger::Disconnected(platform),
        };
        let confirmation = self.reconciler.reconcile(trigger).await;

        Ack {
            platform,
            action: kind,
            message,
            confirmation,
        }
    }

    async fn fail(&self, platform: Platform, err: CoreError) -> CoreError {
        warn!(%platform, error = %err, "action failed");
        self.force_safe(platform, &err).await;
        self.reconciler.reconcile(Trigger::ActionFailed(platform)).await;
        err
    }

    async fn force_safe(&self, platform: Platform, err: &CoreError) {
        let resolution = Resolution::disconnected(Reason::ActionFailed(err.to_string()));
        self.reconciler.apply_override(platform, &resolution).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::config::SnapshotMode;
    use crate::fake::FakeBackend;
    use crate::indicator::IndicatorAction;

    type Harness = (ActionGateway<FakeBackend>, Reconciler<FakeBackend>);

    fn gateway(backend: &Arc<FakeBackend>) -> Harness {
        let reconciler = Reconciler::new(
            Arc::clone(backend),
            SnapshotMode::Bulk,
            Duration::from_secs(10),
        );
        (
            ActionGateway::new(Arc::clone(backend), reconciler.clone()),
            reconciler,
        )
    }

    fn aws() -> PlatformCredentials {
        PlatformCredentials::Aws {
            access_key: "AKIA123".into(),
            secret_key: SecretString::from("s3cr3t".to_owned()),
        }
    }

    #[tokio::test]
    async fn configure_success_shows_connected_then_confirms() {
        let backend = Arc::new(FakeBackend::default());
        let gate = Arc::new(Notify::new());
        backend.push_gated(
            Some(Arc::clone(&gate)),
            json!({ "EC2Instances": [{ "InstanceId": "i-1" }] }),
        );
        let (gw, rec) = gateway(&backend);
        let gw = Arc::new(gw);

        let task = tokio::spawn({
            let gw = Arc::clone(&gw);
            async move { gw.configure(Platform::Aws, &aws()).await }
        });
        while !rec.is_in_flight() {
            tokio::task::yield_now().await;
        }

        // Optimistic state is visible before the confirming pass lands.
        let view = rec.view();
        let ind = view.get(Platform::Aws).unwrap();
        assert_eq!(ind.state, ConnectionState::Connected);
        assert_eq!(ind.reason, Reason::Optimistic(ActionKind::Configure));

        gate.notify_one();
        let ack = task.await.unwrap().unwrap();
        assert_eq!(ack.message.as_deref(), Some("ok"));
        assert!(matches!(ack.confirmation, PassOutcome::Applied { .. }));
        assert_eq!(rec.view().state(Platform::Aws), Some(ConnectionState::Connected));
    }

    #[tokio::test]
    async fn confirming_pass_replaces_optimistic_reason() {
        let backend = Arc::new(FakeBackend::default());
        backend.serve(json!({ "EC2Instances": [{ "InstanceId": "i-1" }] }));
        let (gw, rec) = gateway(&backend);

        gw.configure(Platform::Aws, &aws()).await.unwrap();
        let view = rec.view();
        let ind = view.get(Platform::Aws).unwrap();
        assert_eq!(ind.state, ConnectionState::Connected);
        assert_eq!(
            ind.reason,
            Reason::Present {
                category: "EC2Instances"
            }
        );
        assert_eq!(ind.action, IndicatorAction::ConfirmDisconnect(Platform::Aws));

        // A later timer pass with identical ground truth changes nothing.
        let revision = rec.view().revision;
        rec.reconcile(Trigger::Timer).await;
        assert_eq!(rec.view().revision, revision);
    }

    #[tokio::test]
    async fn confirming_pass_can_revert_optimistic_state() {
        let backend = Arc::new(FakeBackend::default());
        backend.serve(json!({ "EC2Instances": [] }));
        let (gw, rec) = gateway(&backend);

        gw.configure(Platform::Aws, &aws()).await.unwrap();
        assert_eq!(rec.view().state(Platform::Aws), Some(ConnectionState::Disconnected));
    }

    #[tokio::test]
    async fn rejected_credentials_force_safe_state() {
        let backend = Arc::new(FakeBackend::default());
        let gate = Arc::new(Notify::new());
        backend.push_gated(Some(Arc::clone(&gate)), json!({ "EC2Instances": [] }));
        backend.fail_actions(CoreError::Auth {
            message: "invalid access key".into(),
        });
        let (gw, rec) = gateway(&backend);
        let gw = Arc::new(gw);

        let task = tokio::spawn({
            let gw = Arc::clone(&gw);
            async move { gw.configure(Platform::Aws, &aws()).await }
        });
        while !rec.is_in_flight() {
            tokio::task::yield_now().await;
        }

        // The failure is shown until the follow-up pass reports ground truth.
        let view = rec.view();
        let ind = view.get(Platform::Aws).unwrap();
        assert_eq!(ind.state, ConnectionState::Disconnected);
        assert_eq!(
            ind.reason,
            Reason::ActionFailed("Rejected by backend: invalid access key".into())
        );

        gate.notify_one();
        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, CoreError::Auth { .. }));

        let view = rec.view();
        let ind = view.get(Platform::Aws).unwrap();
        assert_eq!(ind.state, ConnectionState::Disconnected);
        assert_eq!(ind.reason, Reason::NoData);
        // One pass, triggered by the failure.
        assert_eq!(backend.snapshot_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_credentials_never_reach_backend() {
        let backend = Arc::new(FakeBackend::default());
        backend.serve(json!({}));
        let (gw, _rec) = gateway(&backend);

        let blank = PlatformCredentials::Aws {
            access_key: String::new(),
            secret_key: SecretString::from("x".to_owned()),
        };
        let err = gw.configure(Platform::Aws, &blank).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));

        let err = gw.configure(Platform::Azure, &aws()).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert_eq!(backend.configure_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_azure_cli_suggests_manual_credentials() {
        let backend = Arc::new(FakeBackend::default());
        backend.serve(json!({ "AzureVMs": [] }));
        backend.without_azure_cli();
        let (gw, rec) = gateway(&backend);

        let err = gw
            .configure(Platform::Azure, &PlatformCredentials::AzureCli)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ToolingMissing { .. }));
        assert!(err.to_string().contains("service principal"));
        assert_eq!(backend.configure_calls.load(Ordering::SeqCst), 0);
        assert_eq!(rec.view().state(Platform::Azure), Some(ConnectionState::Disconnected));
    }

    #[tokio::test]
    async fn concurrent_disconnect_is_busy() {
        let backend = Arc::new(FakeBackend::default());
        backend.serve(json!({}));
        let gate = Arc::new(Notify::new());
        backend.gate_actions(Arc::clone(&gate));
        let (gw, _rec) = gateway(&backend);
        let gw = Arc::new(gw);

        let first = tokio::spawn({
            let gw = Arc::clone(&gw);
            async move { gw.disconnect(Platform::Kubernetes).await }
        });
        while gw.pending().pending(Platform::Kubernetes).is_none() {
            tokio::task::yield_now().await;
        }

        let err = gw.disconnect(Platform::Kubernetes).await.unwrap_err();
        assert!(err.is_busy());

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(backend.disconnect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(gw.pending().pending(Platform::Kubernetes), None);
    }

    #[tokio::test]
    async fn disconnect_confirms_with_fresh_pass() {
        let backend = Arc::new(FakeBackend::default());
        backend.push(json!({ "kubernetes": { "pods": [{ "Name": "web" }] } }));
        backend.push(json!({ "kubernetes": { "pods": [] } }));
        let (gw, rec) = gateway(&backend);

        rec.reconcile(Trigger::Startup).await;
        assert_eq!(
            rec.view().state(Platform::Kubernetes),
            Some(ConnectionState::Connected)
        );

        let ack = gw.disconnect(Platform::Kubernetes).await.unwrap();
        assert_eq!(ack.action, ActionKind::Disconnect);
        assert_eq!(
            rec.view().state(Platform::Kubernetes),
            Some(ConnectionState::Disconnected)
        );
    }
}
