// Scripted in-memory backend shared by unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use kollect_api::ChatReply;
use serde_json::Value;
use tokio::sync::Notify;

use crate::backend::Backend;
use crate::error::CoreError;
use crate::gateway::PlatformCredentials;
use crate::model::{Platform, Snapshot, StatusReport};

type Gated<T> = (Option<Arc<Notify>>, Result<T, CoreError>);

/// Snapshot fetches pop queued responses in order, waiting on a gate when
/// one is queued alongside. Once the queue is empty the fallback snapshot
/// is served. Actions succeed unless an error is set, and block on the
/// action gate when one is installed.
#[derive(Default)]
pub(crate) struct FakeBackend {
    snapshots: Mutex<VecDeque<Gated<Snapshot>>>,
    fallback: Mutex<Option<Snapshot>>,
    statuses: Mutex<HashMap<Platform, Result<StatusReport, CoreError>>>,
    hang_status: Mutex<Option<Platform>>,
    action_error: Mutex<Option<CoreError>>,
    action_gate: Mutex<Option<Arc<Notify>>>,
    azure_cli_missing: AtomicBool,
    chat_reply: Mutex<ChatReply>,
    pub snapshot_calls: AtomicUsize,
    pub configure_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn push(&self, value: Value) {
        self.push_gated(None, value);
    }

    pub fn push_gated(&self, gate: Option<Arc<Notify>>, value: Value) {
        let snap = Snapshot::from_value(value).unwrap();
        self.snapshots.lock().unwrap().push_back((gate, Ok(snap)));
    }

    pub fn push_err(&self, err: CoreError) {
        self.snapshots.lock().unwrap().push_back((None, Err(err)));
    }

    pub fn serve(&self, value: Value) {
        *self.fallback.lock().unwrap() = Some(Snapshot::from_value(value).unwrap());
    }

    pub fn status(&self, platform: Platform, result: Result<StatusReport, CoreError>) {
        self.statuses.lock().unwrap().insert(platform, result);
    }

    pub fn hang_status(&self, platform: Platform) {
        *self.hang_status.lock().unwrap() = Some(platform);
    }

    pub fn fail_actions(&self, err: CoreError) {
        *self.action_error.lock().unwrap() = Some(err);
    }

    pub fn gate_actions(&self, gate: Arc<Notify>) {
        *self.action_gate.lock().unwrap() = Some(gate);
    }

    pub fn without_azure_cli(&self) {
        self.azure_cli_missing.store(true, Ordering::SeqCst);
    }

    pub fn reply(&self, reply: ChatReply) {
        *self.chat_reply.lock().unwrap() = reply;
    }

    async fn action(&self) -> Result<Option<String>, CoreError> {
        let gate = self.action_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let err = self.action_error.lock().unwrap().clone();
        match err {
            Some(err) => Err(err),
            None => Ok(Some("ok".into())),
        }
    }
}

impl Backend for FakeBackend {
    async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.snapshots.lock().unwrap().pop_front();
        let Some((gate, result)) = next else {
            let fallback = self.fallback.lock().unwrap().clone();
            return fallback.ok_or_else(|| CoreError::Fetch {
                message: "script exhausted".into(),
            });
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    async fn fetch_status(&self, platform: Platform) -> Result<StatusReport, CoreError> {
        let hang = *self.hang_status.lock().unwrap() == Some(platform);
        if hang {
            std::future::pending::<()>().await;
        }
        let found = self.statuses.lock().unwrap().get(&platform).cloned();
        found.unwrap_or(Ok(StatusReport::default()))
    }

    async fn configure(&self, _: &PlatformCredentials) -> Result<Option<String>, CoreError> {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        self.action().await
    }

    async fn azure_cli_installed(&self) -> Result<bool, CoreError> {
        Ok(!self.azure_cli_missing.load(Ordering::SeqCst))
    }

    async fn disconnect(&self, _: Platform) -> Result<Option<String>, CoreError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.action().await
    }

    async fn chat(&self, _: &str) -> Result<ChatReply, CoreError> {
        Ok(self.chat_reply.lock().unwrap().clone())
    }
}
