//! Connection-state reconciliation and action binding for the kollect
//! dashboard.
//!
//! - **[`Dashboard`]**: Facade owning the lifecycle:
//!   [`start()`](Dashboard::start) runs a startup pass and spawns the timer
//!   loop, [`Dashboard::oneshot()`] runs a single pass for CLI invocations.
//!
//! - **[`Reconciler`]**: Fetches a fresh snapshot per pass, resolves it,
//!   and applies the result to the indicator board. Passes are numbered;
//!   stale results are discarded and timer passes coalesce.
//!
//! - **[`registry`] / [`resolver`]**: Presence rules as data, and the pure
//!   snapshot-to-state mapping built on them.
//!
//! - **[`ActionGateway`]**: Configure/disconnect routing with a
//!   per-platform pending guard, optimistic updates and safe-state
//!   fallback on failure.
//!
//! - **[`BoardView`]**: Immutable indicator state published through a
//!   `tokio::sync::watch` channel, only when something changed.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod indicator;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod fake;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use config::{DashboardConfig, SnapshotMode, TlsVerification};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use gateway::{Ack, ActionGateway, KubeconfigSource, PendingActions, PlatformCredentials};
pub use indicator::{Applied, BoardView, ClassList, Indicator, IndicatorAction};
pub use kollect_api::ChatReply;
pub use reconcile::{PassOutcome, Reconciler, Trigger};
pub use resolver::resolve;

pub use model::{
    ActionKind, ConnectionState, FailureKind, FetchFailure, Inventory, KubernetesInventory,
    Platform, Reason, Resolution, Snapshot, SnapshotSource, StateClass, StateMap, StatusReport,
};
