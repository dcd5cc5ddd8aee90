// ── Domain model ──
//
// Platforms, snapshots, resolved states and inventory views. Everything
// here is plain data; behavior lives in the registry, resolver and
// reconciler modules.

pub mod inventory;
pub mod platform;
pub mod snapshot;
pub mod state;

pub use inventory::{
    DeploymentRow, Inventory, KubernetesInventory, NodeRow, PodRow, ServiceRow, StatefulSetRow,
};
pub use platform::{ActionKind, Platform};
pub use snapshot::{FailureKind, FetchFailure, Snapshot, SnapshotSource, StatusReport};
pub use state::{ConnectionState, Reason, Resolution, StateClass, StateMap};
