// ── Inventory views ──
//
// Typed, read-only views over the bulk snapshot. Every list is decoded
// leniently: a missing category is an empty list and an item that does
// not match its row shape is skipped rather than failing the whole view.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::Snapshot;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeRow {
    pub name: String,
    pub roles: String,
    pub age: String,
    pub version: String,
    #[serde(rename = "OSImage")]
    pub os_image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PodRow {
    pub name: String,
    pub namespace: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeploymentRow {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StatefulSetRow {
    pub name: String,
    pub namespace: String,
    pub ready_replicas: i32,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceRow {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "Type")]
    pub service_type: String,
    #[serde(rename = "ClusterIP")]
    pub cluster_ip: String,
    pub ports: String,
}

/// Kubernetes cluster inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KubernetesInventory {
    pub nodes: Vec<NodeRow>,
    pub namespaces: Vec<String>,
    pub pods: Vec<PodRow>,
    pub deployments: Vec<DeploymentRow>,
    pub stateful_sets: Vec<StatefulSetRow>,
    pub services: Vec<ServiceRow>,
    pub persistent_volumes: Vec<String>,
    pub persistent_volume_claims: Vec<String>,
    pub storage_classes: Vec<String>,
    pub volume_snapshot_classes: Vec<String>,
}

impl KubernetesInventory {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        // Nested under `kubernetes` when relayed by the dashboard backend,
        // flat at the top level when served by the collector directly.
        let nested = snapshot
            .categories()
            .get("kubernetes")
            .and_then(Value::as_object);
        let top = snapshot.categories();
        let field = |camel: &str, pascal: &str| section(nested, top, camel, pascal);

        Self {
            nodes: rows(field("nodes", "Nodes")),
            namespaces: rows(field("namespaces", "Namespaces")),
            pods: rows(field("pods", "Pods")),
            deployments: rows(field("deployments", "Deployments")),
            stateful_sets: rows(field("statefulSets", "StatefulSets")),
            services: rows(field("services", "Services")),
            persistent_volumes: rows(field("persistentVolumes", "PersistentVolumes")),
            persistent_volume_claims: rows(field(
                "persistentVolumeClaims",
                "PersistentVolumeClaims",
            )),
            storage_classes: rows(field("storageClasses", "StorageClasses")),
            volume_snapshot_classes: rows(field(
                "volumeSnapshotClasses",
                "VolumeSnapshotClasses",
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.pods.is_empty() && self.namespaces.is_empty()
    }
}

/// Full inventory across every platform.
///
/// Cloud and backup categories have no fixed row shape, so they are kept
/// as raw objects for the presentation layer to pick fields from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub kubernetes: KubernetesInventory,
    pub ec2_instances: Vec<Map<String, Value>>,
    pub s3_buckets: Vec<Map<String, Value>>,
    pub azure_vms: Vec<Map<String, Value>>,
    pub azure_storage_accounts: Vec<Map<String, Value>>,
    pub backup_jobs: Vec<Map<String, Value>>,
    pub server_info: Option<Map<String, Value>>,
}

impl Inventory {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let top = snapshot.categories();
        Self {
            kubernetes: KubernetesInventory::from_snapshot(snapshot),
            ec2_instances: rows(top.get("EC2Instances")),
            s3_buckets: rows(top.get("S3Buckets")),
            azure_vms: rows(top.get("AzureVMs")),
            azure_storage_accounts: rows(top.get("AzureStorageAccounts")),
            backup_jobs: rows(top.get("BackupJobs")),
            server_info: top.get("ServerInfo").and_then(Value::as_object).cloned(),
        }
    }
}

fn section<'a>(
    nested: Option<&'a Map<String, Value>>,
    top: &'a Map<String, Value>,
    camel: &str,
    pascal: &str,
) -> Option<&'a Value> {
    nested
        .and_then(|k| k.get(camel).or_else(|| k.get(pascal)))
        .or_else(|| top.get(pascal))
}

fn rows<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(row) => Some(row),
            Err(e) => {
                debug!(error = %e, "skipping inventory item with unexpected shape");
                None
            }
        })
        .collect()
}
