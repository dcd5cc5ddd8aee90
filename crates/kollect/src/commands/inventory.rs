//! Inventory browsing handlers.

use serde::Serialize;
use serde_json::{Map, Value};
use tabled::Tabled;

use kollect_core::Dashboard;
use kollect_core::Inventory;
use kollect_core::model::inventory::{
    DeploymentRow, NodeRow, PodRow, ServiceRow, StatefulSetRow,
};

use crate::cli::{Category, GlobalOpts, InventoryArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Serialize, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Platform")]
    platform: &'static str,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Items")]
    items: usize,
}

#[derive(Tabled)]
struct NameRow {
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct NodeTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Roles")]
    roles: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "OS Image")]
    os_image: String,
}

impl From<&NodeRow> for NodeTableRow {
    fn from(n: &NodeRow) -> Self {
        Self {
            name: n.name.clone(),
            roles: n.roles.clone(),
            age: n.age.clone(),
            version: n.version.clone(),
            os_image: n.os_image.clone(),
        }
    }
}

#[derive(Tabled)]
struct PodTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&PodRow> for PodTableRow {
    fn from(p: &PodRow) -> Self {
        Self {
            name: p.name.clone(),
            namespace: p.namespace.clone(),
            status: p.status.clone(),
        }
    }
}

#[derive(Tabled)]
struct DeploymentTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Containers")]
    containers: String,
    #[tabled(rename = "Images")]
    images: String,
}

impl From<&DeploymentRow> for DeploymentTableRow {
    fn from(d: &DeploymentRow) -> Self {
        Self {
            name: d.name.clone(),
            namespace: d.namespace.clone(),
            containers: d.containers.join(", "),
            images: d.images.join(", "),
        }
    }
}

#[derive(Tabled)]
struct StatefulSetTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Ready")]
    ready: i32,
    #[tabled(rename = "Image")]
    image: String,
}

impl From<&StatefulSetRow> for StatefulSetTableRow {
    fn from(s: &StatefulSetRow) -> Self {
        Self {
            name: s.name.clone(),
            namespace: s.namespace.clone(),
            ready: s.ready_replicas,
            image: s.image.clone(),
        }
    }
}

#[derive(Tabled)]
struct ServiceTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Type")]
    service_type: String,
    #[tabled(rename = "Cluster IP")]
    cluster_ip: String,
    #[tabled(rename = "Ports")]
    ports: String,
}

impl From<&ServiceRow> for ServiceTableRow {
    fn from(s: &ServiceRow) -> Self {
        Self {
            name: s.name.clone(),
            namespace: s.namespace.clone(),
            service_type: s.service_type.clone(),
            cluster_ip: s.cluster_ip.clone(),
            ports: s.ports.clone(),
        }
    }
}

/// Cloud and backup items have no fixed shape; show a name and the
/// remaining scalar fields.
#[derive(Tabled)]
struct RawRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

const NAME_KEYS: [&str; 6] = ["Name", "name", "InstanceId", "InstanceID", "Id", "id"];

fn raw_name(item: &Map<String, Value>) -> String {
    NAME_KEYS
        .iter()
        .find_map(|k| item.get(*k).and_then(Value::as_str))
        .unwrap_or("-")
        .to_owned()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<&Map<String, Value>> for RawRow {
    fn from(item: &Map<String, Value>) -> Self {
        let name = raw_name(item);
        let details = item
            .iter()
            .filter(|(k, _)| !NAME_KEYS.contains(&k.as_str()))
            .filter_map(|(k, v)| scalar(v).map(|v| format!("{k}={v}")))
            .collect::<Vec<_>>()
            .join(", ");
        Self { name, details }
    }
}

// ── Summary ─────────────────────────────────────────────────────────

fn summary(inv: &Inventory) -> Vec<SummaryRow> {
    let k = &inv.kubernetes;
    let row = |platform, category, items| SummaryRow {
        platform,
        category,
        items,
    };
    vec![
        row("AWS", "ec2", inv.ec2_instances.len()),
        row("AWS", "s3", inv.s3_buckets.len()),
        row("Azure", "azure-vms", inv.azure_vms.len()),
        row("Azure", "azure-storage", inv.azure_storage_accounts.len()),
        row("Kubernetes", "nodes", k.nodes.len()),
        row("Kubernetes", "namespaces", k.namespaces.len()),
        row("Kubernetes", "pods", k.pods.len()),
        row("Kubernetes", "deployments", k.deployments.len()),
        row("Kubernetes", "stateful-sets", k.stateful_sets.len()),
        row("Kubernetes", "services", k.services.len()),
        row("Kubernetes", "persistent-volumes", k.persistent_volumes.len()),
        row(
            "Kubernetes",
            "persistent-volume-claims",
            k.persistent_volume_claims.len(),
        ),
        row("Kubernetes", "storage-classes", k.storage_classes.len()),
        row(
            "Kubernetes",
            "volume-snapshot-classes",
            k.volume_snapshot_classes.len(),
        ),
        row("Veeam", "backup-jobs", inv.backup_jobs.len()),
        row("Veeam", "server-info", usize::from(inv.server_info.is_some())),
    ]
}

// ── Handler ─────────────────────────────────────────────────────────

fn names(format: &OutputFormat, names: &[String]) -> Result<String, CliError> {
    output::render_list(
        format,
        names,
        |n| NameRow { name: n.clone() },
        String::clone,
    )
}

fn raw(format: &OutputFormat, items: &[Map<String, Value>]) -> Result<String, CliError> {
    output::render_list(format, items, |i| RawRow::from(i), raw_name)
}

fn server_info(format: &OutputFormat, info: &Map<String, Value>) -> Result<String, CliError> {
    output::render_single(
        format,
        info,
        |m| {
            m.iter()
                .map(|(k, v)| format!("{k}: {}", scalar(v).unwrap_or_else(|| v.to_string())))
                .collect::<Vec<_>>()
                .join("\n")
        },
        raw_name,
    )
}

pub fn render(
    inv: &Inventory,
    category: Option<Category>,
    format: &OutputFormat,
) -> Result<String, CliError> {
    let k = &inv.kubernetes;
    match category {
        None => output::render_list(
            format,
            &summary(inv),
            |r| *r,
            |r| format!("{} {}", r.category, r.items),
        ),
        Some(Category::Nodes) => {
            output::render_list(format, &k.nodes, |n| NodeTableRow::from(n), |n| n.name.clone())
        }
        Some(Category::Namespaces) => names(format, &k.namespaces),
        Some(Category::Pods) => {
            output::render_list(format, &k.pods, |p| PodTableRow::from(p), |p| p.name.clone())
        }
        Some(Category::Deployments) => output::render_list(
            format,
            &k.deployments,
            |d| DeploymentTableRow::from(d),
            |d| d.name.clone(),
        ),
        Some(Category::StatefulSets) => output::render_list(
            format,
            &k.stateful_sets,
            |s| StatefulSetTableRow::from(s),
            |s| s.name.clone(),
        ),
        Some(Category::Services) => {
            output::render_list(format, &k.services, |s| ServiceTableRow::from(s), |s| s.name.clone())
        }
        Some(Category::PersistentVolumes) => names(format, &k.persistent_volumes),
        Some(Category::PersistentVolumeClaims) => names(format, &k.persistent_volume_claims),
        Some(Category::StorageClasses) => names(format, &k.storage_classes),
        Some(Category::VolumeSnapshotClasses) => names(format, &k.volume_snapshot_classes),
        Some(Category::Ec2) => raw(format, &inv.ec2_instances),
        Some(Category::S3) => raw(format, &inv.s3_buckets),
        Some(Category::AzureVms) => raw(format, &inv.azure_vms),
        Some(Category::AzureStorage) => raw(format, &inv.azure_storage_accounts),
        Some(Category::BackupJobs) => raw(format, &inv.backup_jobs),
        Some(Category::ServerInfo) => match inv.server_info {
            Some(ref info) => server_info(format, info),
            None => Ok(String::new()),
        },
    }
}

pub async fn handle(
    dashboard: &Dashboard,
    args: InventoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let spinner = util::spinner(global, "Reading inventory...");
    let inventory = dashboard.inventory().await;
    spinner.finish_and_clear();

    let out = render(&inventory?, args.category, &global.output)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
