// ── Backend snapshots ──
//
// A snapshot is the raw view of backend state taken at one instant.
// It is never mutated after construction; every reconciliation pass
// works from a fresh one.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::model::Platform;

/// Bulk inventory payload: category name -> category value.
#[derive(Debug, Clone)]
pub struct Snapshot {
    categories: Arc<Map<String, Value>>,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(categories: Map<String, Value>) -> Self {
        Self {
            categories: Arc::new(categories),
            fetched_at: Utc::now(),
        }
    }

    /// Build from an arbitrary JSON value. Anything other than an object
    /// is a parse error.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(CoreError::Parse {
                message: format!("expected inventory object, got {}", type_name(&other)),
            }),
        }
    }

    /// Look up a nested category by path. `["kubernetes", "pods"]` reads
    /// `categories.kubernetes.pods`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.categories.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }

    /// Whether the top-level category exists at all.
    pub fn has_category(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    pub fn categories(&self) -> &Map<String, Value> {
        &self.categories
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.categories == other.categories
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Per-platform status flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub is_connected: bool,
    pub has_data: bool,
}

impl From<kollect_api::PlatformStatusResponse> for StatusReport {
    fn from(resp: kollect_api::PlatformStatusResponse) -> Self {
        Self {
            is_connected: resp.is_connected,
            has_data: resp.has_data,
        }
    }
}

/// Why a fetch did not produce data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    Unreachable,
    Timeout,
    Malformed,
}

/// A contained fetch failure, carried into resolution as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl FetchFailure {
    pub fn timeout(after: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            detail: format!("no answer within {}s", after.as_secs()),
        }
    }
}

impl From<&CoreError> for FetchFailure {
    fn from(err: &CoreError) -> Self {
        let kind = match err {
            CoreError::Parse { .. } => FailureKind::Malformed,
            _ => FailureKind::Unreachable,
        };
        Self {
            kind,
            detail: err.to_string(),
        }
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// Everything a single reconciliation pass fetched, in one of the two
/// supported shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotSource {
    /// One bulk inventory snapshot covering every platform.
    Bulk(Snapshot),
    /// The bulk fetch itself failed.
    Unavailable(FetchFailure),
    /// One status report per platform, fetched independently.
    PerPlatform(BTreeMap<Platform, Result<StatusReport, FetchFailure>>),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> Snapshot {
        Snapshot::from_value(value).expect("object snapshot")
    }

    #[test]
    fn nested_lookup_follows_objects() {
        let snap = snapshot(json!({ "kubernetes": { "pods": [1, 2] } }));
        assert_eq!(snap.lookup(&["kubernetes", "pods"]), Some(&json!([1, 2])));
        assert_eq!(snap.lookup(&["kubernetes", "nodes"]), None);
        assert_eq!(snap.lookup(&["aws"]), None);
        assert_eq!(snap.lookup(&[]), None);
    }

    #[test]
    fn lookup_stops_at_non_objects() {
        let snap = snapshot(json!({ "kubernetes": "offline" }));
        assert_eq!(snap.lookup(&["kubernetes", "pods"]), None);
        assert!(snap.has_category("kubernetes"));
    }

    #[test]
    fn non_object_payload_is_a_parse_error() {
        let err = Snapshot::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn failure_kind_follows_error() {
        let parse = CoreError::Parse {
            message: "x".into(),
        };
        assert_eq!(FetchFailure::from(&parse).kind, FailureKind::Malformed);

        let fetch = CoreError::Fetch {
            message: "refused".into(),
        };
        assert_eq!(FetchFailure::from(&fetch).kind, FailureKind::Unreachable);
        assert_eq!(
            FetchFailure::timeout(Duration::from_secs(10)).to_string(),
            "timeout: no answer within 10s"
        );
    }
}
