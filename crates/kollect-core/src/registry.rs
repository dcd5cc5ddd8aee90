// ── Platform registry ──
//
// Presence rules as data. Each platform lists the snapshot categories that
// prove it is connected; adding a platform or a category means adding a
// row here, not another branch in the resolver.

use serde_json::Value;

use crate::model::{Platform, Reason, Snapshot};

/// How a single category is tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceCheck {
    /// The value is an array with at least one element.
    NonEmptyList,
    /// The value is an object.
    PresentObject,
}

/// One category that can prove a platform is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceTerm {
    /// Label used in reasons and logs.
    pub label: &'static str,
    /// Path into the snapshot; the first segment is the top-level category.
    pub path: &'static [&'static str],
    pub check: PresenceCheck,
}

/// A registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformEntry {
    pub platform: Platform,
    /// OR-combined terms; any satisfied term means present.
    pub presence: &'static [PresenceTerm],
}

const fn list(label: &'static str, path: &'static [&'static str]) -> PresenceTerm {
    PresenceTerm {
        label,
        path,
        check: PresenceCheck::NonEmptyList,
    }
}

const fn object(label: &'static str, path: &'static [&'static str]) -> PresenceTerm {
    PresenceTerm {
        label,
        path,
        check: PresenceCheck::PresentObject,
    }
}

/// The registry. One row per [`Platform`], in [`Platform::ALL`] order.
pub static REGISTRY: [PlatformEntry; 4] = [
    PlatformEntry {
        platform: Platform::Aws,
        presence: &[
            list("EC2Instances", &["EC2Instances"]),
            list("S3Buckets", &["S3Buckets"]),
        ],
    },
    PlatformEntry {
        platform: Platform::Azure,
        presence: &[
            list("AzureVMs", &["AzureVMs"]),
            list("AzureStorageAccounts", &["AzureStorageAccounts"]),
        ],
    },
    PlatformEntry {
        platform: Platform::Kubernetes,
        presence: &[
            list("kubernetes.pods", &["kubernetes", "pods"]),
            list("kubernetes.nodes", &["kubernetes", "nodes"]),
        ],
    },
    PlatformEntry {
        platform: Platform::Veeam,
        presence: &[
            object("ServerInfo", &["ServerInfo"]),
            list("BackupJobs", &["BackupJobs"]),
        ],
    },
];

pub fn entry(platform: Platform) -> &'static PlatformEntry {
    match platform {
        Platform::Aws => &REGISTRY[0],
        Platform::Azure => &REGISTRY[1],
        Platform::Kubernetes => &REGISTRY[2],
        Platform::Veeam => &REGISTRY[3],
    }
}

/// Outcome of testing one term against a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermOutcome {
    Satisfied,
    /// Category exists but holds nothing (empty list, null, missing child).
    Empty,
    /// Top-level category missing entirely.
    Absent,
    /// Category exists with the wrong JSON type.
    Malformed,
}

impl PresenceTerm {
    fn evaluate(&self, snapshot: &Snapshot) -> TermOutcome {
        let Some(top) = self.path.first() else {
            return TermOutcome::Absent;
        };
        if !snapshot.has_category(top) {
            return TermOutcome::Absent;
        }
        let value = match snapshot.lookup(self.path) {
            None | Some(Value::Null) => return TermOutcome::Empty,
            Some(value) => value,
        };
        match (self.check, value) {
            (PresenceCheck::NonEmptyList, Value::Array(items)) => {
                if items.is_empty() {
                    TermOutcome::Empty
                } else {
                    TermOutcome::Satisfied
                }
            }
            (PresenceCheck::PresentObject, Value::Object(_)) => TermOutcome::Satisfied,
            _ => TermOutcome::Malformed,
        }
    }
}

/// Result of evaluating a platform's presence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub present: bool,
    pub reason: Reason,
}

/// Evaluate a platform's presence rule against a snapshot.
///
/// Terms are OR-combined. When nothing is satisfied the reason tells the
/// resolver whether the platform is unconfigured (no categories at all),
/// connected without data, or sending something it cannot read.
pub fn presence_of(platform: Platform, snapshot: &Snapshot) -> Presence {
    let terms = entry(platform).presence;
    let outcomes: Vec<_> = terms.iter().map(|t| (t, t.evaluate(snapshot))).collect();

    if let Some((term, _)) = outcomes
        .iter()
        .find(|(_, o)| *o == TermOutcome::Satisfied)
    {
        return Presence {
            present: true,
            reason: Reason::Present {
                category: term.label,
            },
        };
    }

    let reason = if outcomes.iter().all(|(_, o)| *o == TermOutcome::Absent) {
        Reason::NoCategories
    } else if let Some((term, _)) = outcomes
        .iter()
        .find(|(_, o)| *o == TermOutcome::Malformed)
    {
        Reason::Malformed {
            category: term.label,
        }
    } else {
        Reason::NoData
    };

    Presence {
        present: false,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot(value: Value) -> Snapshot {
        Snapshot::from_value(value).expect("object snapshot")
    }

    #[test]
    fn registry_rows_follow_platform_order() {
        for (row, platform) in REGISTRY.iter().zip(Platform::ALL) {
            assert_eq!(row.platform, platform);
            assert_eq!(entry(platform).platform, platform);
            assert!(!row.presence.is_empty());
        }
    }

    #[test]
    fn any_satisfied_term_is_enough() {
        let snap = snapshot(json!({ "EC2Instances": [], "S3Buckets": [{ "Name": "logs" }] }));
        let presence = presence_of(Platform::Aws, &snap);
        assert!(presence.present);
        assert_eq!(
            presence.reason,
            Reason::Present {
                category: "S3Buckets"
            }
        );
    }

    #[test]
    fn empty_categories_mean_no_data() {
        let snap = snapshot(json!({ "EC2Instances": [], "S3Buckets": null }));
        let presence = presence_of(Platform::Aws, &snap);
        assert!(!presence.present);
        assert_eq!(presence.reason, Reason::NoData);
    }

    #[test]
    fn missing_categories_mean_not_configured() {
        let snap = snapshot(json!({ "AzureVMs": [{ "name": "vm1" }] }));
        assert_eq!(presence_of(Platform::Aws, &snap).reason, Reason::NoCategories);
        assert!(presence_of(Platform::Azure, &snap).present);
    }

    #[test]
    fn kubernetes_reads_nested_categories() {
        let snap = snapshot(json!({ "kubernetes": { "pods": [], "nodes": [{ "Name": "n1" }] } }));
        assert!(presence_of(Platform::Kubernetes, &snap).present);

        let snap = snapshot(json!({ "kubernetes": {} }));
        assert_eq!(
            presence_of(Platform::Kubernetes, &snap).reason,
            Reason::NoData
        );
    }

    #[test]
    fn veeam_server_info_must_be_an_object() {
        let snap = snapshot(json!({ "ServerInfo": { "name": "vbr01" } }));
        assert!(presence_of(Platform::Veeam, &snap).present);

        let snap = snapshot(json!({ "ServerInfo": "vbr01", "BackupJobs": [] }));
        assert_eq!(
            presence_of(Platform::Veeam, &snap).reason,
            Reason::Malformed {
                category: "ServerInfo"
            }
        );
    }

    #[test]
    fn wrong_type_is_contained_to_its_platform() {
        let snap = snapshot(json!({
            "EC2Instances": "oops",
            "AzureVMs": [{ "name": "vm1" }]
        }));
        assert!(!presence_of(Platform::Aws, &snap).present);
        assert!(presence_of(Platform::Azure, &snap).present);
    }
}
