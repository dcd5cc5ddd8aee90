use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// An integrated infrastructure platform.
///
/// The lowercase form (`aws`, `azure`, ...) is the path segment used by
/// every backend endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    Aws,
    Azure,
    Kubernetes,
    Veeam,
}

impl Platform {
    /// Every platform, in display order.
    pub const ALL: [Platform; 4] = [
        Platform::Aws,
        Platform::Azure,
        Platform::Kubernetes,
        Platform::Veeam,
    ];

    /// Backend path segment.
    pub fn slug(self) -> &'static str {
        self.into()
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Aws => "AWS",
            Self::Azure => "Azure",
            Self::Kubernetes => "Kubernetes",
            Self::Veeam => "Veeam",
        }
    }
}

/// The kind of user-initiated action routed through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActionKind {
    Configure,
    Disconnect,
}
