// ── Connection states ──
//
// A resolution is the pure output of one pass for one platform: the
// state plus the reason it was chosen. Reasons are data, not log lines,
// so the CLI can show them and tests can assert on them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::model::{ActionKind, FetchFailure, Platform};

/// Connection state of a single platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    NotConfigured,
    /// Before the first reconciliation pass.
    Unknown,
}

impl ConnectionState {
    /// The visual class an indicator in this state carries.
    pub fn class(self) -> StateClass {
        match self {
            Self::Connected => StateClass::Connected,
            Self::Disconnected => StateClass::Disconnected,
            Self::NotConfigured | Self::Unknown => StateClass::NotConfigured,
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Mutually exclusive visual classes of an indicator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StateClass {
    Connected,
    Disconnected,
    NotConfigured,
}

impl StateClass {
    pub const ALL: [StateClass; 3] = [
        StateClass::Connected,
        StateClass::Disconnected,
        StateClass::NotConfigured,
    ];
}

/// Why a platform ended up in its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// No pass has completed yet.
    Pending,
    /// A presence term was satisfied by this category.
    Present { category: &'static str },
    /// The platform's categories exist but are all empty.
    NoData,
    /// None of the platform's categories exist in the snapshot.
    NoCategories,
    /// A category exists but has the wrong shape.
    Malformed { category: &'static str },
    /// Per-platform status flags as reported.
    StatusFlags { is_connected: bool, has_data: bool },
    /// The per-platform status request failed.
    FetchFailed(FetchFailure),
    /// The bulk snapshot could not be fetched at all.
    SnapshotUnavailable(FetchFailure),
    /// The pass produced no report for this platform.
    NoReport,
    /// Set by a successful action ahead of confirmation.
    Optimistic(ActionKind),
    /// Set when an action failed; the message is the surfaced error.
    ActionFailed(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Present { category } => write!(f, "{category} present"),
            Self::NoData => f.write_str("no-data"),
            Self::NoCategories => f.write_str("not-configured"),
            Self::Malformed { category } => write!(f, "malformed {category}"),
            Self::StatusFlags {
                is_connected,
                has_data,
            } => write!(f, "isConnected={is_connected} hasData={has_data}"),
            Self::FetchFailed(failure) => write!(f, "fetch-failed ({failure})"),
            Self::SnapshotUnavailable(failure) => write!(f, "snapshot-unavailable ({failure})"),
            Self::NoReport => f.write_str("no-report"),
            Self::Optimistic(kind) => write!(f, "awaiting confirmation of {kind}"),
            Self::ActionFailed(message) => write!(f, "action-failed ({message})"),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// State plus reason for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub state: ConnectionState,
    pub reason: Reason,
}

impl Resolution {
    pub fn new(state: ConnectionState, reason: Reason) -> Self {
        Self { state, reason }
    }

    pub fn connected(reason: Reason) -> Self {
        Self::new(ConnectionState::Connected, reason)
    }

    pub fn disconnected(reason: Reason) -> Self {
        Self::new(ConnectionState::Disconnected, reason)
    }
}

/// Resolved state of every platform after one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StateMap(BTreeMap<Platform, Resolution>);

impl StateMap {
    pub fn get(&self, platform: Platform) -> Option<&Resolution> {
        self.0.get(&platform)
    }

    pub fn state(&self, platform: Platform) -> Option<ConnectionState> {
        self.0.get(&platform).map(|r| r.state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Platform, &Resolution)> {
        self.0.iter().map(|(p, r)| (*p, r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Platform, Resolution)> for StateMap {
    fn from_iter<I: IntoIterator<Item = (Platform, Resolution)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_renders_as_not_configured() {
        assert_eq!(ConnectionState::Unknown.class(), StateClass::NotConfigured);
        assert_eq!(ConnectionState::Connected.class(), StateClass::Connected);
        assert_eq!(StateClass::NotConfigured.to_string(), "not-configured");
    }

    #[test]
    fn reasons_render_for_humans() {
        assert_eq!(
            Reason::Present {
                category: "EC2Instances"
            }
            .to_string(),
            "EC2Instances present"
        );
        assert_eq!(Reason::NoData.to_string(), "no-data");
        assert_eq!(
            Reason::Optimistic(ActionKind::Configure).to_string(),
            "awaiting confirmation of configure"
        );
    }
}
