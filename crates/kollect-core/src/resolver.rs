// ── State resolution ──
//
// Pure mapping from what a pass fetched to a state per platform. No I/O,
// no clock, no shared state: the same source always resolves to the same
// map, which is what makes repeated passes flicker-free.

use crate::model::{
    ConnectionState, Platform, Reason, Resolution, SnapshotSource, StateMap, StatusReport,
};
use crate::registry::presence_of;

/// Resolve every platform in [`Platform::ALL`].
pub fn resolve(source: &SnapshotSource) -> StateMap {
    Platform::ALL
        .iter()
        .map(|&platform| (platform, resolve_one(platform, source)))
        .collect()
}

fn resolve_one(platform: Platform, source: &SnapshotSource) -> Resolution {
    match source {
        SnapshotSource::Bulk(snapshot) => {
            let presence = presence_of(platform, snapshot);
            let state = if presence.present {
                ConnectionState::Connected
            } else if presence.reason == Reason::NoCategories {
                ConnectionState::NotConfigured
            } else {
                ConnectionState::Disconnected
            };
            Resolution::new(state, presence.reason)
        }
        SnapshotSource::Unavailable(failure) => {
            Resolution::disconnected(Reason::SnapshotUnavailable(failure.clone()))
        }
        SnapshotSource::PerPlatform(reports) => match reports.get(&platform) {
            Some(Ok(report)) => from_status(*report),
            Some(Err(failure)) => Resolution::disconnected(Reason::FetchFailed(failure.clone())),
            None => Resolution::disconnected(Reason::NoReport),
        },
    }
}

/// Connected only when the backend reports both a live session and data.
fn from_status(report: StatusReport) -> Resolution {
    let reason = Reason::StatusFlags {
        is_connected: report.is_connected,
        has_data: report.has_data,
    };
    if report.is_connected && report.has_data {
        Resolution::connected(reason)
    } else {
        Resolution::disconnected(reason)
    }
}
