// ── Pending action guard ──
//
// At most one configure/disconnect per platform at a time. The entry is
// claimed atomically through the map's entry API and released when the
// guard drops, including when the action future is cancelled.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::CoreError;
use crate::model::{ActionKind, Platform};

#[derive(Debug, Default)]
pub struct PendingActions {
    inflight: DashMap<Platform, ActionKind>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the platform for `kind`, or fail with `Busy` naming the
    /// action already running.
    pub fn begin(
        &self,
        platform: Platform,
        kind: ActionKind,
    ) -> Result<PendingGuard<'_>, CoreError> {
        match self.inflight.entry(platform) {
            Entry::Occupied(existing) => Err(CoreError::Busy {
                platform,
                pending: *existing.get(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(kind);
                Ok(PendingGuard {
                    owner: self,
                    platform,
                })
            }
        }
    }

    pub fn pending(&self, platform: Platform) -> Option<ActionKind> {
        self.inflight.get(&platform).map(|kind| *kind)
    }
}

/// Releases the platform when dropped.
#[derive(Debug)]
pub struct PendingGuard<'a> {
    owner: &'a PendingActions,
    platform: Platform,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.owner.inflight.remove(&self.platform);
    }
}
