// ── Indicator board ──
//
// One indicator per platform: visual class, click action and reason.
// The board is the only writer of indicator state. It publishes an
// immutable view through a `watch` channel, and only when something
// actually changed, so subscribers never see a same-state repaint.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::model::{ConnectionState, Platform, Reason, Resolution, StateClass, StateMap};

/// What clicking an indicator does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "platform", rename_all = "kebab-case")]
pub enum IndicatorAction {
    /// Open the configuration form for the platform.
    OpenConfiguration(Platform),
    /// Ask the user to confirm a disconnect.
    ConfirmDisconnect(Platform),
}

impl IndicatorAction {
    /// Connected platforms offer disconnect; everything else offers setup.
    pub fn for_state(platform: Platform, state: ConnectionState) -> Self {
        if state.is_connected() {
            Self::ConfirmDisconnect(platform)
        } else {
            Self::OpenConfiguration(platform)
        }
    }

    pub fn platform(self) -> Platform {
        match self {
            Self::OpenConfiguration(p) | Self::ConfirmDisconnect(p) => p,
        }
    }
}

/// Visual class set of one indicator.
///
/// Modelled as a set so that replacing a class is always clear-all-then-set:
/// no code path can leave two state classes on the same indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassList(BTreeSet<StateClass>);

impl ClassList {
    pub fn of(class: StateClass) -> Self {
        Self(BTreeSet::from([class]))
    }

    fn replace_with(&mut self, class: StateClass) {
        for existing in StateClass::ALL {
            self.0.remove(&existing);
        }
        self.0.insert(class);
    }

    pub fn contains(&self, class: StateClass) -> bool {
        self.0.contains(&class)
    }

    /// The single class currently set.
    pub fn current(&self) -> Option<StateClass> {
        self.0.iter().next().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Displayed state of one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub platform: Platform,
    pub state: ConnectionState,
    pub classes: ClassList,
    pub action: IndicatorAction,
    pub reason: Reason,
    pub changed_at: DateTime<Utc>,
}

impl Indicator {
    fn initial(platform: Platform) -> Self {
        let state = ConnectionState::Unknown;
        Self {
            platform,
            state,
            classes: ClassList::of(state.class()),
            action: IndicatorAction::for_state(platform, state),
            reason: Reason::Pending,
            changed_at: Utc::now(),
        }
    }

    pub fn class(&self) -> Option<StateClass> {
        self.classes.current()
    }
}

/// Result of applying one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Same state and reason as before; nothing was touched.
    Unchanged,
    /// Same state, new reason. Class and action are left alone.
    ReasonChanged,
    Changed {
        from: ConnectionState,
        to: ConnectionState,
    },
}

impl Applied {
    /// The state itself moved.
    pub fn is_changed(self) -> bool {
        matches!(self, Self::Changed { .. })
    }

    /// Anything subscribers can see moved.
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Immutable view of the whole board, as published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// Bumped once per published change set.
    pub revision: u64,
    pub indicators: BTreeMap<Platform, Indicator>,
}

impl BoardView {
    pub fn get(&self, platform: Platform) -> Option<&Indicator> {
        self.indicators.get(&platform)
    }

    pub fn state(&self, platform: Platform) -> Option<ConnectionState> {
        self.indicators.get(&platform).map(|i| i.state)
    }
}

/// The single writer of indicator state.
pub(crate) struct IndicatorBoard {
    view: BoardView,
    tx: watch::Sender<Arc<BoardView>>,
}

impl IndicatorBoard {
    pub(crate) fn new() -> Self {
        let view = BoardView {
            revision: 0,
            indicators: Platform::ALL
                .iter()
                .map(|&p| (p, Indicator::initial(p)))
                .collect(),
        };
        let (tx, _) = watch::channel(Arc::new(view.clone()));
        Self { view, tx }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<BoardView>> {
        self.tx.subscribe()
    }

    pub(crate) fn view(&self) -> Arc<BoardView> {
        self.tx.borrow().clone()
    }

    /// Apply one resolution and publish if anything visible changed.
    pub(crate) fn apply(&mut self, platform: Platform, resolution: &Resolution) -> Applied {
        let applied = self.apply_quiet(platform, resolution);
        if applied.is_visible() {
            self.publish();
        }
        applied
    }

    /// Apply a full pass result, publishing at most once. Returns the
    /// platforms whose state moved; reason-only updates publish but are
    /// not listed.
    pub(crate) fn apply_all(&mut self, states: &StateMap) -> Vec<Platform> {
        let mut changed = Vec::new();
        let mut visible = false;
        for (platform, resolution) in states.iter() {
            let applied = self.apply_quiet(platform, resolution);
            visible |= applied.is_visible();
            if applied.is_changed() {
                changed.push(platform);
            }
        }
        if visible {
            self.publish();
        }
        changed
    }

    fn apply_quiet(&mut self, platform: Platform, resolution: &Resolution) -> Applied {
        let indicator = self
            .view
            .indicators
            .entry(platform)
            .or_insert_with(|| Indicator::initial(platform));

        let from = indicator.state;
        let to = resolution.state;
        if from == to {
            if indicator.reason == resolution.reason {
                return Applied::Unchanged;
            }
            debug!(%platform, state = %to, reason = %resolution.reason, "indicator reason updated");
            indicator.reason = resolution.reason.clone();
            return Applied::ReasonChanged;
        }

        indicator.state = to;
        indicator.classes.replace_with(to.class());
        indicator.action = IndicatorAction::for_state(platform, to);
        indicator.reason = resolution.reason.clone();
        indicator.changed_at = Utc::now();
        debug!(%platform, %from, %to, reason = %resolution.reason, "indicator changed");
        Applied::Changed { from, to }
    }

    fn publish(&mut self) {
        self.view.revision += 1;
        self.tx.send_replace(Arc::new(self.view.clone()));
    }
}
