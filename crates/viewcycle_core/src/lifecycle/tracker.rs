use std::cell::Cell;

use super::state::ControllerState;

/// Answers "is the owner at least in `state`?" for a lifecycle registry.
pub trait LifecycleTracker {
    fn is_controller_state_at_least(&self, state: ControllerState) -> bool;
}

/// Host state, window focus and the level observers have been told about.
///
/// The delegate is the only writer. `level` moves one step right before each
/// registry dispatch: up for start/resume/focus, down for blur/pause/stop. The
/// registry reads it for catch-up and compensation, so an observer joining or
/// leaving mid-dispatch never gets a callback twice or misses one.
#[derive(Debug)]
pub(crate) struct StateCell<S: Copy> {
    state: Cell<S>,
    has_window_focus: Cell<bool>,
    level: Cell<Option<ControllerState>>,
}

impl<S: Copy> StateCell<S> {
    pub(crate) fn new(initial: S) -> Self {
        Self {
            state: Cell::new(initial),
            has_window_focus: Cell::new(false),
            level: Cell::new(None),
        }
    }

    pub(crate) fn get(&self) -> S {
        self.state.get()
    }

    pub(crate) fn set(&self, state: S) {
        self.state.set(state);
    }

    pub(crate) fn has_window_focus(&self) -> bool {
        self.has_window_focus.get()
    }

    pub(crate) fn set_window_focus(&self, has_focus: bool) {
        self.has_window_focus.set(has_focus);
    }

    /// Announce the level the next dispatch moves observers to; `None` is stopped.
    pub(crate) fn announce(&self, level: Option<ControllerState>) {
        self.level.set(level);
    }
}

impl<S: Copy> LifecycleTracker for StateCell<S> {
    fn is_controller_state_at_least(&self, state: ControllerState) -> bool {
        self.level.get().is_some_and(|level| level >= state)
    }
}
