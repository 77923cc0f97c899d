/// Host state of a top-level container, as tracked by [`ActivityDelegate`](super::ActivityDelegate).
///
/// Variants are declared in lifecycle order, so `Ord` follows:
/// `Destroyed < Finished < InstanceStateSaved < Initialized < Created < Started < Resumed`.
///
/// `Finished` is terminal-pending: the host may still deliver teardown calls,
/// and `destroy()` moves it on to `Destroyed`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ActivityState {
    Destroyed,
    Finished,
    InstanceStateSaved,
    Initialized,
    Created,
    Started,
    Resumed,
}

/// Internal, compact IDs used for error payloads.
impl ActivityState {
    pub const fn id(self) -> u8 {
        match self {
            ActivityState::Destroyed => 0,
            ActivityState::Finished => 1,
            ActivityState::InstanceStateSaved => 2,
            ActivityState::Initialized => 3,
            ActivityState::Created => 4,
            ActivityState::Started => 5,
            ActivityState::Resumed => 6,
        }
    }

    /// True once no further controller callback may fire.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ActivityState::Destroyed | ActivityState::Finished)
    }

    /// Stable, human-readable label for logs and host adapters.
    pub const fn label(self) -> &'static str {
        match self {
            ActivityState::Destroyed => "Destroyed",
            ActivityState::Finished => "Finished",
            ActivityState::InstanceStateSaved => "InstanceStateSaved",
            ActivityState::Initialized => "Initialized",
            ActivityState::Created => "Created",
            ActivityState::Started => "Started",
            ActivityState::Resumed => "Resumed",
        }
    }
}

/// Canonical list of all top-level states, in lifecycle order.
pub const ALL_ACTIVITY_STATES: [ActivityState; 7] = [
    ActivityState::Destroyed,
    ActivityState::Finished,
    ActivityState::InstanceStateSaved,
    ActivityState::Initialized,
    ActivityState::Created,
    ActivityState::Started,
    ActivityState::Resumed,
];

/// Host state of an embeddable sub-container, as tracked by
/// [`FragmentDelegate`](super::FragmentDelegate).
///
/// Declared in lifecycle order:
/// `Destroyed < InstanceStateSaved < Stopped < Initialized < Attached < Created
/// < ContentReady < Started < Resumed`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FragmentState {
    Destroyed,
    InstanceStateSaved,
    Stopped,
    Initialized,
    Attached,
    Created,
    ContentReady,
    Started,
    Resumed,
}

impl FragmentState {
    pub const fn id(self) -> u8 {
        match self {
            FragmentState::Destroyed => 0,
            FragmentState::InstanceStateSaved => 1,
            FragmentState::Stopped => 2,
            FragmentState::Initialized => 3,
            FragmentState::Attached => 4,
            FragmentState::Created => 5,
            FragmentState::ContentReady => 6,
            FragmentState::Started => 7,
            FragmentState::Resumed => 8,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FragmentState::Destroyed => "Destroyed",
            FragmentState::InstanceStateSaved => "InstanceStateSaved",
            FragmentState::Stopped => "Stopped",
            FragmentState::Initialized => "Initialized",
            FragmentState::Attached => "Attached",
            FragmentState::Created => "Created",
            FragmentState::ContentReady => "ContentReady",
            FragmentState::Started => "Started",
            FragmentState::Resumed => "Resumed",
        }
    }
}

/// Canonical list of all sub-container states, in lifecycle order.
pub const ALL_FRAGMENT_STATES: [FragmentState; 9] = [
    FragmentState::Destroyed,
    FragmentState::InstanceStateSaved,
    FragmentState::Stopped,
    FragmentState::Initialized,
    FragmentState::Attached,
    FragmentState::Created,
    FragmentState::ContentReady,
    FragmentState::Started,
    FragmentState::Resumed,
];

/// Thresholds observers can query through `is_state_at_least`.
///
/// `Started < Resumed < Focused`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ControllerState {
    Started,
    Resumed,
    Focused,
}

impl ControllerState {
    pub const fn label(self) -> &'static str {
        match self {
            ControllerState::Started => "Started",
            ControllerState::Resumed => "Resumed",
            ControllerState::Focused => "Focused",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_states_are_ordered_and_uniquely_identified() {
        for pair in ALL_ACTIVITY_STATES.windows(2) {
            assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
            assert!(pair[0].id() < pair[1].id());
        }
        assert!(ActivityState::Finished.is_terminal());
        assert!(!ActivityState::InstanceStateSaved.is_terminal());
    }

    #[test]
    fn fragment_states_are_ordered_and_uniquely_identified() {
        for pair in ALL_FRAGMENT_STATES.windows(2) {
            assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
            assert!(pair[0].id() < pair[1].id());
        }
        assert_eq!(FragmentState::ContentReady.label(), "ContentReady");
    }

    #[test]
    fn thresholds_are_ordered() {
        assert!(ControllerState::Started < ControllerState::Resumed);
        assert!(ControllerState::Resumed < ControllerState::Focused);
    }
}
