use serde::{Deserialize, Serialize};

/// Where the widget is in its open/close/minimize cycle. Exactly one holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Closed,
    Open,
    Minimized,
}

/// What a toggle-button click does while the chat is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleBehavior {
    #[default]
    Minimize,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    Open,
    Close,
    Minimize,
    Toggle,
}

impl Lifecycle {
    /// Next state for `event`, or `None` when the event is a no-op here.
    pub fn transition(self, event: WidgetEvent, toggle: ToggleBehavior) -> Option<Lifecycle> {
        use Lifecycle::*;

        match (self, event) {
            (Closed | Minimized, WidgetEvent::Open) => Some(Open),
            (Open | Minimized, WidgetEvent::Close) => Some(Closed),
            (Open, WidgetEvent::Minimize) => Some(Minimized),
            (Closed | Minimized, WidgetEvent::Toggle) => Some(Open),
            (Open, WidgetEvent::Toggle) => match toggle {
                ToggleBehavior::Minimize => Some(Minimized),
                ToggleBehavior::Close => Some(Closed),
            },
            (Open, WidgetEvent::Open)
            | (Closed, WidgetEvent::Close)
            | (Closed | Minimized, WidgetEvent::Minimize) => None,
        }
    }
}

/// Snapshot of the controller flags as host-page code sees them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetState {
    pub is_open: bool,
    pub is_minimized: bool,
    pub is_initialized: bool,
}

impl WidgetState {
    pub fn new(lifecycle: Lifecycle, is_initialized: bool) -> Self {
        Self {
            is_open: lifecycle == Lifecycle::Open,
            is_minimized: lifecycle == Lifecycle::Minimized,
            is_initialized,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match (self.is_open, self.is_minimized) {
            (true, _) => Lifecycle::Open,
            (false, true) => Lifecycle::Minimized,
            (false, false) => Lifecycle::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [Lifecycle; 3] = [Lifecycle::Closed, Lifecycle::Open, Lifecycle::Minimized];

    #[test]
    fn test_transition_table_minimize_variant() {
        let t = ToggleBehavior::Minimize;
        assert_eq!(Lifecycle::Closed.transition(WidgetEvent::Open, t), Some(Lifecycle::Open));
        assert_eq!(Lifecycle::Closed.transition(WidgetEvent::Close, t), None);
        assert_eq!(Lifecycle::Closed.transition(WidgetEvent::Minimize, t), None);
        assert_eq!(Lifecycle::Closed.transition(WidgetEvent::Toggle, t), Some(Lifecycle::Open));

        assert_eq!(Lifecycle::Open.transition(WidgetEvent::Open, t), None);
        assert_eq!(Lifecycle::Open.transition(WidgetEvent::Close, t), Some(Lifecycle::Closed));
        assert_eq!(
            Lifecycle::Open.transition(WidgetEvent::Minimize, t),
            Some(Lifecycle::Minimized)
        );
        assert_eq!(
            Lifecycle::Open.transition(WidgetEvent::Toggle, t),
            Some(Lifecycle::Minimized)
        );

        assert_eq!(Lifecycle::Minimized.transition(WidgetEvent::Open, t), Some(Lifecycle::Open));
        assert_eq!(
            Lifecycle::Minimized.transition(WidgetEvent::Close, t),
            Some(Lifecycle::Closed)
        );
        assert_eq!(Lifecycle::Minimized.transition(WidgetEvent::Minimize, t), None);
        assert_eq!(
            Lifecycle::Minimized.transition(WidgetEvent::Toggle, t),
            Some(Lifecycle::Open)
        );
    }

    #[test]
    fn test_toggle_close_variant() {
        assert_eq!(
            Lifecycle::Open.transition(WidgetEvent::Toggle, ToggleBehavior::Close),
            Some(Lifecycle::Closed)
        );
    }

    #[test]
    fn test_state_flags_are_mutually_exclusive() {
        for lifecycle in ALL_STATES {
            let state = WidgetState::new(lifecycle, true);
            assert!(!(state.is_open && state.is_minimized));
            assert_eq!(state.lifecycle(), lifecycle);
        }
    }
}
