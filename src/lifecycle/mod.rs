//! Lifecycle management for controller components

use std::any::Any;

/// Trait for components that follow a configure/activate lifecycle
pub trait LifecycleNode: Send + Sync {
    /// Configure the component
    fn on_configure(&mut self) -> Result<(), String>;

    /// Activate the component
    fn on_activate(&mut self) -> Result<(), String>;

    /// Deactivate the component
    fn on_deactivate(&mut self) -> Result<(), String>;

    /// Clean up the component
    fn on_cleanup(&mut self) -> Result<(), String>;

    /// Convert to Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Base implementation for lifecycle components
pub struct LifecycleNodeBase {
    pub name: String,
    state: State,
}

/// State of a lifecycle component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unconfigured,
    Inactive,
    Active,
    Finalized,
}

impl LifecycleNodeBase {
    /// Create a new lifecycle base with the given component name
    pub fn new(name: &str) -> Self {
        LifecycleNodeBase {
            name: name.to_string(),
            state: State::Unconfigured,
        }
    }

    /// Get the current state
    pub fn get_state(&self) -> State {
        self.state
    }

    /// Set the state
    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_starts_unconfigured() {
        let base = LifecycleNodeBase::new("position_controller");
        assert_eq!(base.get_state(), State::Unconfigured);
        assert_eq!(base.name, "position_controller");
    }

    #[test]
    fn base_tracks_state_changes() {
        let mut base = LifecycleNodeBase::new("control_stack");
        base.set_state(State::Inactive);
        assert_eq!(base.get_state(), State::Inactive);
        base.set_state(State::Active);
        assert_eq!(base.get_state(), State::Active);
    }
}
