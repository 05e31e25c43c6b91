pub mod common;
pub mod control;
pub mod lifecycle;

use crate::control::ControlStack;
use crate::lifecycle::LifecycleNode;

/// Core container for the turtle controller components
pub struct ControllerCore {
    components: Vec<Box<dyn LifecycleNode>>,
}

impl ControllerCore {
    /// Create a new, empty core
    pub fn new() -> Self {
        ControllerCore {
            components: Vec::new(),
        }
    }

    /// Register a component with the core
    pub fn register<T: LifecycleNode + 'static>(&mut self, component: T) {
        self.components.push(Box::new(component));
    }

    /// Configure and activate all registered components
    pub fn init(&mut self) -> Result<(), String> {
        for component in &mut self.components {
            component.on_configure()?;
            component.on_activate()?;
        }
        Ok(())
    }

    /// Deactivate and clean up all registered components
    pub fn shutdown(&mut self) -> Result<(), String> {
        for component in &mut self.components {
            component.on_deactivate()?;
            component.on_cleanup()?;
        }
        Ok(())
    }

    /// Get a mutable reference to the control stack, if one is registered
    pub fn control_stack_mut(&mut self) -> Option<&mut ControlStack> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<ControlStack>())
    }
}

impl Default for ControllerCore {
    fn default() -> Self {
        ControllerCore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_shutdown_round_trip() {
        let mut core = ControllerCore::new();
        core.register(ControlStack::new());
        core.init().unwrap();
        core.shutdown().unwrap();
    }

    #[test]
    fn control_stack_is_recoverable_by_downcast() {
        let mut core = ControllerCore::new();
        assert!(core.control_stack_mut().is_none());

        core.register(ControlStack::new());
        assert!(core.control_stack_mut().is_some());
    }
}
