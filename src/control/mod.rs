//! Control module for the turtle robot
pub mod controllers;

use self::controllers::{ConfigError, PositionController};
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use std::any::Any;
use std::collections::HashMap;

/// Control stack owning the position controller
pub struct ControlStack {
    base: LifecycleNodeBase,
    position_controller: PositionController,
}

impl ControlStack {
    /// Create a new control stack with default gains
    pub fn new() -> Self {
        ControlStack {
            base: LifecycleNodeBase::new("control_stack"),
            position_controller: PositionController::new(),
        }
    }

    /// Get the position controller
    pub fn controller(&self) -> &PositionController {
        &self.position_controller
    }

    /// Get the position controller mutably
    pub fn controller_mut(&mut self) -> &mut PositionController {
        &mut self.position_controller
    }

    /// Configure the position controller gains
    pub fn configure_controller(
        &mut self,
        params: &HashMap<String, f64>,
    ) -> Result<(), ConfigError> {
        self.position_controller.configure(params)
    }
}

impl Default for ControlStack {
    fn default() -> Self {
        ControlStack::new()
    }
}

impl LifecycleNode for ControlStack {
    fn on_configure(&mut self) -> Result<(), String> {
        println!("Configuring control stack");
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_activate(&mut self) -> Result<(), String> {
        println!("Activating control stack");
        self.base.set_state(State::Active);
        Ok(())
    }

    fn on_deactivate(&mut self) -> Result<(), String> {
        println!("Deactivating control stack");
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_cleanup(&mut self) -> Result<(), String> {
        println!("Cleaning up control stack");
        self.base.set_state(State::Unconfigured);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Pose2D, TargetPose};

    #[test]
    fn configure_reaches_the_controller() {
        let mut stack = ControlStack::new();
        let mut params = HashMap::new();
        params.insert("kp_angular".to_string(), 0.8);

        stack.configure_controller(&params).unwrap();
        assert_eq!(stack.controller().gains().kp_angular, 0.8);
    }

    #[test]
    fn controller_is_reachable_through_the_stack() {
        let mut stack = ControlStack::new();
        stack.controller_mut().on_current_pose(Pose2D::new(0.0, 0.0, 0.0));
        stack.controller_mut().on_target_pose(TargetPose::new(2.0, 0.0));

        let cmd = stack.controller().tick();
        assert!(cmd.linear_x > 0.0);
    }
}
