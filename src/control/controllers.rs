//! Proportional position controller for the turtle

use std::collections::HashMap;

use nalgebra::Vector2;
use thiserror::Error;

use crate::common::types::{Pose2D, TargetPose, VelocityCommand};

/// Error raised when a controller gain fails validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gain `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("gain `{name}` must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
}

/// Proportional gains for the position controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub kp_linear: f64,
    pub kp_angular: f64,
}

impl Default for Gains {
    fn default() -> Self {
        Gains {
            kp_linear: 0.2,
            kp_angular: 0.5,
        }
    }
}

/// Pose state written by the input callbacks and read by the control loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    pub current_pose: Pose2D,
    pub target_pose: TargetPose,
    pub active: bool,
}

/// Signed angle between the robot's heading and the bearing to the target.
///
/// Not wrapped to [-pi, pi]; the result lives in roughly (-2pi, 2pi), so a
/// target behind the robot reads as an error near pi rather than as a short
/// turn the other way.
pub fn angular_error(current: &Pose2D, target: &TargetPose) -> f64 {
    let error = Vector2::new(target.x - current.x, target.y - current.y);
    let bearing = error.y.atan2(error.x);
    bearing - current.theta
}

/// Straight-line distance to the target projected onto the robot's forward
/// axis: positive when the target lies roughly ahead of the current heading,
/// negative when it lies behind.
pub fn linear_error(current: &Pose2D, target: &TargetPose) -> f64 {
    let error = Vector2::new(target.x - current.x, target.y - current.y);
    error.norm() * angular_error(current, target).cos()
}

/// A proportional position controller for a differential-drive turtle.
///
/// Holds the latest known current pose and target, and turns their error into
/// a velocity command once per control tick. The controller is idle until the
/// first target command arrives and stays active from then on; it has no
/// arrival check and keeps commanding motion even at the goal.
#[derive(Debug, Clone, Default)]
pub struct PositionController {
    gains: Gains,
    state: ControllerState,
}

impl PositionController {
    /// Create a controller with default gains, idle until the first target
    pub fn new() -> Self {
        PositionController::default()
    }

    /// Create a controller with explicit gains
    pub fn with_gains(gains: Gains) -> Self {
        PositionController {
            gains,
            state: ControllerState::default(),
        }
    }

    /// Store a new target and unblock the control loop.
    ///
    /// Non-finite targets are dropped as ignored updates.
    pub fn on_target_pose(&mut self, target: TargetPose) {
        if !target.is_finite() {
            return;
        }
        self.state.target_pose = target;
        self.state.active = true;
    }

    /// Store the latest current pose.
    ///
    /// Non-finite poses are dropped as ignored updates.
    pub fn on_current_pose(&mut self, pose: Pose2D) {
        if !pose.is_finite() {
            return;
        }
        self.state.current_pose = pose;
    }

    /// Compute the velocity command for this control tick.
    ///
    /// Idle (no target yet) yields the zero command. The linear term only
    /// ever drives forward: a target behind the robot gets a zero linear
    /// command and relies on the angular term to turn around.
    pub fn tick(&self) -> VelocityCommand {
        if !self.state.active {
            return VelocityCommand::zero();
        }

        let current = &self.state.current_pose;
        let target = &self.state.target_pose;

        // The bearing is undefined on top of the target; distance 0 wins.
        if target.x == current.x && target.y == current.y {
            return VelocityCommand::zero();
        }

        let ang_error = angular_error(current, target);
        let lin_error = linear_error(current, target);

        let linear_x = if lin_error > 0.0 {
            self.gains.kp_linear * lin_error
        } else {
            0.0
        };

        VelocityCommand::new(linear_x, self.gains.kp_angular * ang_error)
    }

    /// Override gains by name (`kp_linear`, `kp_angular`); unknown keys are
    /// ignored and invalid values are rejected
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<(), ConfigError> {
        if let Some(&value) = params.get("kp_linear") {
            check_gain("kp_linear", value)?;
            self.gains.kp_linear = value;
        }

        if let Some(&value) = params.get("kp_angular") {
            check_gain("kp_angular", value)?;
            self.gains.kp_angular = value;
        }

        Ok(())
    }

    /// Get the current gains
    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Get the controller state
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// True once the first target command has been received
    pub fn is_active(&self) -> bool {
        self.state.active
    }
}

fn check_gain(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { name, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn target_ahead_has_zero_angular_error() {
        for d in [0.5, 1.0, 3.7] {
            let current = Pose2D::new(0.0, 0.0, 0.0);
            let target = TargetPose::new(d, 0.0);
            assert_eq!(angular_error(&current, &target), 0.0);
            assert_close(linear_error(&current, &target), d);
        }
    }

    #[test]
    fn target_behind_projects_negative() {
        for d in [0.5, 2.0] {
            let current = Pose2D::new(0.0, 0.0, 0.0);
            let target = TargetPose::new(-d, 0.0);
            assert_close(angular_error(&current, &target), PI);
            assert_close(linear_error(&current, &target), -d);
        }
    }

    #[test]
    fn angular_error_is_not_wrapped() {
        // Bearing pi minus heading -3.0 exceeds pi; a wrapping controller
        // would fold this back into [-pi, pi].
        let current = Pose2D::new(0.0, 0.0, -3.0);
        let target = TargetPose::new(-1.0, 0.0);
        let error = angular_error(&current, &target);
        assert!(error > PI);
        assert_close(error, PI + 3.0);
    }

    #[test]
    fn idle_until_first_target() {
        let mut controller = PositionController::new();
        assert!(!controller.is_active());
        assert_eq!(controller.tick(), VelocityCommand::zero());

        controller.on_current_pose(Pose2D::new(3.0, 4.0, 1.0));
        assert_eq!(controller.tick(), VelocityCommand::zero());

        controller.on_target_pose(TargetPose::new(5.0, 4.0));
        assert!(controller.is_active());
        assert_ne!(controller.tick(), VelocityCommand::zero());
    }

    #[test]
    fn active_never_reverts() {
        let mut controller = PositionController::new();
        controller.on_target_pose(TargetPose::new(1.0, 1.0));
        controller.on_current_pose(Pose2D::new(1.0, 1.0, 0.0));
        controller.on_current_pose(Pose2D::new(2.0, 2.0, 0.5));
        assert!(controller.is_active());
    }

    #[test]
    fn tick_is_idempotent() {
        let mut controller = PositionController::new();
        controller.on_current_pose(Pose2D::new(0.3, -1.2, 0.7));
        controller.on_target_pose(TargetPose::new(4.0, 2.5));

        let first = controller.tick();
        let second = controller.tick();
        assert_eq!(first, second);
    }

    #[test]
    fn target_equal_to_current_yields_zero_command() {
        let mut controller = PositionController::new();
        controller.on_current_pose(Pose2D::new(2.0, 3.0, 1.3));
        controller.on_target_pose(TargetPose::new(2.0, 3.0));

        // Heading is nonzero, but distance 0 dominates.
        assert_eq!(controller.tick(), VelocityCommand::zero());
        assert_eq!(
            linear_error(&Pose2D::new(2.0, 3.0, 1.3), &TargetPose::new(2.0, 3.0)),
            0.0
        );
    }

    #[test]
    fn drives_straight_toward_target_ahead() {
        let mut controller = PositionController::new();
        controller.on_current_pose(Pose2D::new(0.0, 0.0, 0.0));
        controller.on_target_pose(TargetPose::new(1.0, 0.0));

        let cmd = controller.tick();
        assert_close(cmd.linear_x, 0.2);
        assert_eq!(cmd.angular_z, 0.0);
    }

    #[test]
    fn turns_in_place_toward_lateral_target() {
        let mut controller = PositionController::new();
        controller.on_current_pose(Pose2D::new(0.0, 0.0, 0.0));
        controller.on_target_pose(TargetPose::new(0.0, 1.0));

        let cmd = controller.tick();
        // cos(pi/2) leaves only rounding noise in the projection
        assert!(cmd.linear_x.abs() < 1e-12);
        assert_close(cmd.angular_z, 0.5 * FRAC_PI_2);
    }

    #[test]
    fn facing_away_turns_back_clockwise() {
        let mut controller = PositionController::new();
        controller.on_current_pose(Pose2D::new(0.0, 0.0, FRAC_PI_2));
        controller.on_target_pose(TargetPose::new(1.0, 0.0));

        let cmd = controller.tick();
        assert!(cmd.linear_x.abs() < 1e-12);
        assert_close(cmd.angular_z, -0.5 * FRAC_PI_2);
    }

    #[test]
    fn never_commands_reverse() {
        let mut controller = PositionController::new();
        controller.on_current_pose(Pose2D::new(0.0, 0.0, 0.0));
        controller.on_target_pose(TargetPose::new(-1.0, 0.0));

        let cmd = controller.tick();
        assert_eq!(cmd.linear_x, 0.0);
        assert_close(cmd.angular_z, 0.5 * PI);
    }

    #[test]
    fn configure_overrides_gains() {
        let mut controller = PositionController::new();
        let mut params = HashMap::new();
        params.insert("kp_linear".to_string(), 0.4);
        params.insert("kp_angular".to_string(), 1.0);

        controller.configure(&params).unwrap();
        assert_eq!(controller.gains().kp_linear, 0.4);
        assert_eq!(controller.gains().kp_angular, 1.0);
    }

    #[test]
    fn configure_rejects_invalid_gains() {
        let mut controller = PositionController::new();

        let mut params = HashMap::new();
        params.insert("kp_linear".to_string(), f64::NAN);
        assert!(matches!(
            controller.configure(&params),
            Err(ConfigError::NonFinite { name: "kp_linear", .. })
        ));

        let mut params = HashMap::new();
        params.insert("kp_angular".to_string(), -0.5);
        assert!(matches!(
            controller.configure(&params),
            Err(ConfigError::Negative { name: "kp_angular", .. })
        ));

        // Defaults survive the rejected updates
        assert_eq!(controller.gains(), Gains::default());
    }

    #[test]
    fn non_finite_updates_are_ignored() {
        let mut controller = PositionController::new();
        controller.on_current_pose(Pose2D::new(1.0, 2.0, 0.0));

        controller.on_current_pose(Pose2D::new(f64::NAN, 2.0, 0.0));
        controller.on_current_pose(Pose2D::new(1.0, 2.0, f64::INFINITY));
        assert_eq!(controller.state().current_pose, Pose2D::new(1.0, 2.0, 0.0));

        controller.on_target_pose(TargetPose::new(f64::NAN, 0.0));
        assert!(!controller.is_active());
    }
}
