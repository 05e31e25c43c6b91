//! Common types for the turtle position controller

/// Message-shaped types shared between the controller and the node glue
pub mod types {
    /// A 2D pose: position plus heading in radians
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Pose2D {
        pub x: f64,
        pub y: f64,
        pub theta: f64,
    }

    impl Pose2D {
        /// Create a pose from position and heading
        pub fn new(x: f64, y: f64, theta: f64) -> Self {
            Pose2D { x, y, theta }
        }

        /// True if every component is a finite number
        pub fn is_finite(&self) -> bool {
            self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
        }
    }

    /// A commanded goal position; the goal carries no heading
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct TargetPose {
        pub x: f64,
        pub y: f64,
    }

    impl TargetPose {
        /// Create a target from a goal position
        pub fn new(x: f64, y: f64) -> Self {
            TargetPose { x, y }
        }

        /// True if both components are finite numbers
        pub fn is_finite(&self) -> bool {
            self.x.is_finite() && self.y.is_finite()
        }
    }

    /// A velocity command for a differential-drive base
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct VelocityCommand {
        pub linear_x: f64,
        pub angular_z: f64,
    }

    impl VelocityCommand {
        /// Create a new velocity command
        pub fn new(linear_x: f64, angular_z: f64) -> Self {
            VelocityCommand {
                linear_x,
                angular_z,
            }
        }

        /// The zero command (stop / idle)
        pub fn zero() -> Self {
            VelocityCommand::new(0.0, 0.0)
        }
    }

    impl Default for VelocityCommand {
        fn default() -> Self {
            VelocityCommand::zero()
        }
    }
}
