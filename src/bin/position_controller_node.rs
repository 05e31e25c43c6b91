use anyhow::{Error, Result};
use rclrs::{
    Context, CreateBasicExecutor, Node, RclrsErrorFilter, SpinOptions, QOS_PROFILE_DEFAULT,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use turtle_control::common::types::{Pose2D, TargetPose};
use turtle_control::control::ControlStack;
use turtle_control::ControllerCore;

// Import the message types directly from the crates
use geometry_msgs::msg::{Pose2D as Pose2DMsg, Twist};
use nav_msgs::msg::Odometry;

struct PositionControllerNode {
    core: Mutex<ControllerCore>,
    node: Arc<Node>,
    cmd_vel_publisher: Arc<rclrs::Publisher<Twist>>,
    command_subscription: Mutex<Option<Arc<rclrs::Subscription<Pose2DMsg>>>>,
    pose_subscription: Mutex<Option<Arc<rclrs::Subscription<Odometry>>>>,
    running: Arc<Mutex<bool>>,
}

impl PositionControllerNode {
    pub fn new(executor: &rclrs::Executor, name: &str) -> Result<Arc<Self>, rclrs::RclrsError> {
        // Create a node using the executor
        let node = executor.create_node(name)?;

        // Default parameters
        let kp_linear = 0.2;
        let kp_angular = 0.5;
        let cmd_vel_topic = "/turtle1/cmd_vel".to_string();
        let pose_topic = "/turtle1/odom".to_string();
        let command_topic = "/turtle1/position_command".to_string();

        // Print parameter values
        println!(
            "Using parameters: kp_linear={}, kp_angular={}",
            kp_linear, kp_angular
        );
        println!(
            "Topics: cmd_vel={}, pose={}, command={}",
            cmd_vel_topic, pose_topic, command_topic
        );

        // Create the core with a control stack
        let mut core = ControllerCore::new();
        let mut control_stack = ControlStack::new();

        // Configure the controller gains
        let mut params = HashMap::new();
        params.insert("kp_linear".to_string(), kp_linear);
        params.insert("kp_angular".to_string(), kp_angular);

        if let Err(e) = control_stack.configure_controller(&params) {
            eprintln!("Failed to configure position controller: {}", e);
        }

        core.register(control_stack);

        if let Err(e) = core.init() {
            eprintln!("Failed to initialize core: {}", e);
        }

        println!("Core initialized successfully!");

        // Create publisher for velocity commands
        let cmd_vel_publisher =
            node.create_publisher::<Twist>(&cmd_vel_topic, QOS_PROFILE_DEFAULT)?;

        // Create the node instance with a running flag
        let running = Arc::new(Mutex::new(true));

        let position_controller_node = Arc::new(PositionControllerNode {
            core: Mutex::new(core),
            node,
            cmd_vel_publisher,
            command_subscription: None.into(),
            pose_subscription: None.into(),
            running,
        });

        // Set up the position command subscription
        let position_controller_node_clone = Arc::clone(&position_controller_node);
        let command_subscription = position_controller_node
            .node
            .create_subscription::<Pose2DMsg, _>(
                &command_topic,
                QOS_PROFILE_DEFAULT,
                move |msg: Pose2DMsg| {
                    position_controller_node_clone.command_callback(msg);
                },
            )?;

        *position_controller_node.command_subscription.lock().unwrap() = Some(command_subscription);

        // Set up the current pose subscription
        let position_controller_node_clone = Arc::clone(&position_controller_node);
        let pose_subscription = position_controller_node
            .node
            .create_subscription::<Odometry, _>(
                &pose_topic,
                QOS_PROFILE_DEFAULT,
                move |msg: Odometry| {
                    position_controller_node_clone.pose_callback(msg);
                },
            )?;

        *position_controller_node.pose_subscription.lock().unwrap() = Some(pose_subscription);

        // Start a thread to periodically publish velocity commands
        let position_controller_node_clone = Arc::clone(&position_controller_node);
        let running_clone = Arc::clone(&position_controller_node.running);

        thread::spawn(move || {
            while *running_clone.lock().unwrap() {
                position_controller_node_clone.timer_callback();
                thread::sleep(Duration::from_millis(100)); // 10 Hz
            }
        });

        Ok(position_controller_node)
    }

    fn command_callback(&self, msg: Pose2DMsg) {
        println!("Received position command: x={}, y={}", msg.x, msg.y);

        // The commanded heading is unused; only the position matters
        let mut core = self.core.lock().unwrap();
        if let Some(control_stack) = core.control_stack_mut() {
            control_stack
                .controller_mut()
                .on_target_pose(TargetPose::new(msg.x, msg.y));
        }
    }

    fn pose_callback(&self, msg: Odometry) {
        // Extract position
        let x = msg.pose.pose.position.x;
        let y = msg.pose.pose.position.y;

        // Extract orientation (quaternion) and convert to yaw (theta)
        let qx = msg.pose.pose.orientation.x;
        let qy = msg.pose.pose.orientation.y;
        let qz = msg.pose.pose.orientation.z;
        let qw = msg.pose.pose.orientation.w;
        let theta = 2.0 * (qw * qz + qx * qy).atan2(1.0 - 2.0 * (qy * qy + qz * qz));

        println!(
            "Updated pose: x={:.2}, y={:.2}, theta={:.2}",
            x, y, theta
        );

        let mut core = self.core.lock().unwrap();
        if let Some(control_stack) = core.control_stack_mut() {
            control_stack
                .controller_mut()
                .on_current_pose(Pose2D::new(x, y, theta));
        }
    }

    fn timer_callback(&self) {
        let mut core = self.core.lock().unwrap();

        if let Some(control_stack) = core.control_stack_mut() {
            let controller = control_stack.controller();

            if !controller.is_active() {
                // No position command yet, nothing to publish
                println!("Waiting for position command...");
                return;
            }

            let cmd = controller.tick();

            let mut twist = Twist::default();
            twist.linear.x = cmd.linear_x;
            twist.angular.z = cmd.angular_z;

            if let Err(e) = self.cmd_vel_publisher.publish(&twist) {
                eprintln!("Failed to publish velocity command: {}", e);
            } else {
                println!(
                    "Velocity command: linear={:.4}, angular={:.4}",
                    cmd.linear_x, cmd.angular_z
                );
            }
        }
    }
}

impl Drop for PositionControllerNode {
    fn drop(&mut self) {
        // Stop the timer thread when the node is dropped
        if let Ok(mut running) = self.running.lock() {
            *running = false;
        }
    }
}

fn main() -> Result<(), Error> {
    println!("Initializing turtle position controller node...");

    // Create the ROS 2 context and executor
    let mut executor = Context::default_from_env()?.create_basic_executor();

    let _position_controller_node =
        PositionControllerNode::new(&executor, "turtle_position_controller")?;

    println!("Ready to send position commands");

    // Spin the executor to process callbacks
    executor
        .spin(SpinOptions::default())
        .first_error()
        .map_err(|err| err.into())
}
