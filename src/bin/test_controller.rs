use std::collections::HashMap;
use turtle_control::common::types::{Pose2D, TargetPose};
use turtle_control::control::ControlStack;
use turtle_control::ControllerCore;

fn main() {
    println!("Initializing turtle controller core...");

    let mut core = ControllerCore::new();
    let mut control_stack = ControlStack::new();

    // Configure the controller gains
    let mut params = HashMap::new();
    params.insert("kp_linear".to_string(), 0.2);
    params.insert("kp_angular".to_string(), 0.5);

    if let Err(e) = control_stack.configure_controller(&params) {
        println!("Failed to configure position controller: {}", e);
    }

    core.register(control_stack);

    // Initialize the core
    match core.init() {
        Ok(_) => println!("Core initialized successfully!"),
        Err(e) => {
            println!("Failed to initialize core: {}", e);
            return;
        }
    }

    // Drive the controller through a short scenario without a middleware
    if let Some(control_stack) = core.control_stack_mut() {
        let controller = control_stack.controller_mut();

        println!("Before any command: {:?}", controller.tick());

        controller.on_current_pose(Pose2D::new(0.0, 0.0, 0.0));
        controller.on_target_pose(TargetPose::new(1.0, 0.0));
        println!("Target ahead at (1, 0): {:?}", controller.tick());

        controller.on_target_pose(TargetPose::new(0.0, 1.0));
        println!("Target to the left at (0, 1): {:?}", controller.tick());

        controller.on_current_pose(Pose2D::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        println!("Facing +y, same target: {:?}", controller.tick());
    }

    // Shutdown the core
    match core.shutdown() {
        Ok(_) => println!("Core shutdown successfully!"),
        Err(e) => println!("Failed to shutdown core: {}", e),
    }
}
