pub mod bridge;
pub mod coordinator;

pub use bridge::{BodyState, KinematicBridge, SimulatorBridge};
pub use coordinator::{Coordinator, GOAL_RADIUS};
