pub mod config;
pub mod control;
pub mod error;
pub mod io;
pub mod sim;
pub mod swarm;

// Convenience re-exports for the common entry points.
pub mod types {
    pub use crate::config::{GainTable, RunConfig};
    pub use crate::control::{Formation, StrategyContext, StrategyOutput};
    pub use crate::error::{BridgeError, ConfigError, SimError};
    pub use crate::io::csv::TrackingLog;
    pub use crate::sim::{BodyState, Coordinator, KinematicBridge, SimulatorBridge, GOAL_RADIUS};
    pub use crate::swarm::{Handle, Quadcopter, Role, Swarm};
}
