pub mod formation;
mod follower;
mod leader;

pub use follower::FollowerStrategy;
pub use formation::Formation;
pub use leader::LeaderStrategy;

use nalgebra::Vector3;

use crate::swarm::{Quadcopter, Swarm};

// ---------------------------------------------------------------------------
// Strategy interface
// ---------------------------------------------------------------------------

/// Everything a strategy may read when computing a command. One instance is
/// assembled per quadcopter per step, so each strategy's inputs are an
/// explicit contract rather than a loose bundle.
pub struct StrategyContext<'a> {
    pub swarm: &'a Swarm,
    pub leader: &'a Quadcopter,
    pub goal: Vector3<f64>,
    /// Leader cruise speed limit.
    pub max_speed: f64,
    pub formation: &'a Formation,
    /// Formation slot of the quadcopter under control; `None` for the leader.
    pub slot: Option<usize>,
}

/// Velocity command plus the tracking error where one applies. The leader
/// has no tracking error.
#[derive(Debug, Clone, Copy)]
pub struct StrategyOutput {
    pub velocity: Vector3<f64>,
    pub error: Option<f64>,
}

impl StrategyOutput {
    /// Zero command, no error: hold in place.
    pub fn hold() -> Self {
        Self {
            velocity: Vector3::zeros(),
            error: None,
        }
    }
}

/// Trait for per-role control strategies.
///
/// Implement this to plug a different control law into the coordinator's
/// role dispatch.
pub trait Strategy {
    /// Compute the velocity command for one quadcopter this step.
    fn compute(&self, quad: &Quadcopter, ctx: &StrategyContext) -> StrategyOutput;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
