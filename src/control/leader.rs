use nalgebra::Vector3;

use crate::swarm::Quadcopter;

use super::{Strategy, StrategyContext, StrategyOutput};

// ---------------------------------------------------------------------------
// Leader: straight-line cruise toward the goal
// ---------------------------------------------------------------------------

/// Flies the leader at cruise speed along the unit vector toward the goal.
/// At the goal exactly, the command is the zero vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaderStrategy;

impl Strategy for LeaderStrategy {
    fn compute(&self, quad: &Quadcopter, ctx: &StrategyContext) -> StrategyOutput {
        let direction = ctx.goal - quad.position;
        let distance = direction.norm();
        let velocity = if distance > 0.0 {
            direction * (ctx.max_speed / distance)
        } else {
            Vector3::zeros()
        };
        StrategyOutput {
            velocity,
            error: None,
        }
    }

    fn name(&self) -> &str {
        "leader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::control::formation;
    use crate::swarm::Swarm;

    #[test]
    fn zero_command_at_the_goal() {
        let config = presets::reference();
        let swarm = Swarm::from_config(&config).unwrap();
        let formation = formation::presets::v_shape();
        let goal = swarm.leader().position;
        let ctx = StrategyContext {
            swarm: &swarm,
            leader: swarm.leader(),
            goal,
            max_speed: 10.0,
            formation: &formation,
            slot: None,
        };
        let out = LeaderStrategy.compute(swarm.leader(), &ctx);
        assert_eq!(out.velocity, Vector3::zeros());
        assert!(out.error.is_none(), "Leader reports no tracking error");
    }

    #[test]
    fn cruises_at_max_speed_toward_goal() {
        let config = presets::reference();
        let swarm = Swarm::from_config(&config).unwrap();
        let formation = formation::presets::v_shape();
        let goal = Vector3::new(500.0, -15.0, 250.0);
        let ctx = StrategyContext {
            swarm: &swarm,
            leader: swarm.leader(),
            goal,
            max_speed: 10.0,
            formation: &formation,
            slot: None,
        };
        let out = LeaderStrategy.compute(swarm.leader(), &ctx);
        assert!((out.velocity.norm() - 10.0).abs() < 1e-9);
        let expected_dir = (goal - swarm.leader().position).normalize();
        assert!((out.velocity.normalize() - expected_dir).norm() < 1e-9);
    }
}
