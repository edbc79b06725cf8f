use crate::config::GainTable;
use crate::swarm::Quadcopter;

use super::{Strategy, StrategyContext, StrategyOutput};

// ---------------------------------------------------------------------------
// Follower: formation keeping with leader-velocity feed-forward
// ---------------------------------------------------------------------------

/// Holds a formation slot relative to the leader.
///
/// The command per axis blends a proportional pull toward the slot target
/// with a feed-forward copy of the leader velocity:
///
/// ```text
/// v_i = kps[col]_i * err_i + (k0l[near]_i / k0l[col]_i) * leader_vel_i
/// ```
///
/// Both gain tables carry a near and a far column; the far column applies
/// once the tracking error exceeds `distance_threshold`. Within the
/// threshold the feed-forward weight is exactly 1 (pace the leader, correct
/// the residual proportionally); beyond it the weight collapses to
/// `k0l_near/k0l_far`, so closing the gap dominates. The output is not
/// clamped.
#[derive(Debug, Clone)]
pub struct FollowerStrategy {
    k0l: GainTable,
    kps: GainTable,
    distance_threshold: f64,
}

impl FollowerStrategy {
    pub fn new(k0l: GainTable, kps: GainTable, distance_threshold: f64) -> Self {
        Self {
            k0l,
            kps,
            distance_threshold,
        }
    }
}

impl Strategy for FollowerStrategy {
    fn compute(&self, quad: &Quadcopter, ctx: &StrategyContext) -> StrategyOutput {
        let Some(slot) = ctx.slot else {
            return StrategyOutput::hold();
        };
        let Some(target) =
            ctx.formation
                .world_target(slot, &ctx.leader.position, &ctx.leader.velocity)
        else {
            return StrategyOutput::hold();
        };

        let err = target - quad.position;
        let tracking_error = err.norm();
        let far = tracking_error > self.distance_threshold;

        let kp = self.kps.column(far);
        let feed_forward = self.k0l.column(false).component_div(self.k0l.column(far));
        let velocity =
            kp.component_mul(&err) + feed_forward.component_mul(&ctx.leader.velocity);

        StrategyOutput {
            velocity,
            error: Some(tracking_error),
        }
    }

    fn name(&self) -> &str {
        "follower"
    }
}
