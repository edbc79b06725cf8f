use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Formation geometry: slot offsets relative to the leader
// ---------------------------------------------------------------------------

/// A leader moving slower than this keeps the reference heading.
const HEADING_EPS: f64 = 1e-6;

/// Ordered table of follower slot offsets, expressed in the leader frame:
/// +X along the leader's direction of travel, Z up. The table is read-only
/// for the lifetime of a run; a follower's slot index selects its offset.
#[derive(Debug, Clone)]
pub struct Formation {
    pub name: String,
    offsets: Vec<Vector3<f64>>,
}

impl Formation {
    pub fn new(name: impl Into<String>, offsets: Vec<Vector3<f64>>) -> Self {
        Self {
            name: name.into(),
            offsets,
        }
    }

    pub fn slots(&self) -> usize {
        self.offsets.len()
    }

    pub fn offset(&self, slot: usize) -> Option<&Vector3<f64>> {
        self.offsets.get(slot)
    }

    /// World-frame target position for a slot: the slot offset rotated into
    /// the leader's horizontal heading, added to the leader position. The
    /// heading is the yaw of the leader velocity; a (near-)stationary leader
    /// keeps the reference heading, so the offset applies unrotated.
    pub fn world_target(
        &self,
        slot: usize,
        leader_pos: &Vector3<f64>,
        leader_vel: &Vector3<f64>,
    ) -> Option<Vector3<f64>> {
        let offset = self.offsets.get(slot)?;
        let speed_xy = leader_vel.x.hypot(leader_vel.y);
        let rotated = if speed_xy < HEADING_EPS {
            *offset
        } else {
            let yaw = leader_vel.y.atan2(leader_vel.x);
            let (s, c) = yaw.sin_cos();
            Vector3::new(
                c * offset.x - s * offset.y,
                s * offset.x + c * offset.y,
                offset.z,
            )
        };
        Some(leader_pos + rotated)
    }
}

// ---------------------------------------------------------------------------
// Preset formations
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Four-slot V trailing the leader (reference formation).
    pub fn v_shape() -> Formation {
        Formation::new(
            "v-shape",
            vec![
                Vector3::new(-60.0, -60.0, 0.0),
                Vector3::new(-60.0, 60.0, 0.0),
                Vector3::new(-120.0, -120.0, 0.0),
                Vector3::new(-120.0, 120.0, 0.0),
            ],
        )
    }

    /// Single-file line behind the leader.
    pub fn line() -> Formation {
        Formation::new(
            "line",
            vec![
                Vector3::new(-60.0, 0.0, 0.0),
                Vector3::new(-120.0, 0.0, 0.0),
                Vector3::new(-180.0, 0.0, 0.0),
                Vector3::new(-240.0, 0.0, 0.0),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_leader_keeps_reference_heading() {
        let formation = presets::v_shape();
        let leader_pos = Vector3::new(100.0, 50.0, 250.0);
        let target = formation
            .world_target(0, &leader_pos, &Vector3::zeros())
            .unwrap();
        assert_eq!(target, leader_pos + Vector3::new(-60.0, -60.0, 0.0));
    }

    #[test]
    fn offsets_rotate_with_leader_heading() {
        let formation = Formation::new("t", vec![Vector3::new(-60.0, 0.0, 10.0)]);
        // Leader moving +Y: a trailing offset ends up below it on the Y axis.
        let target = formation
            .world_target(0, &Vector3::zeros(), &Vector3::new(0.0, 10.0, 0.0))
            .unwrap();
        assert!((target.x - 0.0).abs() < 1e-9);
        assert!((target.y + 60.0).abs() < 1e-9);
        assert!((target.z - 10.0).abs() < 1e-9, "Z is heading-independent");
    }

    #[test]
    fn out_of_range_slot_has_no_target() {
        let formation = presets::line();
        assert!(formation
            .world_target(4, &Vector3::zeros(), &Vector3::zeros())
            .is_none());
    }

    #[test]
    fn presets_carry_four_slots() {
        assert_eq!(presets::v_shape().slots(), 4);
        assert_eq!(presets::line().slots(), 4);
    }
}
