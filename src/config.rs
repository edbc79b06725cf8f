use std::path::Path;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Gain tables
// ---------------------------------------------------------------------------

/// Per-axis control gains with two columns: `near` applies while the
/// tracking error is within the distance threshold, `far` beyond it.
#[derive(Debug, Clone, Deserialize)]
pub struct GainTable {
    pub near: Vector3<f64>,
    pub far: Vector3<f64>,
}

impl GainTable {
    pub fn uniform(near: f64, far: f64) -> Self {
        Self {
            near: Vector3::repeat(near),
            far: Vector3::repeat(far),
        }
    }

    /// Select the active column.
    pub fn column(&self, far: bool) -> &Vector3<f64> {
        if far {
            &self.far
        } else {
            &self.near
        }
    }
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Complete parameter set for one run. Positions and distances are in the
/// simulator's units (centimeters in the reference setup). The core applies
/// no defaults; every field must be present and is validated once at
/// initialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub quad_num: usize,
    pub leader_idx: usize,
    /// Loop iteration budget.
    pub loop_num: usize,
    /// Control step interval, seconds.
    pub dt: f64,
    /// Wall-clock sleep between steps to pace the external simulator, seconds.
    pub pacing_s: f64,
    /// Tracking error above which followers switch to the far gain column.
    pub distance_threshold: f64,
    /// Leader cruise speed, units per second.
    pub leader_speed: f64,
    pub leader_goal: Vector3<f64>,
    pub k0l: GainTable,
    pub kps: GainTable,
    /// One entry per quadcopter, leader included, in construction order.
    pub initial_positions: Vec<Vector3<f64>>,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quad_num == 0 {
            return Err(ConfigError::EmptySwarm);
        }
        if self.leader_idx >= self.quad_num {
            return Err(ConfigError::LeaderIndexOutOfRange {
                leader_idx: self.leader_idx,
                quad_num: self.quad_num,
            });
        }
        if self.initial_positions.len() != self.quad_num {
            return Err(ConfigError::PositionCountMismatch {
                quad_num: self.quad_num,
                got: self.initial_positions.len(),
            });
        }
        if self.dt <= 0.0 {
            return Err(ConfigError::NonPositiveDt(self.dt));
        }
        Ok(())
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Preset configurations
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Reference mission: one leader and four followers crossing ~900 cm to
    /// the goal at 10 cm/s.
    pub fn reference() -> RunConfig {
        RunConfig {
            quad_num: 5,
            leader_idx: 0,
            loop_num: 2000,
            dt: 0.5,
            pacing_s: 0.05,
            distance_threshold: 80.0,
            leader_speed: 10.0,
            leader_goal: Vector3::new(500.0, -15.0, 250.0),
            k0l: GainTable::uniform(5.0, 200.0),
            kps: GainTable::uniform(1.0, 1.0),
            initial_positions: vec![
                Vector3::new(-400.0, 0.0, 220.0),
                Vector3::new(-420.0, -110.0, 250.0),
                Vector3::new(-500.0, -60.0, 250.0),
                Vector3::new(-520.0, 45.0, 250.0),
                Vector3::new(-600.0, -110.0, 250.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_preset_is_valid() {
        assert!(presets::reference().validate().is_ok());
    }

    #[test]
    fn leader_index_must_be_in_range() {
        let mut config = presets::reference();
        config.leader_idx = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LeaderIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn position_table_must_match_quad_count() {
        let mut config = presets::reference();
        config.initial_positions.pop();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PositionCountMismatch { quad_num: 5, got: 4 })
        ));
    }

    #[test]
    fn dt_must_be_positive() {
        let mut config = presets::reference();
        config.dt = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::NonPositiveDt(_))));
    }

    #[test]
    fn config_parses_from_toml() {
        let text = r#"
            quad_num = 2
            leader_idx = 0
            loop_num = 10
            dt = 0.5
            pacing_s = 0.0
            distance_threshold = 80.0
            leader_speed = 10.0
            leader_goal = [100.0, 0.0, 50.0]
            initial_positions = [[0.0, 0.0, 50.0], [-60.0, 0.0, 50.0]]

            [k0l]
            near = [5.0, 5.0, 5.0]
            far = [200.0, 200.0, 200.0]

            [kps]
            near = [1.0, 1.0, 1.0]
            far = [1.0, 1.0, 1.0]
        "#;
        let config: RunConfig = toml::from_str(text).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.quad_num, 2);
        assert_eq!(config.leader_goal, Vector3::new(100.0, 0.0, 50.0));
        assert_eq!(config.k0l.far.x, 200.0);
    }
}
