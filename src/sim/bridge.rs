use nalgebra::Vector3;

use crate::error::BridgeError;
use crate::swarm::{Handle, Quadcopter};

// ---------------------------------------------------------------------------
// Simulator boundary
// ---------------------------------------------------------------------------

/// Position/velocity sample for one simulated body.
#[derive(Debug, Clone, Copy)]
pub struct BodyState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// Synchronous transport to the external physics simulator.
///
/// Every call blocks until the simulator responds and may fail with a
/// `BridgeError`; the core never retries a failed call.
pub trait SimulatorBridge {
    fn connect(&mut self) -> Result<(), BridgeError>;

    fn start_simulation(&mut self) -> Result<(), BridgeError>;

    fn stop_simulation(&mut self) -> Result<(), BridgeError>;

    /// Advance the external simulation by one tick.
    fn step_simulation(&mut self) -> Result<(), BridgeError>;

    /// Resolve one handle per body name. Called once, before the first step.
    fn setup_handles(&mut self, names: &[String], shape_tag: &str)
        -> Result<Vec<Handle>, BridgeError>;

    /// Push every quadcopter's position to its simulator body.
    fn set_all_quad_positions(&mut self, quads: &[Quadcopter]) -> Result<(), BridgeError>;

    /// Body states in the same order the handles were resolved.
    fn get_all_quad_states(&mut self) -> Result<Vec<BodyState>, BridgeError>;

    /// Place the goal marker in the scene.
    fn set_goal_position(&mut self, goal: Vector3<f64>) -> Result<(), BridgeError>;
}

// ---------------------------------------------------------------------------
// In-process kinematic stand-in
// ---------------------------------------------------------------------------

/// Loopback simulator for running without an external physics process.
///
/// Bodies are ideal: a pushed position is adopted exactly, and the reported
/// velocity is the finite difference of consecutive pushes over the step
/// interval. The first push seeds positions with zero velocity.
pub struct KinematicBridge {
    dt: f64,
    connected: bool,
    running: bool,
    primed: bool,
    tick: u64,
    bodies: Vec<BodyState>,
    goal: Option<Vector3<f64>>,
}

impl KinematicBridge {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            connected: false,
            running: false,
            primed: false,
            tick: 0,
            bodies: Vec::new(),
            goal: None,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn goal(&self) -> Option<Vector3<f64>> {
        self.goal
    }

    fn ensure_running(&self) -> Result<(), BridgeError> {
        if !self.connected {
            return Err(BridgeError::NotConnected);
        }
        if !self.running {
            return Err(BridgeError::NotRunning);
        }
        Ok(())
    }
}

impl SimulatorBridge for KinematicBridge {
    fn connect(&mut self) -> Result<(), BridgeError> {
        self.connected = true;
        Ok(())
    }

    fn start_simulation(&mut self) -> Result<(), BridgeError> {
        if !self.connected {
            return Err(BridgeError::NotConnected);
        }
        self.running = true;
        Ok(())
    }

    fn stop_simulation(&mut self) -> Result<(), BridgeError> {
        self.running = false;
        Ok(())
    }

    fn step_simulation(&mut self) -> Result<(), BridgeError> {
        self.ensure_running()?;
        self.tick += 1;
        Ok(())
    }

    fn setup_handles(
        &mut self,
        names: &[String],
        _shape_tag: &str,
    ) -> Result<Vec<Handle>, BridgeError> {
        self.ensure_running()?;
        self.bodies = vec![
            BodyState {
                position: Vector3::zeros(),
                velocity: Vector3::zeros(),
            };
            names.len()
        ];
        self.primed = false;
        Ok((0..names.len() as Handle).collect())
    }

    fn set_all_quad_positions(&mut self, quads: &[Quadcopter]) -> Result<(), BridgeError> {
        self.ensure_running()?;
        if quads.len() != self.bodies.len() {
            return Err(BridgeError::Transport(format!(
                "pushed {} positions for {} bodies",
                quads.len(),
                self.bodies.len()
            )));
        }
        for (body, quad) in self.bodies.iter_mut().zip(quads) {
            body.velocity = if self.primed {
                (quad.position - body.position) / self.dt
            } else {
                Vector3::zeros()
            };
            body.position = quad.position;
        }
        self.primed = true;
        Ok(())
    }

    fn get_all_quad_states(&mut self) -> Result<Vec<BodyState>, BridgeError> {
        self.ensure_running()?;
        Ok(self.bodies.clone())
    }

    fn set_goal_position(&mut self, goal: Vector3<f64>) -> Result<(), BridgeError> {
        self.ensure_running()?;
        self.goal = Some(goal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::{Quadcopter, Role};

    fn started_bridge(n: usize, dt: f64) -> KinematicBridge {
        let mut bridge = KinematicBridge::new(dt);
        bridge.connect().unwrap();
        bridge.start_simulation().unwrap();
        let names: Vec<String> = (0..n).map(|i| format!("Quadcopter[{i}]")).collect();
        bridge.setup_handles(&names, "Cylinder").unwrap();
        bridge
    }

    #[test]
    fn calls_fail_before_connect() {
        let mut bridge = KinematicBridge::new(0.5);
        assert!(matches!(
            bridge.step_simulation(),
            Err(BridgeError::NotConnected)
        ));
        bridge.connect().unwrap();
        assert!(matches!(
            bridge.step_simulation(),
            Err(BridgeError::NotRunning)
        ));
    }

    #[test]
    fn first_push_seeds_zero_velocity() {
        let mut bridge = started_bridge(1, 0.5);
        let quad = Quadcopter::new(0, 0, Vector3::new(-400.0, 0.0, 220.0), Role::Leader);
        bridge.set_all_quad_positions(std::slice::from_ref(&quad)).unwrap();
        let states = bridge.get_all_quad_states().unwrap();
        assert_eq!(states[0].position, quad.position);
        assert_eq!(states[0].velocity, Vector3::zeros());
    }

    #[test]
    fn velocity_is_finite_difference_of_pushes() {
        let mut bridge = started_bridge(1, 0.5);
        let mut quad = Quadcopter::new(0, 0, Vector3::zeros(), Role::Leader);
        bridge.set_all_quad_positions(std::slice::from_ref(&quad)).unwrap();
        quad.position = Vector3::new(5.0, 0.0, -2.5);
        bridge.set_all_quad_positions(std::slice::from_ref(&quad)).unwrap();
        let states = bridge.get_all_quad_states().unwrap();
        assert_eq!(states[0].velocity, Vector3::new(10.0, 0.0, -5.0));
    }

    #[test]
    fn body_count_mismatch_is_a_transport_error() {
        let mut bridge = started_bridge(2, 0.5);
        let quad = Quadcopter::new(0, 0, Vector3::zeros(), Role::Leader);
        assert!(matches!(
            bridge.set_all_quad_positions(std::slice::from_ref(&quad)),
            Err(BridgeError::Transport(_))
        ));
    }
}
