use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use nalgebra::Vector3;

use crate::config::RunConfig;
use crate::control::{
    Formation, FollowerStrategy, LeaderStrategy, Strategy, StrategyContext, StrategyOutput,
};
use crate::error::{BridgeError, ConfigError, SimError};
use crate::io::csv::TrackingLog;
use crate::swarm::{Role, Swarm};

use super::bridge::SimulatorBridge;

// ---------------------------------------------------------------------------
// Coordinator: the per-step control loop and goal phase machine
// ---------------------------------------------------------------------------

/// Leader-to-goal distance below which the run latches into position hold.
pub const GOAL_RADIUS: f64 = 10.0;

/// Shape tag the simulator uses to locate quadcopter bodies.
const QUAD_SHAPE_TAG: &str = "Cylinder";

/// Owns the swarm and drives it against the simulator bridge, one blocking
/// step at a time. Strategies are dispatched by role; the `goal_reached`
/// flag transitions false→true exactly once per run.
pub struct Coordinator<B: SimulatorBridge> {
    config: RunConfig,
    formation: Formation,
    bridge: B,
    swarm: Swarm,
    leader_strategy: LeaderStrategy,
    follower_strategy: FollowerStrategy,
    goal_reached: bool,
    log: TrackingLog,
    stop: Arc<AtomicBool>,
}

impl<B: SimulatorBridge> Coordinator<B> {
    /// Validate the configuration and build the swarm. Fatal on any
    /// configuration error; nothing has touched the bridge yet.
    pub fn new(config: RunConfig, formation: Formation, bridge: B) -> Result<Self, ConfigError> {
        let swarm = Swarm::from_config(&config)?;
        if formation.slots() < swarm.follower_count() {
            return Err(ConfigError::FormationTooSmall {
                formation: formation.name.clone(),
                slots: formation.slots(),
                followers: swarm.follower_count(),
            });
        }
        let follower_strategy = FollowerStrategy::new(
            config.k0l.clone(),
            config.kps.clone(),
            config.distance_threshold,
        );
        let log = TrackingLog::new(swarm.follower_ids());
        Ok(Self {
            config,
            formation,
            bridge,
            swarm,
            leader_strategy: LeaderStrategy,
            follower_strategy,
            goal_reached: false,
            log,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared flag observed between steps; set it to request a clean stop.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn tracking_log(&self) -> &TrackingLog {
        &self.log
    }

    /// Resolve simulator handles and seed the scene with initial state.
    pub fn initialize(&mut self) -> Result<(), SimError> {
        let names: Vec<String> = (0..self.swarm.len())
            .map(|i| format!("Quadcopter[{i}]"))
            .collect();
        let handles = self.bridge.setup_handles(&names, QUAD_SHAPE_TAG)?;
        if handles.len() != self.swarm.len() {
            return Err(BridgeError::Transport(format!(
                "resolved {} handles for {} bodies",
                handles.len(),
                self.swarm.len()
            ))
            .into());
        }
        self.swarm.bind_handles(&handles);
        self.bridge.set_all_quad_positions(self.swarm.quads())?;
        self.bridge.set_goal_position(self.config.leader_goal)?;
        Ok(())
    }

    /// One control step. `step_idx` is zero-based; log rows are recorded
    /// one-based to match the step counter shown to the operator.
    pub fn step(&mut self, step_idx: usize) -> Result<(), SimError> {
        // 1. Refresh observed state while the goal is still ahead. After the
        //    goal the held positions are authoritative.
        if !self.goal_reached {
            let states = self.bridge.get_all_quad_states()?;
            if states.len() != self.swarm.len() {
                return Err(BridgeError::Transport(format!(
                    "received {} body states for {} quadcopters",
                    states.len(),
                    self.swarm.len()
                ))
                .into());
            }
            for (quad, state) in self.swarm.quads_mut().iter_mut().zip(&states) {
                quad.update_state(state.position, state.velocity);
            }
        }

        // 2. Goal predicate, latched on first satisfaction.
        if !self.goal_reached {
            let dist = (self.swarm.leader().position - self.config.leader_goal).norm();
            if dist < GOAL_RADIUS {
                info!(
                    "goal reached at step {} ({dist:.1} from goal), holding positions",
                    step_idx + 1
                );
                self.goal_reached = true;
            }
        }

        // 3/4. Velocity commands and the log row for this step. Post-goal
        //      steps command zero everywhere and record nothing.
        if self.goal_reached {
            for quad in self.swarm.quads_mut() {
                quad.next_velocity = Vector3::zeros();
            }
        } else {
            let commands = self.compute_commands();
            let mut errors = Vec::with_capacity(self.swarm.follower_count());
            for (quad, output) in self.swarm.quads_mut().iter_mut().zip(&commands) {
                quad.next_velocity = output.velocity;
                if let Some(error) = output.error {
                    errors.push((quad.id, error));
                }
            }
            self.log.add_entry(step_idx + 1, &errors);
        }

        // 5. Integrate every entity, held ones included (zero command).
        let dt = self.config.dt;
        for quad in self.swarm.quads_mut() {
            quad.update_position(dt);
        }

        // 6. Push the new positions and advance the external simulation.
        self.bridge.set_all_quad_positions(self.swarm.quads())?;
        self.bridge.step_simulation()?;
        Ok(())
    }

    fn compute_commands(&self) -> Vec<StrategyOutput> {
        let leader = self.swarm.leader();
        self.swarm
            .quads()
            .iter()
            .enumerate()
            .map(|(idx, quad)| {
                let ctx = StrategyContext {
                    swarm: &self.swarm,
                    leader,
                    goal: self.config.leader_goal,
                    max_speed: self.config.leader_speed,
                    formation: &self.formation,
                    slot: self.swarm.slot_of(idx),
                };
                self.strategy_for(quad.role()).compute(quad, &ctx)
            })
            .collect()
    }

    fn strategy_for(&self, role: Role) -> &dyn Strategy {
        match role {
            Role::Leader => &self.leader_strategy,
            Role::Follower => &self.follower_strategy,
        }
    }

    /// Run the full mission: connect, initialize, loop, tear down.
    ///
    /// The bridge is stopped on every exit path; a failure to stop is
    /// logged rather than allowed to mask the original error.
    pub fn run(&mut self) -> Result<(), SimError> {
        self.bridge.connect()?;
        self.bridge.start_simulation()?;
        self.initialize()?;

        let result = self.run_loop();

        if let Err(e) = self.bridge.stop_simulation() {
            warn!("failed to stop simulation: {e}");
        }
        result
    }

    fn run_loop(&mut self) -> Result<(), SimError> {
        let pacing = Duration::from_secs_f64(self.config.pacing_s.max(0.0));
        for step_idx in 0..self.config.loop_num {
            if self.stop.load(Ordering::SeqCst) {
                info!(
                    "interrupted at step {}/{}, shutting down",
                    step_idx + 1,
                    self.config.loop_num
                );
                break;
            }
            self.step(step_idx)?;
            debug!("step {}/{}", step_idx + 1, self.config.loop_num);
            if !pacing.is_zero() {
                std::thread::sleep(pacing);
            }
        }
        Ok(())
    }

    /// Log one line per quadcopter with its current state.
    pub fn dump_swarm(&self) {
        for quad in self.swarm.quads() {
            debug!(
                "quad {} {:?} position ({:.1}, {:.1}, {:.1}) velocity ({:.2}, {:.2}, {:.2})",
                quad.id,
                quad.role(),
                quad.position.x,
                quad.position.y,
                quad.position.z,
                quad.velocity.x,
                quad.velocity.y,
                quad.velocity.z,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
