use nalgebra::Vector3;

use crate::config::RunConfig;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Entity model: roles, quadcopters, the swarm that owns them
// ---------------------------------------------------------------------------

/// Opaque reference to a body owned by the external simulator. Resolved
/// once per run and only ever handed back to the bridge, never dereferenced
/// here.
pub type Handle = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Follower,
}

/// One simulated quadcopter. `position`/`velocity` reflect the last
/// observation (or local integration once the goal is reached);
/// `next_velocity` is the command staged for the current step.
#[derive(Debug, Clone)]
pub struct Quadcopter {
    pub id: u32,
    pub handle: Handle,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub next_velocity: Vector3<f64>,
    role: Role,
}

impl Quadcopter {
    pub fn new(id: u32, handle: Handle, position: Vector3<f64>, role: Role) -> Self {
        Self {
            id,
            handle,
            position,
            velocity: Vector3::zeros(),
            next_velocity: Vector3::zeros(),
            role,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Overwrite the observed state with a fresh sample from the simulator.
    pub fn update_state(&mut self, position: Vector3<f64>, velocity: Vector3<f64>) {
        self.position = position;
        self.velocity = velocity;
    }

    /// Advance the position by the staged velocity command over one step.
    pub fn update_position(&mut self, dt: f64) {
        self.position += self.next_velocity * dt;
    }
}

// ---------------------------------------------------------------------------
// Swarm
// ---------------------------------------------------------------------------

/// Ordered set of quadcopters with exactly one leader. Order is fixed at
/// construction; follower slots follow construction order with the leader
/// skipped.
#[derive(Debug, Clone)]
pub struct Swarm {
    quads: Vec<Quadcopter>,
    leader_idx: usize,
}

impl Swarm {
    /// Build the swarm from a validated run configuration. Handles start
    /// unbound (zero) until the coordinator resolves them via the bridge.
    pub fn from_config(config: &RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let quads = config
            .initial_positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let role = if i == config.leader_idx {
                    Role::Leader
                } else {
                    Role::Follower
                };
                Quadcopter::new(i as u32, 0, *position, role)
            })
            .collect();
        Ok(Self {
            quads,
            leader_idx: config.leader_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn quads(&self) -> &[Quadcopter] {
        &self.quads
    }

    pub fn quads_mut(&mut self) -> &mut [Quadcopter] {
        &mut self.quads
    }

    pub fn leader(&self) -> &Quadcopter {
        &self.quads[self.leader_idx]
    }

    pub fn followers(&self) -> impl Iterator<Item = &Quadcopter> {
        self.quads.iter().filter(|q| q.role() == Role::Follower)
    }

    pub fn follower_count(&self) -> usize {
        self.quads.len() - 1
    }

    pub fn follower_ids(&self) -> Vec<u32> {
        self.followers().map(|q| q.id).collect()
    }

    /// Formation slot for the quadcopter at `idx`: its position among the
    /// followers in construction order. `None` for the leader.
    pub fn slot_of(&self, idx: usize) -> Option<usize> {
        if idx == self.leader_idx {
            None
        } else if idx < self.leader_idx {
            Some(idx)
        } else {
            Some(idx - 1)
        }
    }

    /// Attach the handles resolved by the bridge, one per quadcopter in
    /// order.
    pub fn bind_handles(&mut self, handles: &[Handle]) {
        for (quad, handle) in self.quads.iter_mut().zip(handles) {
            quad.handle = *handle;
        }
    }
}
