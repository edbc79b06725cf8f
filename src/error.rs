use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy: configuration, bridge transport, top-level run
// ---------------------------------------------------------------------------

/// Configuration problems, surfaced before the first control step. Fatal;
/// nothing is recovered automatically.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("swarm must contain at least one quadcopter")]
    EmptySwarm,

    #[error("leader index {leader_idx} out of range for {quad_num} quadcopters")]
    LeaderIndexOutOfRange { leader_idx: usize, quad_num: usize },

    #[error("expected {quad_num} initial positions, got {got}")]
    PositionCountMismatch { quad_num: usize, got: usize },

    #[error("step interval must be positive, got {0}")]
    NonPositiveDt(f64),

    #[error("formation '{formation}' has {slots} slots but the swarm has {followers} followers")]
    FormationTooSmall {
        formation: String,
        slots: usize,
        followers: usize,
    },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures raised at the simulator boundary. Propagated unmodified from
/// the call site; the run ends, but the shutdown path still executes.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("not connected to the simulator")]
    NotConnected,

    #[error("simulation is not running")]
    NotRunning,

    #[error("could not resolve a handle for '{0}'")]
    HandleResolution(String),

    #[error("simulator transport failure: {0}")]
    Transport(String),
}

/// Anything that can end a simulation run early.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
