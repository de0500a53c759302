//! Core simulation module
//!
//! Contains configuration, the fixed-step simulation driver and statistics

mod config;
mod debug;
mod engine;
mod time;

pub use config::{ConfigError, PoolConfig, PrewarmEntry, SimulationConfig};
pub use debug::PoolStats;
pub use engine::{Simulation, SimulationError};
pub use time::{FixedTimestep, MAX_STEP_SECONDS};
