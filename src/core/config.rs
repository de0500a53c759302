//! Simulation configuration
//!
//! Supports loading and saving configuration in RON (Rusty Object Notation)
//! and loading it from JSON. Every field has a default, so a file only needs
//! to name what it overrides.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::time::MAX_STEP_SECONDS;
use crate::projectile::{ProjectileKind, ProjectileSpec};

/// Pool sizing policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Entities built when a pool is first created
    pub initial_pool_size: usize,
    /// Smallest growth `ensure_pool_sized` will perform
    pub minimum_growth_step: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_pool_size: 100,
            minimum_growth_step: 20,
        }
    }
}

impl PoolConfig {
    /// Set the pre-warm size of new pools
    pub fn with_initial_pool_size(mut self, size: usize) -> Self {
        self.initial_pool_size = size;
        self
    }

    /// Set the growth floor
    pub fn with_minimum_growth_step(mut self, step: usize) -> Self {
        self.minimum_growth_step = step;
        self
    }
}

/// A pool to size at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrewarmEntry {
    /// Projectile variant
    pub kind: ProjectileKind,
    /// Pool size to reach
    pub count: usize,
}

/// Top-level configuration for a pooled projectile simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds per simulation step
    pub fixed_delta: f32,
    /// Most steps a single `advance` call may run when catching up
    pub max_steps_per_advance: u32,
    /// Pool sizing policy
    pub pools: PoolConfig,
    /// Per-variant projectile defaults
    pub projectiles: BTreeMap<ProjectileKind, ProjectileSpec>,
    /// Pools to size when the simulation starts
    pub prewarm: Vec<PrewarmEntry>,
    /// Cap on projectiles the world may ever construct (None for unlimited)
    pub actor_budget: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let pools = PoolConfig::default();
        let mut projectiles = BTreeMap::new();
        projectiles.insert(ProjectileKind::default(), ProjectileSpec::default());

        Self {
            fixed_delta: 1.0 / 60.0,
            max_steps_per_advance: 8,
            prewarm: vec![PrewarmEntry {
                kind: ProjectileKind::default(),
                count: pools.initial_pool_size,
            }],
            pools,
            projectiles,
            actor_budget: None,
        }
    }
}

impl SimulationConfig {
    /// Set the step length in seconds
    pub fn with_fixed_delta(mut self, fixed_delta: f32) -> Self {
        self.fixed_delta = fixed_delta;
        self
    }

    /// Set how many steps one `advance` may run when catching up
    pub fn with_max_steps_per_advance(mut self, max_steps: u32) -> Self {
        self.max_steps_per_advance = max_steps;
        self
    }

    /// Set the pool sizing policy
    pub fn with_pools(mut self, pools: PoolConfig) -> Self {
        self.pools = pools;
        self
    }

    /// Add or replace a projectile variant
    pub fn with_projectile(mut self, kind: impl Into<ProjectileKind>, spec: ProjectileSpec) -> Self {
        self.projectiles.insert(kind.into(), spec);
        self
    }

    /// Size a pool at startup
    pub fn with_prewarm(mut self, kind: impl Into<ProjectileKind>, count: usize) -> Self {
        self.prewarm.push(PrewarmEntry {
            kind: kind.into(),
            count,
        });
        self
    }

    /// Drop all startup pool sizing
    pub fn without_prewarm(mut self) -> Self {
        self.prewarm.clear();
        self
    }

    /// Cap the number of projectiles the world may construct
    pub fn with_actor_budget(mut self, budget: usize) -> Self {
        self.actor_budget = Some(budget);
        self
    }

    /// Check values that would make the simulation misbehave
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_delta > 0.0 && self.fixed_delta <= MAX_STEP_SECONDS) {
            return Err(ConfigError::Invalid(format!(
                "fixed_delta must be in (0, {MAX_STEP_SECONDS}], got {}",
                self.fixed_delta
            )));
        }

        if self.max_steps_per_advance == 0 {
            return Err(ConfigError::Invalid(
                "max_steps_per_advance must be at least 1".to_string(),
            ));
        }

        for (kind, spec) in &self.projectiles {
            if !(spec.lifespan.is_finite() && spec.lifespan > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "lifespan of {kind} must be positive, got {}",
                    spec.lifespan
                )));
            }
            if !spec.speed.is_finite() || spec.speed < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "speed of {kind} must be non-negative, got {}",
                    spec.speed
                )));
            }
        }

        if let Some(entry) = self
            .prewarm
            .iter()
            .find(|entry| !self.projectiles.contains_key(&entry.kind))
        {
            return Err(ConfigError::Invalid(format!(
                "prewarm names unknown projectile {}",
                entry.kind
            )));
        }

        Ok(())
    }

    /// Parse a configuration from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// Parsed but unusable values
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
