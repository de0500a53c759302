//! Simulation driver and fixed-step loop

use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{ConfigError, SimulationConfig};
use crate::core::debug::PoolStats;
use crate::core::time::FixedTimestep;
use crate::lifecycle::{Placement, SpawnRequest};
use crate::pool::{EntityHandle, PoolError, PoolRegistry, SweepReport};
use crate::projectile::{Projectile, ProjectileData, ProjectileFactory, ProjectileKind};

/// Errors that can occur while starting a simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Configuration was rejected
    Config(ConfigError),
    /// Startup pool sizing failed
    Pool(PoolError),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Config error: {e}"),
            Self::Pool(e) => write!(f, "Pool error: {e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Pool(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PoolError> for SimulationError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

/// A pooled projectile session.
///
/// Owns the pool registry for its lifetime and sweeps it exactly once per
/// fixed step. Other threads may spawn and return projectiles through a
/// clone of `registry()` while the owning thread steps.
pub struct Simulation {
    config: SimulationConfig,
    registry: Arc<PoolRegistry<ProjectileFactory>>,
    time: FixedTimestep,
    stats: PoolStats,
}

impl Simulation {
    /// Validate `config`, build the registry and size the startup pools.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a startup pool
    /// cannot be fully built.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let factory = ProjectileFactory::from_config(&config);
        let registry = Arc::new(PoolRegistry::new(factory, config.pools.clone()));

        for entry in &config.prewarm {
            let size = registry.prewarm(&entry.kind, entry.count)?;
            log::debug!("Pre-warmed {} pool to {}", entry.kind, size);
        }

        log::info!(
            "Simulation started: step {:.4}s, {} variants",
            config.fixed_delta,
            config.projectiles.len()
        );

        Ok(Self {
            time: FixedTimestep::new(config.fixed_delta, config.max_steps_per_advance),
            config,
            registry,
            stats: PoolStats::new(),
        })
    }

    /// Configuration in effect
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Shared pool registry
    pub fn registry(&self) -> &Arc<PoolRegistry<ProjectileFactory>> {
        &self.registry
    }

    /// Running sweep statistics
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Fixed step accumulator
    pub fn time(&self) -> &FixedTimestep {
        &self.time
    }

    /// Fire one projectile of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Exhausted` when the pool is empty, which is also
    /// counted in `stats().spawn_failures()`, or `PoolError::ShutDown`.
    pub fn spawn(
        &mut self,
        kind: impl Into<ProjectileKind>,
        data: ProjectileData,
        placement: Placement,
    ) -> Result<EntityHandle<Projectile>, PoolError> {
        let result = self
            .registry
            .spawn(SpawnRequest::new(kind.into(), data, placement));
        if let Err(PoolError::Exhausted { .. }) = &result {
            self.stats.record_spawn_failure();
        }
        result
    }

    /// Run exactly one simulation step.
    pub fn step(&mut self) -> SweepReport {
        self.time.count_step();
        self.sweep_once()
    }

    /// Feed `elapsed` wall-clock time and run the steps it pays for.
    ///
    /// Returns the number of steps run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let steps = self.time.accumulate(elapsed);
        for _ in 0..steps {
            self.sweep_once();
        }
        steps
    }

    fn sweep_once(&mut self) -> SweepReport {
        let report = self.registry.sweep(self.time.delta());
        if report.dropped > 0 {
            log::warn!("{} projectiles lost this step", report.dropped);
        }
        self.stats.record_sweep(report);
        report
    }

    /// End the session, dropping every pool.
    pub fn shutdown(&mut self) {
        log::info!("Simulation shutting down: {}", self.stats);
        self.registry.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PoolConfig;
    use crate::projectile::ProjectileSpec;
    use glam::Vec3;

    fn small_config() -> SimulationConfig {
        SimulationConfig::default()
            .with_fixed_delta(0.25)
            .with_pools(
                PoolConfig::default()
                    .with_initial_pool_size(0)
                    .with_minimum_growth_step(1),
            )
            .without_prewarm()
            .with_projectile("dart", ProjectileSpec::new(1.0, 4.0))
            .with_prewarm("dart", 3)
    }

    #[test]
    fn test_simulation_prewarms_pools() {
        let sim = Simulation::new(small_config()).unwrap();

        assert_eq!(sim.registry().pool_size(&"dart".into()), Some(3));
        assert_eq!(sim.registry().pool_size(&ProjectileKind::default()), None);
    }

    #[test]
    fn test_simulation_rejects_invalid_config() {
        let err = Simulation::new(SimulationConfig::default().with_fixed_delta(-1.0)).err();
        assert!(matches!(err, Some(SimulationError::Config(_))));
    }

    #[test]
    fn test_simulation_prewarm_over_budget() {
        let err = Simulation::new(small_config().with_actor_budget(2)).err();
        assert!(matches!(
            err,
            Some(SimulationError::Pool(PoolError::Construction { constructed: 2, .. }))
        ));
    }

    #[test]
    fn test_simulation_steps_reclaim_expired() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let handle = sim
            .spawn("dart", ProjectileData::new(), Placement::new(Vec3::ZERO, Vec3::X))
            .unwrap();

        for _ in 0..3 {
            sim.step();
        }
        assert!(sim.registry().is_active(&handle));
        assert!(handle.lock().position().abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-4));

        let report = sim.step();
        assert_eq!(report.reclaimed, 1);
        assert!(handle.is_free());
        assert_eq!(sim.stats().reclaimed(), 1);
        assert_eq!(sim.time().total_steps(), 4);
    }

    #[test]
    fn test_simulation_advance_runs_fixed_steps() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.spawn("dart", ProjectileData::new(), Placement::default())
            .unwrap();

        assert_eq!(sim.advance(Duration::from_millis(600)), 2);
        assert_eq!(sim.stats().steps(), 2);
        assert_eq!(sim.registry().active_count(), 1);

        assert_eq!(sim.advance(Duration::from_millis(400)), 2);
        assert_eq!(sim.registry().active_count(), 0);
    }

    #[test]
    fn test_simulation_counts_refused_spawns() {
        let mut sim = Simulation::new(small_config()).unwrap();

        for _ in 0..4 {
            let _ = sim.spawn("dart", ProjectileData::new(), Placement::default());
        }

        assert_eq!(sim.stats().spawn_failures(), 1);
        assert_eq!(sim.registry().active_count(), 3);
    }

    #[test]
    fn test_simulation_shutdown() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.spawn("dart", ProjectileData::new(), Placement::default())
            .unwrap();

        sim.shutdown();

        assert!(sim.registry().is_shut_down());
        assert_eq!(
            sim.spawn("dart", ProjectileData::new(), Placement::default())
                .unwrap_err(),
            PoolError::ShutDown
        );
        assert_eq!(sim.stats().spawn_failures(), 0);
    }

    #[test]
    fn test_simulation_rejects_unrepresentable_step() {
        let err = Simulation::new(small_config().with_fixed_delta(1e30)).err();
        assert!(matches!(err, Some(SimulationError::Config(ConfigError::Invalid(_)))));

        let err = Simulation::new(small_config().with_max_steps_per_advance(0)).err();
        assert!(matches!(err, Some(SimulationError::Config(ConfigError::Invalid(_)))));
    }
}
