//! Lifecycle-aware object pooling for short-lived simulation entities
//!
//! This crate provides:
//! - Thread-safe, growable object pools of heavyweight entities
//! - A registry keeping one pool per variant and the set of active entities
//! - A per-step sweep that advances active entities and reclaims finished ones
//! - Pooled projectiles and a fixed-step simulation driver built on top

pub mod core;
pub mod lifecycle;
pub mod pool;
pub mod projectile;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{PoolConfig, PoolStats, Simulation, SimulationConfig};
    pub use crate::lifecycle::{
        EntityFactory, Lifecycle, LifecycleState, Placement, PooledEntity, SpawnRequest,
        TerminalCause,
    };
    pub use crate::pool::{
        ConstructionError, EntityHandle, ObjectPool, PoolError, PoolRegistry, SweepReport,
    };
    pub use crate::projectile::{
        DamageParams, Impact, Projectile, ProjectileData, ProjectileFactory, ProjectileKind,
        ProjectileSpec,
    };
    pub use glam::{Quat, Vec3};
}
