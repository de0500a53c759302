//! Pooled projectiles
//!
//! The concrete entity managed by the pool registry:
//! - `Projectile` implementing the lifecycle contract
//! - Spawn payload, damage parameters and impact reports
//! - Variant catalog and the factory that builds projectiles

mod data;
mod entity;
mod factory;

pub use data::{DamageParams, Impact, ProjectileData};
pub use entity::Projectile;
pub use factory::{ProjectileFactory, ProjectileKind, ProjectileSpec};
