//! The capability set an entity needs to participate in pooling.

use std::fmt;
use std::hash::Hash;

use glam::{Quat, Vec3};

use super::state::LifecycleState;
use crate::pool::ConstructionError;

/// Where and which way a freshly spawned entity faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// World-space spawn location
    pub location: Vec3,
    /// Travel direction (need not be normalized)
    pub direction: Vec3,
}

impl Placement {
    /// Forward axis that a zero rotation faces along.
    pub const FORWARD: Vec3 = Vec3::X;

    /// Create a placement at `location` facing `direction`.
    #[must_use]
    pub const fn new(location: Vec3, direction: Vec3) -> Self {
        Self {
            location,
            direction,
        }
    }

    /// Unit direction, or `FORWARD` if the direction is degenerate.
    #[must_use]
    pub fn heading(&self) -> Vec3 {
        self.direction.try_normalize().unwrap_or(Self::FORWARD)
    }

    /// Rotation taking `FORWARD` onto the heading.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_arc(Self::FORWARD, self.heading())
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Self::FORWARD)
    }
}

/// Everything needed to put one entity into play.
#[derive(Debug, Clone)]
pub struct SpawnRequest<V, P> {
    /// Which pool to draw from
    pub variant: V,
    /// Per-spawn parameters handed to `PooledEntity::initialize`
    pub payload: P,
    /// Spawn location and facing
    pub placement: Placement,
}

impl<V, P> SpawnRequest<V, P> {
    /// Create a spawn request.
    pub fn new(variant: V, payload: P, placement: Placement) -> Self {
        Self {
            variant,
            payload,
            placement,
        }
    }
}

/// An entity that can be lent out by a pool and reclaimed by the registry.
///
/// The registry calls these methods while holding its own lock, so
/// implementations must never call back into the registry.
///
/// The lifecycle is:
///
/// 1. `place()` + `initialize()` - when acquired for a spawn
/// 2. `advance()` then `should_deactivate()` - once per sweep while active
/// 3. `reset()` - before being released back to the free-list
pub trait PooledEntity: Send + 'static {
    /// Per-spawn parameters.
    type Payload;

    /// Apply spawn location and facing. Called just before `initialize`.
    fn place(&mut self, placement: &Placement);

    /// Arm the entity for simulation: `Inactive -> Active`.
    ///
    /// Calling this on an entity that is not inactive is a programming error.
    fn initialize(&mut self, payload: &Self::Payload);

    /// One simulation step. No-op once terminal.
    fn advance(&mut self, delta_time: f32);

    /// Whether the entity has finished and should be reclaimed.
    fn should_deactivate(&self) -> bool;

    /// Clear all per-spawn state and return to `Inactive`, unconditionally.
    fn reset(&mut self);

    /// Current lifecycle state.
    fn lifecycle_state(&self) -> LifecycleState;
}

/// Construction context for one family of pooled entities.
///
/// Builds a single entity of the requested variant, or reports why it
/// could not.
pub trait EntityFactory: Send + Sync + 'static {
    /// The entity type produced.
    type Entity: PooledEntity;
    /// Key identifying one pool.
    type Variant: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static;

    /// Construct one inactive entity of `variant`.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot produce the entity.
    fn construct(&self, variant: &Self::Variant) -> Result<Self::Entity, ConstructionError>;
}
