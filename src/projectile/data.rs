//! Spawn payload and impact reports for projectiles

use glam::Vec3;
use hecs::Entity;

/// Damage carried by a projectile, applied by an external damage system
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageParams {
    /// Damage dealt on impact
    pub base_damage: f32,
    /// Impulse magnitude applied to the target
    pub knockback: f32,
}

impl DamageParams {
    /// Create damage parameters
    #[must_use]
    pub const fn new(base_damage: f32, knockback: f32) -> Self {
        Self {
            base_damage,
            knockback,
        }
    }
}

/// Per-spawn parameters consumed by `Projectile::initialize`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectileData {
    /// Overrides the variant's default speed
    pub speed: Option<f32>,
    /// Damage to deliver on impact
    pub damage: DamageParams,
    /// Actor that fired the projectile
    pub instigator: Option<Entity>,
}

impl ProjectileData {
    /// Create a payload using the variant's defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the launch speed
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Set the damage to deliver
    #[must_use]
    pub fn with_damage(mut self, damage: DamageParams) -> Self {
        self.damage = damage;
        self
    }

    /// Set the firing actor
    #[must_use]
    pub fn with_instigator(mut self, instigator: Entity) -> Self {
        self.instigator = Some(instigator);
        self
    }
}

/// An impact for the damage system to resolve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Actor that was struck
    pub target: Entity,
    /// Actor that fired the projectile, if any
    pub instigator: Option<Entity>,
    /// Damage to apply
    pub damage: DamageParams,
    /// Where the projectile was when it struck
    pub location: Vec3,
}
