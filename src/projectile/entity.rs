//! Pooled projectile entity
//!
//! A projectile flies in a straight line from its placement until it either
//! strikes something or outlives its variant's lifespan. Damage resolution,
//! collision detection and effects live elsewhere: the projectile only
//! reports an `Impact` and finishes.

use glam::{Quat, Vec3};
use hecs::Entity;

use super::data::{DamageParams, Impact, ProjectileData};
use super::factory::{ProjectileKind, ProjectileSpec};
use crate::lifecycle::{Lifecycle, LifecycleState, Placement, PooledEntity, TerminalCause};

/// A reusable projectile.
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Variant this projectile belongs to
    kind: ProjectileKind,
    /// Variant defaults
    spec: ProjectileSpec,
    /// Lifecycle state and elapsed lifetime
    lifecycle: Lifecycle,
    /// World-space position
    position: Vec3,
    /// Facing
    rotation: Quat,
    /// Units per second
    velocity: Vec3,
    /// Launch speed for the current flight
    speed: f32,
    /// Damage delivered on impact
    damage: DamageParams,
    /// Actor that fired this projectile
    instigator: Option<Entity>,
    /// Rendered this frame
    visible: bool,
    /// Participates in overlap tests
    collision_enabled: bool,
}

impl Projectile {
    /// Create an inactive, hidden projectile of `kind`.
    #[must_use]
    pub fn new(kind: ProjectileKind, spec: ProjectileSpec) -> Self {
        Self {
            kind,
            spec,
            lifecycle: Lifecycle::new(spec.lifespan),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            speed: spec.speed,
            damage: DamageParams::default(),
            instigator: None,
            visible: false,
            collision_enabled: false,
        }
    }

    /// Variant of this projectile
    #[must_use]
    pub fn kind(&self) -> &ProjectileKind {
        &self.kind
    }

    /// Lifecycle bookkeeping
    #[must_use]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Name of the current lifecycle state
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        self.lifecycle.state().name()
    }

    /// World-space position
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Facing
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Current velocity
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Launch speed
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Damage carried
    #[must_use]
    pub fn damage(&self) -> DamageParams {
        self.damage
    }

    /// Actor that fired this projectile
    #[must_use]
    pub fn owning_actor(&self) -> Option<Entity> {
        self.instigator
    }

    /// Check if the projectile should be drawn
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Check if the projectile takes part in overlap tests
    #[must_use]
    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    /// Check if touching `other` should count as an impact.
    ///
    /// The firing actor is never a valid target, and a projectile that is
    /// not in flight hits nothing.
    #[must_use]
    pub fn is_valid_overlap(&self, other: Entity) -> bool {
        self.lifecycle.is_active() && self.instigator != Some(other)
    }

    /// End the flight early. Returns `false` if it had already ended.
    pub fn on_hit(&mut self) -> bool {
        if !self.lifecycle.terminate(TerminalCause::Hit) {
            return false;
        }
        self.deactivate();
        true
    }

    /// Resolve an overlap with `other`.
    ///
    /// Returns the impact for the damage system, or `None` if the overlap
    /// does not count. A second overlap in the same step reports nothing.
    pub fn handle_impact(&mut self, other: Entity) -> Option<Impact> {
        if !self.is_valid_overlap(other) {
            return None;
        }

        let impact = Impact {
            target: other,
            instigator: self.instigator,
            damage: self.damage,
            location: self.position,
        };
        self.on_hit();
        Some(impact)
    }

    /// Stop moving and drop out of rendering and collision.
    fn deactivate(&mut self) {
        self.velocity = Vec3::ZERO;
        self.visible = false;
        self.collision_enabled = false;
    }
}

impl PooledEntity for Projectile {
    type Payload = ProjectileData;

    fn place(&mut self, placement: &Placement) {
        self.position = placement.location;
        self.rotation = placement.rotation();
    }

    fn initialize(&mut self, data: &ProjectileData) {
        self.lifecycle.activate();

        self.speed = data.speed.unwrap_or(self.spec.speed);
        self.velocity = self.rotation * Placement::FORWARD * self.speed;
        self.damage = data.damage;
        self.instigator = data.instigator;
        self.visible = true;
        self.collision_enabled = true;
    }

    fn advance(&mut self, delta_time: f32) {
        if !self.lifecycle.is_active() {
            return;
        }

        self.position += self.velocity * delta_time;
        if self.lifecycle.tick(delta_time) {
            self.deactivate();
        }
    }

    fn should_deactivate(&self) -> bool {
        self.lifecycle.should_deactivate()
    }

    fn reset(&mut self) {
        self.lifecycle.reset();
        self.position = Vec3::ZERO;
        self.rotation = Quat::IDENTITY;
        self.speed = self.spec.speed;
        self.damage = DamageParams::default();
        self.instigator = None;
        self.deactivate();
    }

    fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile() -> Projectile {
        Projectile::new(ProjectileKind::from("bolt"), ProjectileSpec::new(1.0, 10.0))
    }

    fn actors() -> (Entity, Entity) {
        let mut world = hecs::World::new();
        (world.spawn((1_u32,)), world.spawn((2_u32,)))
    }

    fn launched(data: &ProjectileData) -> Projectile {
        let mut projectile = projectile();
        projectile.place(&Placement::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Y));
        projectile.initialize(data);
        projectile
    }

    #[test]
    fn test_projectile_starts_inactive() {
        let projectile = projectile();

        assert_eq!(projectile.state_name(), "Inactive");
        assert!(!projectile.is_visible());
        assert!(!projectile.collision_enabled());
        assert!(!projectile.should_deactivate());
    }

    #[test]
    fn test_projectile_initialize_launches_along_direction() {
        let projectile = launched(&ProjectileData::new());

        assert_eq!(projectile.lifecycle_state(), LifecycleState::Active);
        assert!(projectile.velocity().abs_diff_eq(Vec3::new(0.0, 10.0, 0.0), 1e-4));
        assert!(projectile.is_visible());
        assert!(projectile.collision_enabled());
    }

    #[test]
    fn test_projectile_speed_override() {
        let projectile = launched(&ProjectileData::new().with_speed(2.0));

        assert_eq!(projectile.speed(), 2.0);
        assert!(projectile.velocity().abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_projectile_advance_moves() {
        let mut projectile = launched(&ProjectileData::new());
        projectile.advance(0.5);

        assert!(projectile.position().abs_diff_eq(Vec3::new(1.0, 5.0, 0.0), 1e-4));
        assert!(!projectile.should_deactivate());
    }

    #[test]
    fn test_projectile_expires() {
        let mut projectile = launched(&ProjectileData::new());
        projectile.advance(0.5);
        projectile.advance(0.5);

        assert_eq!(
            projectile.lifecycle_state(),
            LifecycleState::Terminal(TerminalCause::Expired)
        );
        assert!(projectile.should_deactivate());
        assert!(!projectile.is_visible());

        let resting = projectile.position();
        projectile.advance(0.5);
        assert_eq!(projectile.position(), resting);
    }

    #[test]
    fn test_projectile_on_hit_is_idempotent() {
        let mut projectile = launched(&ProjectileData::new());

        assert!(projectile.on_hit());
        assert!(!projectile.on_hit());
        assert_eq!(projectile.state_name(), "Terminal(Hit)");
        assert!(projectile.should_deactivate());
        assert!(!projectile.collision_enabled());
    }

    #[test]
    fn test_projectile_ignores_owner() {
        let (owner, target) = actors();
        let mut projectile = launched(&ProjectileData::new().with_instigator(owner));

        assert_eq!(projectile.owning_actor(), Some(owner));
        assert!(!projectile.is_valid_overlap(owner));
        assert!(projectile.handle_impact(owner).is_none());
        assert!(projectile.is_valid_overlap(target));
    }

    #[test]
    fn test_projectile_handle_impact_once() {
        let (owner, target) = actors();
        let damage = DamageParams::new(25.0, 3.0);
        let mut projectile = launched(
            &ProjectileData::new()
                .with_instigator(owner)
                .with_damage(damage),
        );

        let impact = projectile.handle_impact(target).unwrap();
        assert_eq!(impact.target, target);
        assert_eq!(impact.instigator, Some(owner));
        assert_eq!(impact.damage, damage);

        // Same overlap reported twice in one step
        assert!(projectile.handle_impact(target).is_none());
    }

    #[test]
    fn test_projectile_reset_clears_flight() {
        let (owner, _) = actors();
        let mut projectile = launched(
            &ProjectileData::new()
                .with_speed(99.0)
                .with_instigator(owner)
                .with_damage(DamageParams::new(5.0, 0.0)),
        );
        projectile.advance(0.25);
        projectile.on_hit();

        projectile.reset();

        assert_eq!(projectile.lifecycle_state(), LifecycleState::Inactive);
        assert_eq!(projectile.position(), Vec3::ZERO);
        assert_eq!(projectile.rotation(), Quat::IDENTITY);
        assert_eq!(projectile.speed(), 10.0);
        assert_eq!(projectile.damage(), DamageParams::default());
        assert_eq!(projectile.owning_actor(), None);
        assert_eq!(projectile.lifecycle().elapsed(), 0.0);

        // Reset is repeatable
        projectile.reset();
        assert_eq!(projectile.lifecycle_state(), LifecycleState::Inactive);
    }
}
