//! Projectile variants and the world that constructs them

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use super::entity::Projectile;
use crate::core::SimulationConfig;
use crate::lifecycle::EntityFactory;
use crate::pool::ConstructionError;

/// Name of a projectile variant; keys one pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectileKind(String);

impl ProjectileKind {
    /// Create a kind from its name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the variant name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectileKind {
    fn default() -> Self {
        Self::new("default")
    }
}

impl From<&str> for ProjectileKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ProjectileKind {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ProjectileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Defaults shared by every projectile of one variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSpec {
    /// Seconds before the projectile expires
    pub lifespan: f32,
    /// Launch speed in units per second
    pub speed: f32,
}

impl ProjectileSpec {
    /// Create a variant spec
    #[must_use]
    pub const fn new(lifespan: f32, speed: f32) -> Self {
        Self { lifespan, speed }
    }
}

impl Default for ProjectileSpec {
    fn default() -> Self {
        Self::new(5.0, 3000.0)
    }
}

/// Constructs projectiles for the variants it knows about.
///
/// An optional actor budget caps how many projectiles the world will ever
/// build; once spent, construction fails.
#[derive(Debug)]
pub struct ProjectileFactory {
    /// Known variants
    catalog: BTreeMap<ProjectileKind, ProjectileSpec>,
    /// Construction cap
    budget: Option<usize>,
    /// Projectiles built so far
    constructed: AtomicUsize,
}

impl ProjectileFactory {
    /// Create a factory for the given variants
    #[must_use]
    pub fn new(catalog: BTreeMap<ProjectileKind, ProjectileSpec>) -> Self {
        Self {
            catalog,
            budget: None,
            constructed: AtomicUsize::new(0),
        }
    }

    /// Create a factory from the variants and budget in `config`
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        let factory = Self::new(config.projectiles.clone());
        match config.actor_budget {
            Some(budget) => factory.with_budget(budget),
            None => factory,
        }
    }

    /// Cap the number of projectiles this factory will build
    #[must_use]
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Get the spec for a variant
    #[must_use]
    pub fn spec(&self, kind: &ProjectileKind) -> Option<&ProjectileSpec> {
        self.catalog.get(kind)
    }

    /// Projectiles built so far
    #[must_use]
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::Acquire)
    }

    /// Reserve one unit of budget, failing if none is left
    fn reserve(&self) -> Result<(), ConstructionError> {
        let budget = self.budget;
        self.constructed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| match budget {
                Some(limit) if n >= limit => None,
                _ => Some(n + 1),
            })
            .map(|_| ())
            .map_err(|_| ConstructionError::BudgetExhausted {
                budget: budget.unwrap_or(0),
            })
    }
}

impl EntityFactory for ProjectileFactory {
    type Entity = Projectile;
    type Variant = ProjectileKind;

    fn construct(&self, kind: &ProjectileKind) -> Result<Projectile, ConstructionError> {
        let spec = self
            .catalog
            .get(kind)
            .ok_or_else(|| ConstructionError::UnknownVariant(kind.to_string()))?;
        self.reserve()?;
        Ok(Projectile::new(kind.clone(), *spec))
    }
}
