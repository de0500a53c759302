//! Pool registry: one pool per entity variant, plus the active set
//!
//! The registry is the only place entities move between "free" and "in play".
//! It owns one `ObjectPool` per variant key (created lazily), lends entities
//! out through `spawn`, and takes them back either explicitly through
//! `return_to_pool` or automatically during the per-step `sweep`.
//!
//! Every operation holds one registry-wide lock for its full duration, so
//! spawns, returns and sweeps observe a single total order. The lock is not
//! reentrant: entity callbacks run under it and must never call back into
//! the registry.
//!
//! Lock order is registry, then pool, then entity.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::error::PoolError;
use super::handle::EntityHandle;
use super::object_pool::ObjectPool;
use crate::core::PoolConfig;
use crate::lifecycle::{EntityFactory, PooledEntity, SpawnRequest};

/// Entity type produced by factory `F`
type EntityOf<F> = <F as EntityFactory>::Entity;

/// Spawn payload accepted by factory `F`'s entities
type PayloadOf<F> = <EntityOf<F> as PooledEntity>::Payload;

/// An entity currently in play, with the pool it must go back to.
struct ActiveEntity<E> {
    handle: EntityHandle<E>,
    pool: Arc<ObjectPool<E>>,
}

impl<E: PooledEntity> ActiveEntity<E> {
    /// Reset the entity and put it back on its pool's free-list.
    ///
    /// The entry must already be out of the active set.
    fn reclaim(self) {
        self.handle.lock().reset();
        self.pool.release(self.handle);
    }
}

/// State guarded by the registry lock.
struct RegistryState<V, E> {
    /// One pool per variant
    pools: FxHashMap<V, Arc<ObjectPool<E>>>,
    /// Entities in play, unique by identity
    active: Vec<ActiveEntity<E>>,
    /// Entities dropped because they were no longer valid
    lost: u64,
    /// Set by `shutdown`
    shut_down: bool,
}

impl<V, E> RegistryState<V, E> {
    fn active_index(&self, handle: &EntityHandle<E>) -> Option<usize> {
        self.active.iter().position(|entry| entry.handle == *handle)
    }
}

/// Outcome of one `sweep` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entities advanced this step
    pub advanced: usize,
    /// Entities reset and returned to their pools
    pub reclaimed: usize,
    /// Invalid entities dropped from the active set
    pub dropped: usize,
    /// Active entities left after the pass
    pub active: usize,
}

/// Owns per-variant pools and the set of active entities.
///
/// Share across threads as `Arc<PoolRegistry<F>>`.
pub struct PoolRegistry<F: EntityFactory> {
    /// Construction context shared by every pool
    factory: Arc<F>,
    /// Sizing policy
    config: PoolConfig,
    /// Pools and active set
    state: Mutex<RegistryState<F::Variant, EntityOf<F>>>,
}

impl<F: EntityFactory> PoolRegistry<F> {
    /// Create a registry with no pools.
    #[must_use]
    pub fn new(factory: F, config: PoolConfig) -> Self {
        Self {
            factory: Arc::new(factory),
            config,
            state: Mutex::new(RegistryState {
                pools: FxHashMap::default(),
                active: Vec::new(),
                lost: 0,
                shut_down: false,
            }),
        }
    }

    /// Sizing policy in effect.
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Construction context.
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Look up or lazily create the pool for `variant`.
    ///
    /// A new pool is pre-warmed with `initial_pool_size` entities. If that
    /// fails the pool stays registered with whatever was built, and the
    /// construction error is returned alongside it.
    fn pool_locked(
        &self,
        state: &mut RegistryState<F::Variant, EntityOf<F>>,
        variant: &F::Variant,
    ) -> (Arc<ObjectPool<EntityOf<F>>>, Result<(), PoolError>) {
        if let Some(pool) = state.pools.get(variant) {
            return (Arc::clone(pool), Ok(()));
        }

        let factory = Arc::clone(&self.factory);
        let key = variant.clone();
        let pool = Arc::new(ObjectPool::new(move || factory.construct(&key)));
        state.pools.insert(variant.clone(), Arc::clone(&pool));
        log::debug!("Created pool {} for {:?}", pool.id(), variant);

        let warmed = pool.grow(self.config.initial_pool_size).map(|_| ());
        (pool, warmed)
    }

    /// Get the pool for `variant`, creating and pre-warming it on first use.
    ///
    /// Repeated calls return the same pool. The pool is for inspection;
    /// acquiring from or releasing to it directly bypasses the active set.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::ShutDown` after shutdown, or the pre-warm
    /// construction error on the call that created the pool.
    pub fn get_or_create_pool(
        &self,
        variant: &F::Variant,
    ) -> Result<Arc<ObjectPool<EntityOf<F>>>, PoolError> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(PoolError::ShutDown);
        }

        let (pool, warmed) = self.pool_locked(&mut state, variant);
        warmed?;
        Ok(pool)
    }

    /// Grow the pool for `variant` to at least `count` entities, exactly.
    ///
    /// Unlike `ensure_pool_sized`, no minimum growth step applies. Returns
    /// the resulting pool size.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::ShutDown` or a construction error.
    pub fn prewarm(&self, variant: &F::Variant, count: usize) -> Result<usize, PoolError> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(PoolError::ShutDown);
        }

        let (pool, warmed) = self.pool_locked(&mut state, variant);
        warmed?;

        let size = pool.size();
        if size < count {
            return pool.grow(count - size);
        }
        Ok(size)
    }

    /// Make sure the pool for `variant` holds at least `desired_size`
    /// entities.
    ///
    /// Growth is never smaller than `minimum_growth_step`. Returns the
    /// resulting pool size.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::ShutDown` or a construction error; entities built
    /// before a failure stay in the pool.
    pub fn ensure_pool_sized(
        &self,
        variant: &F::Variant,
        desired_size: usize,
    ) -> Result<usize, PoolError> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(PoolError::ShutDown);
        }

        let (pool, warmed) = self.pool_locked(&mut state, variant);
        warmed?;

        let size = pool.size();
        if size < desired_size {
            let growth = (desired_size - size).max(self.config.minimum_growth_step);
            return pool.grow(growth);
        }
        Ok(size)
    }

    /// Put one entity of `request.variant` into play.
    ///
    /// Never grows a pool beyond its initial pre-warm: an empty free-list
    /// fails the spawn, leaving the active set untouched.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Exhausted` when no free entity is available, or
    /// `PoolError::ShutDown` after shutdown.
    pub fn spawn(
        &self,
        request: SpawnRequest<F::Variant, PayloadOf<F>>,
    ) -> Result<EntityHandle<EntityOf<F>>, PoolError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.shut_down {
            return Err(PoolError::ShutDown);
        }

        let (pool, warmed) = self.pool_locked(state, &request.variant);
        if let Err(e) = warmed {
            log::warn!("Spawning {:?} from a partial pool: {}", request.variant, e);
        }

        let handle = loop {
            match pool.acquire() {
                Some(handle) if handle.is_valid() => break handle,
                Some(handle) => {
                    log::warn!("Invalid entity {} in free-list, discarding", handle.id());
                    state.lost += 1;
                }
                None => {
                    log::warn!("Failed to spawn {:?}: pool exhausted", request.variant);
                    return Err(PoolError::Exhausted {
                        variant: format!("{:?}", request.variant),
                    });
                }
            }
        };

        {
            let mut entity = handle.lock();
            entity.place(&request.placement);
            entity.initialize(&request.payload);
        }

        state.active.push(ActiveEntity {
            handle: handle.clone(),
            pool,
        });
        Ok(handle)
    }

    /// Take `handle` out of play, reset it and release it to its pool.
    ///
    /// Idempotent: returns `false` and does nothing if the entity is not in
    /// the active set. An entity that is no longer valid is dropped instead
    /// of being released.
    pub fn return_to_pool(&self, handle: &EntityHandle<EntityOf<F>>) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(index) = state.active_index(handle) else {
            return false;
        };

        let entry = state.active.swap_remove(index);
        if entry.handle.is_valid() {
            entry.reclaim();
        } else {
            log::warn!("Returned entity {} is no longer valid, dropping", handle.id());
            state.lost += 1;
        }
        true
    }

    /// Advance every active entity by `delta_time` and reclaim finished ones.
    ///
    /// Intended to run exactly once per simulation step. Walks the active
    /// set from the back so `swap_remove` never disturbs an unvisited entry.
    pub fn sweep(&self, delta_time: f32) -> SweepReport {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mut report = SweepReport::default();

        if state.shut_down {
            return report;
        }

        for index in (0..state.active.len()).rev() {
            if !state.active[index].handle.is_valid() {
                let entry = state.active.swap_remove(index);
                log::warn!(
                    "Invalid entity {} found at index {}, removing",
                    entry.handle.id(),
                    index
                );
                state.lost += 1;
                report.dropped += 1;
                continue;
            }

            let finished = {
                let mut entity = state.active[index].handle.lock();
                entity.advance(delta_time);
                entity.should_deactivate()
            };
            report.advanced += 1;

            if finished {
                let entry = state.active.swap_remove(index);
                log::trace!("Deactivating entity {}", entry.handle.id());
                entry.reclaim();
                report.reclaimed += 1;
            }
        }

        report.active = state.active.len();
        log::trace!("{} active entities after sweep", report.active);
        report
    }

    /// Drop every pool and forget the active set.
    ///
    /// Later registry calls fail with `PoolError::ShutDown`; `sweep` becomes
    /// a no-op.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if state.shut_down {
            return;
        }

        log::info!(
            "Shutting down registry: {} pools, {} active entities",
            state.pools.len(),
            state.active.len()
        );
        state.active.clear();
        state.pools.clear();
        state.shut_down = true;
    }

    /// Check if `shutdown` has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shut_down
    }

    /// Total entities in the pool for `variant`, if it exists.
    #[must_use]
    pub fn pool_size(&self, variant: &F::Variant) -> Option<usize> {
        self.state.lock().pools.get(variant).map(|pool| pool.size())
    }

    /// Free entities in the pool for `variant`, if it exists.
    #[must_use]
    pub fn free_count(&self, variant: &F::Variant) -> Option<usize> {
        self.state.lock().pools.get(variant).map(|pool| pool.free_count())
    }

    /// Entities currently in play across all variants.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.lock().active.len()
    }

    /// Entities of `variant` currently in play.
    #[must_use]
    pub fn active_count_for(&self, variant: &F::Variant) -> usize {
        let state = self.state.lock();
        let Some(pool) = state.pools.get(variant) else {
            return 0;
        };
        state
            .active
            .iter()
            .filter(|entry| Arc::ptr_eq(&entry.pool, pool))
            .count()
    }

    /// Check if `handle` is in the active set.
    #[must_use]
    pub fn is_active(&self, handle: &EntityHandle<EntityOf<F>>) -> bool {
        self.state.lock().active_index(handle).is_some()
    }

    /// Entities permanently dropped because they were found invalid.
    #[must_use]
    pub fn lost_count(&self) -> u64 {
        self.state.lock().lost
    }

    /// Variants that currently have a pool.
    #[must_use]
    pub fn variants(&self) -> Vec<F::Variant> {
        self.state.lock().pools.keys().cloned().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
