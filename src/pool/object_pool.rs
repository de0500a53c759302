//! Object Pool for Heavyweight Entity Reuse
//!
//! This module provides a thread-safe pool that amortizes the cost of
//! constructing expensive entities (projectiles, effects) by never destroying
//! them. Every entity the pool creates is kept for the pool's lifetime and
//! recycled through a FIFO free-list.
//!
//! # Design Principles
//!
//! - **Acquire never allocates**: an empty free-list is reported, not grown
//! - **Monotonic growth**: entities are appended, never removed or compacted
//! - **One lock**: `acquire`, `release` and `grow` are serialized by a single
//!   pool-wide mutex
//!
//! # Example
//!
//! ```ignore
//! let pool = ObjectPool::new(|| Ok(Projectile::default()));
//! pool.grow(30)?;
//!
//! if let Some(handle) = pool.acquire() {
//!     // ... use the entity, reset it, then:
//!     pool.release(handle);
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::error::{ConstructionError, PoolError};
use super::handle::EntityHandle;

/// Global counter for generating unique pool IDs
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Builds one new entity for a pool.
pub type Constructor<E> = Box<dyn Fn() -> Result<E, ConstructionError> + Send + Sync>;

// ============================================================================
// Pool State
// ============================================================================

/// State guarded by the pool lock.
struct PoolInner<E> {
    /// Every entity ever created, in creation order
    all_objects: Vec<EntityHandle<E>>,
    /// Entities available for acquisition
    free_objects: VecDeque<EntityHandle<E>>,
    /// Mirrors `all_objects.len()`
    pool_size: usize,
    /// Mirrors `free_objects.len()`
    free_count: usize,
}

// ============================================================================
// Object Pool
// ============================================================================

/// A growable, thread-safe pool of entities of one variant.
///
/// # Performance Characteristics
///
/// | Operation | Time Complexity             |
/// |-----------|-----------------------------|
/// | `acquire` | O(1)                        |
/// | `release` | O(1)                        |
/// | `grow`    | O(n) constructions          |
/// | `size`    | O(1)                        |
pub struct ObjectPool<E> {
    /// Unique identifier, stamped into every handle this pool creates
    id: u64,
    /// Construction dependency
    constructor: Constructor<E>,
    /// Entity storage and free-list
    inner: Mutex<PoolInner<E>>,
}

impl<E> ObjectPool<E> {
    /// Create an empty pool that builds entities with `constructor`.
    #[must_use]
    pub fn new<C>(constructor: C) -> Self
    where
        C: Fn() -> Result<E, ConstructionError> + Send + Sync + 'static,
    {
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            constructor: Box::new(constructor),
            inner: Mutex::new(PoolInner {
                all_objects: Vec::new(),
                free_objects: VecDeque::new(),
                pool_size: 0,
                free_count: 0,
            }),
        }
    }

    /// Create a pool pre-warmed with `initial_size` free entities.
    ///
    /// All or nothing: if construction fails, the partly built pool is
    /// dropped. Use `new` followed by `grow` to keep whatever was built.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Construction` if any entity fails to build.
    pub fn with_initial_size<C>(constructor: C, initial_size: usize) -> Result<Self, PoolError>
    where
        C: Fn() -> Result<E, ConstructionError> + Send + Sync + 'static,
    {
        let pool = Self::new(constructor);
        pool.grow(initial_size)?;
        Ok(pool)
    }

    /// Get the unique ID of this pool
    #[must_use]
    #[inline]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Take one free entity, or `None` if the free-list is empty.
    ///
    /// Never constructs; callers grow the pool ahead of demand.
    pub fn acquire(&self) -> Option<EntityHandle<E>> {
        let mut inner = self.inner.lock();
        let handle = inner.free_objects.pop_front()?;
        inner.free_count -= 1;
        handle.set_free(false);
        Some(handle)
    }

    /// Put an entity back on the free-list.
    ///
    /// The caller guarantees the entity came from this pool and is released
    /// at most once per acquisition. Violations panic in debug builds and
    /// are ignored otherwise.
    pub fn release(&self, handle: EntityHandle<E>) {
        debug_assert_eq!(
            handle.pool_id(),
            self.id,
            "entity {} released to a foreign pool",
            handle.id()
        );
        if handle.pool_id() != self.id {
            return;
        }

        let was_free = handle.set_free(true);
        debug_assert!(!was_free, "double release of entity {}", handle.id());
        if was_free {
            return;
        }

        let mut inner = self.inner.lock();
        inner.free_objects.push_back(handle);
        inner.free_count += 1;
        debug_assert!(inner.free_count <= inner.pool_size);
    }

    /// Construct `growth_size` new entities and make them available.
    ///
    /// Returns the new pool size. Construction stops at the first failure;
    /// entities built before it are kept.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Construction` with the number actually built.
    pub fn grow(&self, growth_size: usize) -> Result<usize, PoolError> {
        let mut inner = self.inner.lock();

        for constructed in 0..growth_size {
            let entity = match (self.constructor)() {
                Ok(entity) => entity,
                Err(source) => {
                    log::error!(
                        "Pool {} grew by {} of {}: {}",
                        self.id,
                        constructed,
                        growth_size,
                        source
                    );
                    return Err(PoolError::Construction {
                        requested: growth_size,
                        constructed,
                        source,
                    });
                }
            };

            let handle = EntityHandle::new(entity, self.id);
            handle.set_free(true);
            inner.all_objects.push(handle.clone());
            inner.free_objects.push_back(handle);
            inner.pool_size += 1;
            inner.free_count += 1;
        }

        log::debug!(
            "Pool {} grew by {} to {} entities",
            self.id,
            growth_size,
            inner.pool_size
        );
        Ok(inner.pool_size)
    }

    /// Total entities ever created by this pool.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.lock().pool_size
    }

    /// Entities currently available for acquisition.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.inner.lock().free_count
    }

    /// Check if `handle` was created by this pool.
    #[must_use]
    pub fn owns(&self, handle: &EntityHandle<E>) -> bool {
        handle.pool_id() == self.id
    }
}

impl<E> fmt::Debug for ObjectPool<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ObjectPool")
            .field("id", &self.id)
            .field("pool_size", &inner.pool_size)
            .field("free_count", &inner.free_count)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
