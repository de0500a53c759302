//! Entity handle implementation
//!
//! Provides checked, shareable handles to pooled entities. The owning pool
//! keeps one handle to every entity it ever created; clones are lent out to
//! the registry's active set and to callers of `spawn`.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

/// Global counter for generating unique entity IDs
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique entity ID
fn next_id() -> u64 {
    NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Shared state behind every handle to one entity
#[derive(Debug)]
struct EntitySlot<E> {
    /// The entity itself
    entity: Mutex<E>,
    /// ID of the pool that created this entity
    pool_id: u64,
    /// Cleared when the host world destroys the entity
    alive: AtomicBool,
    /// Set while the entity sits in its pool's free-list
    free: AtomicBool,
}

/// A handle to a pooled entity of type `E`.
///
/// Handles compare and hash by entity identity, not by entity contents.
#[derive(Debug)]
pub struct EntityHandle<E> {
    /// Unique identifier for this entity
    id: u64,
    /// Reference-counted pointer to the entity slot
    inner: Arc<EntitySlot<E>>,
}

impl<E> EntityHandle<E> {
    /// Wrap a freshly constructed entity owned by pool `pool_id`.
    pub(crate) fn new(entity: E, pool_id: u64) -> Self {
        Self {
            id: next_id(),
            inner: Arc::new(EntitySlot {
                entity: Mutex::new(entity),
                pool_id,
                alive: AtomicBool::new(true),
                free: AtomicBool::new(false),
            }),
        }
    }

    /// Get the unique ID of this entity
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Get the ID of the pool that owns this entity
    #[must_use]
    pub fn pool_id(&self) -> u64 {
        self.inner.pool_id
    }

    /// Lock the entity for reading or mutation.
    ///
    /// Do not hold the guard across calls into the registry.
    pub fn lock(&self) -> MutexGuard<'_, E> {
        self.inner.entity.lock()
    }

    /// Check if the entity is still live.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }

    /// Mark the entity as destroyed by something outside the pool.
    ///
    /// An invalidated entity found in the active set is dropped by the next
    /// sweep and never recycled.
    pub fn invalidate(&self) {
        self.inner.alive.store(false, Ordering::Release);
    }

    /// Check if the entity currently sits in its pool's free-list.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.inner.free.load(Ordering::Acquire)
    }

    /// Set the free-list marker, returning its previous value.
    pub(crate) fn set_free(&self, free: bool) -> bool {
        self.inner.free.swap(free, Ordering::AcqRel)
    }

    /// Get the strong reference count
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<E> Clone for EntityHandle<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> PartialEq for EntityHandle<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<E> Eq for EntityHandle<E> {}

impl<E> Hash for EntityHandle<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
