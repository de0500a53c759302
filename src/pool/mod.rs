//! Entity pooling system
//!
//! Provides lifecycle-aware pooling with:
//! - Checked, shareable entity handles
//! - Thread-safe per-variant object pools
//! - A registry that spawns, tracks and sweeps active entities

mod error;
mod handle;
mod object_pool;
mod registry;

pub use error::{ConstructionError, PoolError};
pub use handle::EntityHandle;
pub use object_pool::{Constructor, ObjectPool};
pub use registry::{PoolRegistry, SweepReport};
