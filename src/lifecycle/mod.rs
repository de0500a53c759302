//! Entity lifecycle contract
//!
//! Provides what a pooled entity must implement:
//! - The `PooledEntity` and `EntityFactory` traits
//! - Spawn placement and requests
//! - A reusable `Lifecycle` state machine

mod contract;
mod state;

pub use contract::{EntityFactory, Placement, PooledEntity, SpawnRequest};
pub use state::{Lifecycle, LifecycleState, TerminalCause};
