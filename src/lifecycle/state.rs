//! Lifecycle State Machine for Pooled Entities
//!
//! Every pooled entity walks the same small state machine, independent of
//! what it does while in play:
//!
//! ```text
//! Inactive --initialize--> Active --hit / lifespan--> Terminal --reset--> Inactive
//! ```
//!
//! Only `Inactive` entities may sit in a pool's free-list. The registry moves
//! an entity to `Active` when it is acquired and initialized, and reclaims it
//! once it reports that it should deactivate.
//!
//! # Example
//!
//! ```ignore
//! let mut lifecycle = Lifecycle::new(5.0);
//!
//! lifecycle.activate();
//! lifecycle.tick(1.0 / 60.0);
//!
//! // A collision forces the early transition; repeating it is harmless
//! assert!(lifecycle.terminate(TerminalCause::Hit));
//! assert!(!lifecycle.terminate(TerminalCause::Hit));
//!
//! lifecycle.reset();
//! assert!(lifecycle.is_inactive());
//! ```

use std::fmt;

// ============================================================================
// States
// ============================================================================

/// Why an entity left the `Active` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalCause {
    /// A domain event (impact, collision) ended the entity early.
    Hit,
    /// The entity outlived its configured lifespan.
    Expired,
}

/// Lifecycle state of a single pooled entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Idle and eligible to sit in a free-list.
    #[default]
    Inactive,
    /// Initialized and participating in simulation.
    Active,
    /// Finished, waiting to be reset and reclaimed.
    Terminal(TerminalCause),
}

impl LifecycleState {
    /// State name for debugging and logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Active => "Active",
            Self::Terminal(TerminalCause::Hit) => "Terminal(Hit)",
            Self::Terminal(TerminalCause::Expired) => "Terminal(Expired)",
        }
    }

    /// Check if this is a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Lifecycle bookkeeping shared by every pooled entity implementation.
///
/// Tracks the current state plus elapsed lifetime against a lifespan, so
/// that expiry happens without any outside intervention.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    /// Current state
    state: LifecycleState,
    /// Seconds spent in play since the last activation
    elapsed: f32,
    /// Seconds after which the entity expires
    lifespan: f32,
}

impl Lifecycle {
    /// Create an inactive lifecycle with the given lifespan in seconds.
    #[must_use]
    pub const fn new(lifespan: f32) -> Self {
        Self {
            state: LifecycleState::Inactive,
            elapsed: 0.0,
            lifespan,
        }
    }

    /// Current state.
    #[must_use]
    #[inline]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Seconds spent in play since activation.
    #[must_use]
    #[inline]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Configured lifespan in seconds.
    #[must_use]
    #[inline]
    pub const fn lifespan(&self) -> f32 {
        self.lifespan
    }

    /// Change the lifespan used by subsequent activations.
    pub fn set_lifespan(&mut self, lifespan: f32) {
        self.lifespan = lifespan;
    }

    /// Check if the entity is idle.
    #[must_use]
    #[inline]
    pub fn is_inactive(&self) -> bool {
        self.state == LifecycleState::Inactive
    }

    /// Check if the entity is in play.
    #[must_use]
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }

    /// `Inactive -> Active`.
    ///
    /// Activating anything but an inactive entity is a programming error.
    pub fn activate(&mut self) {
        debug_assert!(
            self.is_inactive(),
            "activate called in state {}",
            self.state
        );
        self.elapsed = 0.0;
        self.state = LifecycleState::Active;
    }

    /// Advance elapsed lifetime by `delta_time` seconds.
    ///
    /// No-op unless active. Returns `true` if this tick expired the entity.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        if self.state != LifecycleState::Active {
            return false;
        }

        self.elapsed += delta_time;
        if self.elapsed >= self.lifespan {
            self.state = LifecycleState::Terminal(TerminalCause::Expired);
            return true;
        }

        false
    }

    /// `Active -> Terminal(cause)`.
    ///
    /// Idempotent: returns `true` only for the call that actually
    /// transitioned. Inactive and already-terminal entities are left alone.
    pub fn terminate(&mut self, cause: TerminalCause) -> bool {
        if self.state != LifecycleState::Active {
            return false;
        }

        self.state = LifecycleState::Terminal(cause);
        true
    }

    /// Whether the entity has finished and is ready to be reclaimed.
    ///
    /// Pure function of the current state.
    #[must_use]
    pub fn should_deactivate(&self) -> bool {
        self.state.is_terminal() || (self.is_active() && self.elapsed >= self.lifespan)
    }

    /// Any state `-> Inactive`, clearing elapsed lifetime.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.state = LifecycleState::Inactive;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_initial_state() {
        let lifecycle = Lifecycle::new(5.0);
        assert_eq!(lifecycle.state(), LifecycleState::Inactive);
        assert_eq!(lifecycle.state().name(), "Inactive");
        assert!(!lifecycle.should_deactivate());
    }

    #[test]
    fn test_lifecycle_activate() {
        let mut lifecycle = Lifecycle::new(5.0);
        lifecycle.activate();

        assert!(lifecycle.is_active());
        assert_eq!(lifecycle.elapsed(), 0.0);
    }

    #[test]
    fn test_lifecycle_expires_on_lifespan() {
        let mut lifecycle = Lifecycle::new(1.0);
        lifecycle.activate();

        assert!(!lifecycle.tick(0.5));
        assert!(!lifecycle.should_deactivate());

        assert!(lifecycle.tick(0.5));
        assert_eq!(
            lifecycle.state(),
            LifecycleState::Terminal(TerminalCause::Expired)
        );
        assert!(lifecycle.should_deactivate());
    }

    #[test]
    fn test_lifecycle_tick_ignored_when_terminal() {
        let mut lifecycle = Lifecycle::new(10.0);
        lifecycle.activate();
        lifecycle.terminate(TerminalCause::Hit);

        let before = lifecycle.elapsed();
        assert!(!lifecycle.tick(3.0));
        assert_eq!(lifecycle.elapsed(), before);
    }

    #[test]
    fn test_lifecycle_terminate_is_idempotent() {
        let mut lifecycle = Lifecycle::new(10.0);
        lifecycle.activate();

        assert!(lifecycle.terminate(TerminalCause::Hit));
        assert!(!lifecycle.terminate(TerminalCause::Hit));
        assert!(!lifecycle.terminate(TerminalCause::Expired));
        assert_eq!(lifecycle.state(), LifecycleState::Terminal(TerminalCause::Hit));
    }

    #[test]
    fn test_lifecycle_terminate_ignored_when_inactive() {
        let mut lifecycle = Lifecycle::new(10.0);
        assert!(!lifecycle.terminate(TerminalCause::Hit));
        assert!(lifecycle.is_inactive());
    }

    #[test]
    fn test_lifecycle_reset_from_any_state() {
        let mut lifecycle = Lifecycle::new(1.0);
        lifecycle.reset();
        assert!(lifecycle.is_inactive());

        lifecycle.activate();
        lifecycle.tick(0.25);
        lifecycle.reset();
        assert!(lifecycle.is_inactive());
        assert_eq!(lifecycle.elapsed(), 0.0);

        lifecycle.activate();
        lifecycle.tick(2.0);
        lifecycle.reset();
        assert!(lifecycle.is_inactive());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "activate called in state Active")]
    fn test_lifecycle_double_activate_panics() {
        let mut lifecycle = Lifecycle::new(1.0);
        lifecycle.activate();
        lifecycle.activate();
    }
}
