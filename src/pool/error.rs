//! Pool and registry error types

/// Errors an `EntityFactory` can report while building an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// The factory has no definition for the requested variant
    UnknownVariant(String),
    /// The construction context refused to create more entities
    BudgetExhausted {
        /// Total entities the context allows
        budget: usize,
    },
    /// Any other construction failure
    Rejected(String),
}

impl std::fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVariant(v) => write!(f, "Unknown variant: {v}"),
            Self::BudgetExhausted { budget } => {
                write!(f, "Entity budget of {budget} exhausted")
            }
            Self::Rejected(e) => write!(f, "Construction rejected: {e}"),
        }
    }
}

impl std::error::Error for ConstructionError {}

/// Errors returned by pools and the pool registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Pre-warm or growth stopped early; the pool keeps what was built
    Construction {
        /// Entities asked for
        requested: usize,
        /// Entities actually added to the pool
        constructed: usize,
        /// The failure that stopped construction
        source: ConstructionError,
    },
    /// The pool for this variant has no free entity
    Exhausted {
        /// Variant that was requested
        variant: String,
    },
    /// The registry has been shut down
    ShutDown,
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construction {
                requested,
                constructed,
                source,
            } => write!(
                f,
                "Constructed {constructed} of {requested} entities: {source}"
            ),
            Self::Exhausted { variant } => write!(f, "Pool exhausted for {variant}"),
            Self::ShutDown => write!(f, "Registry has been shut down"),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Construction { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_construction_error_is_source() {
        let err = PoolError::Construction {
            requested: 10,
            constructed: 4,
            source: ConstructionError::BudgetExhausted { budget: 4 },
        };

        assert_eq!(
            err.to_string(),
            "Constructed 4 of 10 entities: Entity budget of 4 exhausted"
        );
        assert!(err.source().is_some());
        assert!(PoolError::ShutDown.source().is_none());
    }
}
