//! Health evaluation
//!
//! Classification is binary: a pool is healthy only when its reported
//! state is exactly the expected one. `DEGRADED` pools that still serve
//! data are unhealthy like any other mismatch.

use crate::domain::PoolHealth;

/// Classifies reported pool health against the expected state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthEvaluator {
    expected: PoolHealth,
}

impl HealthEvaluator {
    /// Create an evaluator expecting `expected`
    pub fn new(expected: PoolHealth) -> Self {
        Self { expected }
    }

    /// The state considered healthy
    pub fn expected(&self) -> &PoolHealth {
        &self.expected
    }

    /// Whether `health` matches the expected state
    pub fn is_healthy(&self, health: &PoolHealth) -> bool {
        *health == self.expected
    }
}

impl Default for HealthEvaluator {
    fn default() -> Self {
        Self::new(PoolHealth::Online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expects_online() {
        let evaluator = HealthEvaluator::default();
        assert!(evaluator.is_healthy(&PoolHealth::Online));
        assert_eq!(evaluator.expected(), &PoolHealth::Online);
    }

    #[test]
    fn test_every_other_state_is_unhealthy() {
        let evaluator = HealthEvaluator::default();
        for health in [
            PoolHealth::Degraded,
            PoolHealth::Faulted,
            PoolHealth::Offline,
            PoolHealth::Unavail,
            PoolHealth::Removed,
            PoolHealth::Suspended,
            PoolHealth::Other("ONLINE?".to_string()),
        ] {
            assert!(!evaluator.is_healthy(&health), "{health} should be unhealthy");
        }
    }

    #[test]
    fn test_custom_expected_state() {
        let evaluator = HealthEvaluator::new(PoolHealth::Degraded);
        assert!(evaluator.is_healthy(&PoolHealth::Degraded));
        assert!(!evaluator.is_healthy(&PoolHealth::Online));
    }
}
