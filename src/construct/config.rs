//! Path construction configuration.

use crate::path::PhantomHopPolicy;

/// What the constructor does when the oracle's proposal is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FallbackStrategy {
    /// Take the lowest-index admissible neighbor.
    #[default]
    AscendingScan,

    /// Take the next hop of the shortest path to the destination when it is
    /// admissible, otherwise scan in ascending order.
    ShortestPathHop,
}

/// Configuration for [`PathConstructor`](super::PathConstructor).
///
/// # Examples
///
/// ```
/// use u_traffic::construct::{ConstructConfig, FallbackStrategy};
///
/// let config = ConstructConfig::default()
///     .with_max_path_length(25)
///     .with_traffic_penalty(0.2)
///     .with_fallback(FallbackStrategy::ShortestPathHop);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstructConfig {
    /// Maximum number of hops walked per vehicle before the destination
    /// is force-appended.
    pub max_path_length: usize,

    /// Cost added per unit of existing usage when an oracle proposal is
    /// accepted: `usage(u, v) * traffic_penalty`.
    pub traffic_penalty: f64,

    /// Fallback when the oracle's proposal is rejected.
    pub fallback: FallbackStrategy,

    /// How a forced final hop without an edge is costed.
    pub phantom_hop: PhantomHopPolicy,
}

impl Default for ConstructConfig {
    fn default() -> Self {
        Self {
            max_path_length: 10,
            traffic_penalty: 0.1,
            fallback: FallbackStrategy::default(),
            phantom_hop: PhantomHopPolicy::default(),
        }
    }
}

impl ConstructConfig {
    pub fn with_max_path_length(mut self, n: usize) -> Self {
        self.max_path_length = n;
        self
    }

    pub fn with_traffic_penalty(mut self, penalty: f64) -> Self {
        self.traffic_penalty = penalty;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_phantom_hop(mut self, policy: PhantomHopPolicy) -> Self {
        self.phantom_hop = policy;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_path_length == 0 {
            return Err("max_path_length must be at least 1".into());
        }
        if !self.traffic_penalty.is_finite() || self.traffic_penalty < 0.0 {
            return Err(format!(
                "traffic_penalty must be finite and non-negative, got {}",
                self.traffic_penalty
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConstructConfig::default();
        assert_eq!(config.max_path_length, 10);
        assert!((config.traffic_penalty - 0.1).abs() < 1e-12);
        assert_eq!(config.fallback, FallbackStrategy::AscendingScan);
        assert_eq!(config.phantom_hop, PhantomHopPolicy::Zero);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_length() {
        assert!(ConstructConfig::default()
            .with_max_path_length(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_bad_penalty() {
        assert!(ConstructConfig::default()
            .with_traffic_penalty(-0.5)
            .validate()
            .is_err());
        assert!(ConstructConfig::default()
            .with_traffic_penalty(f64::NAN)
            .validate()
            .is_err());
    }
}
