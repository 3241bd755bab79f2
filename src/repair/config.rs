//! Conflict repair configuration.

use crate::path::PhantomHopPolicy;

/// When the best candidate of an iteration replaces a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AcceptanceRule {
    /// Always apply the lowest-Δ candidate, even when Δ ≥ 0.
    ///
    /// The unmodified path is always a candidate with Δ = 0, so a
    /// conflict with no improving alternative is revisited every iteration
    /// until the iteration cap.
    #[default]
    BestCandidate,

    /// Apply the lowest-Δ candidate only when Δ < 0; otherwise stop the
    /// loop as stalled.
    StrictImprovement,
}

/// Which candidates may be selected, by their effect on the conflict count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictGuard {
    /// A candidate may not conflict with more vehicles than the path it
    /// replaces, so the total conflict count never grows.
    #[default]
    NonIncreasing,

    /// Any candidate may win on Δ alone. A shortcut that saves more than
    /// `λ` per added conflict is taken even if conflicts grow.
    Unrestricted,
}

/// Configuration for [`RepairRunner`](super::RepairRunner).
///
/// # Examples
///
/// ```
/// use u_traffic::repair::{AcceptanceRule, RepairConfig};
///
/// let config = RepairConfig::default()
///     .with_max_iterations(500)
///     .with_conflict_weight(5.0)
///     .with_acceptance(AcceptanceRule::StrictImprovement);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairConfig {
    /// Maximum number of repair iterations.
    pub max_iterations: usize,

    /// Maximum candidate paths per vehicle, counting the unmodified path.
    pub max_alternatives: usize,

    /// Weight λ of the conflict-count change in Δ.
    pub conflict_weight: f64,

    /// Acceptance rule for the best candidate.
    pub acceptance: AcceptanceRule,

    /// Candidate filter on conflict growth.
    pub guard: ConflictGuard,

    /// How hops without an edge are costed.
    pub phantom_hop: PhantomHopPolicy,

    /// Whether to evaluate candidates in parallel using rayon.
    ///
    /// Only effective with the `parallel` feature.
    pub parallel: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_alternatives: 3,
            conflict_weight: 3.0,
            acceptance: AcceptanceRule::default(),
            guard: ConflictGuard::default(),
            phantom_hop: PhantomHopPolicy::default(),
            parallel: false,
        }
    }
}

impl RepairConfig {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_max_alternatives(mut self, n: usize) -> Self {
        self.max_alternatives = n;
        self
    }

    pub fn with_conflict_weight(mut self, lambda: f64) -> Self {
        self.conflict_weight = lambda;
        self
    }

    pub fn with_acceptance(mut self, rule: AcceptanceRule) -> Self {
        self.acceptance = rule;
        self
    }

    pub fn with_guard(mut self, guard: ConflictGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_phantom_hop(mut self, policy: PhantomHopPolicy) -> Self {
        self.phantom_hop = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_alternatives == 0 {
            return Err("max_alternatives must be at least 1".into());
        }
        if !self.conflict_weight.is_finite() || self.conflict_weight < 0.0 {
            return Err(format!(
                "conflict_weight must be finite and non-negative, got {}",
                self.conflict_weight
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
        let config = RepairConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.max_alternatives, 3);
        assert!((config.conflict_weight - 3.0).abs() < 1e-12);
        assert_eq!(config.acceptance, AcceptanceRule::BestCandidate);
        assert_eq!(config.guard, ConflictGuard::NonIncreasing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_alternatives() {
        let config = RepairConfig::default().with_max_alternatives(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_lambda() {
        assert!(RepairConfig::default()
            .with_conflict_weight(-1.0)
            .validate()
            .is_err());
        assert!(RepairConfig::default()
            .with_conflict_weight(f64::INFINITY)
            .validate()
            .is_err());
    }
}
