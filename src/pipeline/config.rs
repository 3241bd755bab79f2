//! End-to-end routing configuration.

use crate::construct::ConstructConfig;
use crate::path::PhantomHopPolicy;
use crate::repair::RepairConfig;

/// Configuration for [`RoutingPipeline`](super::RoutingPipeline) and
/// [`BatchRunner`](super::BatchRunner).
///
/// # Examples
///
/// ```
/// use u_traffic::pipeline::RoutingConfig;
/// use u_traffic::repair::RepairConfig;
///
/// let config = RoutingConfig::default()
///     .with_default_capacity(1)
///     .with_repair(RepairConfig::default().with_max_iterations(20));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingConfig {
    /// Path construction settings.
    pub construct: ConstructConfig,

    /// Conflict repair settings.
    pub repair: RepairConfig,

    /// Capacity given to every edge when none is supplied.
    pub default_capacity: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            construct: ConstructConfig::default(),
            repair: RepairConfig::default(),
            default_capacity: 2,
        }
    }
}

impl RoutingConfig {
    pub fn with_construct(mut self, config: ConstructConfig) -> Self {
        self.construct = config;
        self
    }

    pub fn with_repair(mut self, config: RepairConfig) -> Self {
        self.repair = config;
        self
    }

    pub fn with_default_capacity(mut self, capacity: u32) -> Self {
        self.default_capacity = capacity;
        self
    }

    /// Sets the phantom-hop policy for both construction and repair.
    pub fn with_phantom_hop(mut self, policy: PhantomHopPolicy) -> Self {
        self.construct.phantom_hop = policy;
        self.repair.phantom_hop = policy;
        self
    }

    /// Validates both stages.
    pub fn validate(&self) -> Result<(), String> {
        self.construct
            .validate()
            .map_err(|e| format!("construct: {e}"))?;
        self.repair.validate().map_err(|e| format!("repair: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RoutingConfig::default();
        assert_eq!(config.default_capacity, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_phantom_hop_applies_to_both_stages() {
        let config = RoutingConfig::default().with_phantom_hop(PhantomHopPolicy::Excluded);
        assert_eq!(config.construct.phantom_hop, PhantomHopPolicy::Excluded);
        assert_eq!(config.repair.phantom_hop, PhantomHopPolicy::Excluded);
    }

    #[test]
    fn test_validate_names_stage() {
        let err = RoutingConfig::default()
            .with_repair(RepairConfig::default().with_max_alternatives(0))
            .validate()
            .unwrap_err();
        assert!(err.starts_with("repair:"));

        let err = RoutingConfig::default()
            .with_construct(ConstructConfig::default().with_max_path_length(0))
            .validate()
            .unwrap_err();
        assert!(err.starts_with("construct:"));
    }
}
