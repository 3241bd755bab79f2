//! Greedy path construction.
//!
//! Vehicles are routed one at a time, in route order, by walking from the
//! start node with proposals from a [`NextNodeOracle`]. Rejected proposals
//! fall back to a [`FallbackStrategy`]; a destination that is never reached
//! is force-appended. Every accepted hop is counted in a shared
//! [`TrafficState`](crate::graph::TrafficState), so earlier vehicles take
//! precedence for congestion.
//!
//! # Key Types
//!
//! - [`ConstructConfig`]: step budget, traffic penalty, fallback, phantom-hop policy
//! - [`PathConstructor`]: runs the construction
//! - [`DistributionTable`], [`NoisySampler`]: oracle implementations

mod config;
mod runner;
mod types;

pub use config::{ConstructConfig, FallbackStrategy};
pub use runner::{ConstructionResult, PathConstructor};
pub use types::{DistributionTable, NextNodeOracle, NoisySampler, OracleQuery};
