//! Cost graph, capacities, and traffic counters.
//!
//! - [`CostGraph`]: read-only weighted adjacency with an unreachable sentinel
//! - [`CapacityMatrix`]: symmetric per-edge capacity limits
//! - [`TrafficState`]: running symmetric edge-usage counters

mod capacity;
mod cost;
mod traffic;

pub use capacity::CapacityMatrix;
pub use cost::CostGraph;
pub(crate) use cost::bits_for;
pub use traffic::TrafficState;
