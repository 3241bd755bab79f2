//! Multi-vehicle routing on weighted graphs with congestion and conflict
//! repair.
//!
//! Given a cost matrix and an ordered list of `(start, end)` routes, the
//! crate builds one path per vehicle and then locally repairs pairs of
//! paths that compete for low-capacity edges:
//!
//! - **Graph**: cost matrix, per-edge capacity, and shared traffic counters.
//! - **Shortest paths**: memoized Dijkstra oracle, safe to share across
//!   threads.
//! - **Decoder**: turns a frequency distribution over bit-encoded node
//!   identifiers into a single candidate node.
//! - **Construction**: greedy sequential walk driven by a pluggable
//!   next-node oracle, with shortest-path or ascending-scan fallback and a
//!   linear traffic penalty.
//! - **Repair**: iterative conflict resolution by single-node shortcuts,
//!   scored by cost change plus weighted conflict change.
//! - **Baseline**: independent shortest paths scored by quadratic
//!   congestion energy.
//! - **Pipeline**: construction and repair for one graph or a batch.
//!
//! # Example
//!
//! ```
//! use u_traffic::construct::OracleQuery;
//! use u_traffic::graph::{CostGraph, TrafficState};
//! use u_traffic::pipeline::{RoutingConfig, RoutingPipeline};
//!
//! let graph = CostGraph::from_edges(
//!     4,
//!     &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (0, 3, 5.0)],
//! ).unwrap();
//!
//! // An oracle that never proposes anything: every hop falls back.
//! let mut oracle = |_: &OracleQuery<'_>| None::<usize>;
//! let report = RoutingPipeline::new(RoutingConfig::default())
//!     .run(&graph, &[(0, 3), (3, 3)], &mut oracle, TrafficState::new(4))
//!     .unwrap();
//!
//! assert_eq!(report.paths[1], vec![3]);
//! assert!(report.is_conflict_free());
//! ```

pub mod baseline;
pub mod construct;
pub mod decoder;
pub mod error;
pub mod graph;
pub mod path;
pub mod pipeline;
pub mod repair;
pub mod shortest_path;

pub use error::DomainError;
