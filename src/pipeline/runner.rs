//! Single-graph routing: construct, then repair.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::config::RoutingConfig;
use crate::construct::{NextNodeOracle, PathConstructor};
use crate::error::DomainError;
use crate::graph::{CapacityMatrix, CostGraph, TrafficState};
use crate::path::{cost_change, path_cost, Path};
use crate::repair::RepairRunner;
use crate::shortest_path::ShortestPathOracle;

/// Outcome of routing one graph.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingReport {
    /// Paths as constructed, before repair.
    pub initial_paths: Vec<Path>,

    /// Construction cost per vehicle, traffic penalties included.
    pub construction_costs: Vec<f64>,

    /// Edge cost per vehicle of the constructed paths.
    pub initial_costs: Vec<f64>,

    /// Final paths.
    pub paths: Vec<Path>,

    /// Edge cost per vehicle of the final paths.
    pub costs: Vec<f64>,

    /// System cost of the final paths.
    pub total_cost: f64,

    /// Traffic after construction and repair.
    pub traffic: TrafficState,

    /// Vehicles whose destination was force-appended.
    pub forced_appends: Vec<usize>,

    /// Conflicting pairs after construction.
    pub initial_conflicts: usize,

    /// Conflicting pairs left after repair.
    pub remaining_conflicts: Vec<(usize, usize)>,

    /// Repair iterations.
    pub iterations: usize,

    /// Path replacements made by repair.
    pub replacements: usize,

    /// Whether repair was cancelled.
    pub cancelled: bool,
}

impl RoutingReport {
    /// `(vehicle, path)` for every vehicle.
    pub fn assignments(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.paths.iter().map(Vec::as_slice).enumerate()
    }

    /// `(vehicle, saving)` for every vehicle whose edge cost dropped
    /// during repair.
    pub fn improvements(&self) -> Vec<(usize, f64)> {
        self.initial_costs
            .iter()
            .zip(&self.costs)
            .enumerate()
            .filter_map(|(vehicle, (&before, &after))| {
                let change = cost_change(after, before);
                (change < 0.0).then_some((vehicle, -change))
            })
            .collect()
    }

    /// Returns `true` if repair left no conflict.
    pub fn is_conflict_free(&self) -> bool {
        self.remaining_conflicts.is_empty()
    }
}

/// Routes all vehicles of one graph.
///
/// # Examples
///
/// ```
/// use u_traffic::construct::OracleQuery;
/// use u_traffic::graph::{CostGraph, TrafficState};
/// use u_traffic::pipeline::{RoutingConfig, RoutingPipeline};
///
/// let graph = CostGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
/// let mut oracle = |q: &OracleQuery<'_>| Some(q.current + 1);
///
/// let report = RoutingPipeline::new(RoutingConfig::default())
///     .run(&graph, &[(0, 2)], &mut oracle, TrafficState::new(3))
///     .unwrap();
/// assert_eq!(report.paths[0], vec![0, 1, 2]);
/// assert!((report.total_cost - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoutingPipeline {
    config: RoutingConfig,
}

impl RoutingPipeline {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Routes over `graph` with every edge given the default capacity.
    ///
    /// # Errors
    ///
    /// Any [`DomainError`] from validation, construction, or repair.
    pub fn run<O: NextNodeOracle + ?Sized>(
        &self,
        graph: &CostGraph,
        routes: &[(usize, usize)],
        oracle: &mut O,
        traffic: TrafficState,
    ) -> Result<RoutingReport, DomainError> {
        let shortest = ShortestPathOracle::new(graph);
        let capacity = CapacityMatrix::from_graph(graph, self.config.default_capacity);
        self.run_with(&shortest, &capacity, routes, oracle, traffic, None)
    }

    /// Routes with an existing shortest-path oracle, an explicit capacity
    /// matrix, and an optional cancellation token for the repair stage.
    pub fn run_with<O: NextNodeOracle + ?Sized>(
        &self,
        shortest: &ShortestPathOracle<'_>,
        capacity: &CapacityMatrix,
        routes: &[(usize, usize)],
        oracle: &mut O,
        traffic: TrafficState,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RoutingReport, DomainError> {
        self.config.validate().map_err(DomainError::InvalidConfig)?;
        let graph = shortest.graph();

        let built = PathConstructor::run(shortest, routes, oracle, &self.config.construct, traffic)?;
        log::debug!(
            "constructed {} paths ({} oracle hops, {} fallback hops, {} forced)",
            built.paths.len(),
            built.oracle_hops,
            built.fallback_hops,
            built.forced_appends.len()
        );

        let initial_costs: Vec<f64> = built
            .paths
            .iter()
            .map(|p| path_cost(graph, p, self.config.repair.phantom_hop))
            .collect();

        let repaired = RepairRunner::run_with_cancel(
            graph,
            capacity,
            built.paths.clone(),
            built.traffic,
            &self.config.repair,
            cancel,
        )?;

        Ok(RoutingReport {
            initial_paths: built.paths,
            construction_costs: built.costs,
            initial_costs,
            paths: repaired.paths,
            costs: repaired.costs,
            total_cost: repaired.total_cost,
            traffic: repaired.traffic,
            forced_appends: built.forced_appends,
            initial_conflicts: repaired.initial_conflicts,
            remaining_conflicts: repaired.remaining_conflicts,
            iterations: repaired.iterations,
            replacements: repaired.replacements,
            cancelled: repaired.cancelled,
        })
    }
}
