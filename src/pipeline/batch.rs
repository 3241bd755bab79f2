//! Routing many independent graphs.

use super::config::RoutingConfig;
use super::runner::{RoutingPipeline, RoutingReport};
use crate::construct::DistributionTable;
use crate::decoder::{CandidateDecoder, Distribution};
use crate::error::DomainError;
use crate::graph::{CostGraph, TrafficState};

/// One graph with its route request and candidate distributions.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphInstance {
    /// Identifier used in the report.
    pub id: String,
    /// Cost matrix, `f64::INFINITY` for "no edge".
    pub weights: Vec<Vec<f64>>,
    /// `(start, end)` per vehicle.
    pub routes: Vec<(usize, usize)>,
    /// One distribution per vehicle.
    pub distributions: Vec<Distribution>,
}

impl GraphInstance {
    pub fn new(
        id: impl Into<String>,
        weights: Vec<Vec<f64>>,
        routes: Vec<(usize, usize)>,
        distributions: Vec<Distribution>,
    ) -> Self {
        Self {
            id: id.into(),
            weights,
            routes,
            distributions,
        }
    }
}

/// A graph that could not be routed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub id: String,
    pub error: DomainError,
}

/// Result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// `(graph id, report)` for every graph that was routed, in input order.
    pub graphs: Vec<(String, RoutingReport)>,

    /// Graphs that were skipped.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// `(graph id, total cost)` for every routed graph.
    pub fn totals(&self) -> Vec<(&str, f64)> {
        self.graphs
            .iter()
            .map(|(id, report)| (id.as_str(), report.total_cost))
            .collect()
    }

    /// Sum of all graph totals.
    pub fn overall_total(&self) -> f64 {
        self.graphs.iter().map(|(_, r)| r.total_cost).sum()
    }
}

/// Routes a batch of graphs, skipping the ones that fail.
pub struct BatchRunner;

impl BatchRunner {
    /// Routes every instance with a [`DistributionTable`] oracle.
    ///
    /// When an instance has a different number of routes and distributions,
    /// both are truncated to the shorter length. A graph that fails with a
    /// [`DomainError`] is logged and recorded in
    /// [`BatchReport::failures`]; the rest of the batch continues.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_traffic::decoder::Distribution;
    /// use u_traffic::pipeline::{BatchRunner, GraphInstance, RoutingConfig};
    ///
    /// let inf = f64::INFINITY;
    /// let line = vec![
    ///     vec![0.0, 1.0, inf],
    ///     vec![1.0, 0.0, 1.0],
    ///     vec![inf, 1.0, 0.0],
    /// ];
    /// let instances = vec![
    ///     GraphInstance::new("line", line, vec![(0, 2)], vec![Distribution::from_counts([("01", 3)])]),
    ///     GraphInstance::new("empty", vec![], vec![], vec![]),
    /// ];
    ///
    /// let report = BatchRunner::run(instances, &RoutingConfig::default());
    /// assert_eq!(report.totals(), vec![("line", 2.0)]);
    /// assert_eq!(report.failures.len(), 1);
    /// ```
    pub fn run(
        instances: impl IntoIterator<Item = GraphInstance>,
        config: &RoutingConfig,
    ) -> BatchReport {
        let pipeline = RoutingPipeline::new(config.clone());
        let mut report = BatchReport::default();

        for instance in instances {
            let id = instance.id.clone();
            match Self::run_one(&pipeline, instance) {
                Ok(routed) => {
                    log::info!(
                        "graph {id}: total cost {:.3}, {} conflicts left",
                        routed.total_cost,
                        routed.remaining_conflicts.len()
                    );
                    report.graphs.push((id, routed));
                }
                Err(error) => {
                    log::warn!("graph {id} skipped: {error}");
                    report.failures.push(BatchFailure { id, error });
                }
            }
        }

        log::info!(
            "batch done: {} routed, {} failed, overall total {:.3}",
            report.graphs.len(),
            report.failures.len(),
            report.overall_total()
        );
        report
    }

    fn run_one(pipeline: &RoutingPipeline, instance: GraphInstance) -> Result<RoutingReport, DomainError> {
        let GraphInstance {
            id,
            weights,
            mut routes,
            mut distributions,
        } = instance;

        if routes.len() != distributions.len() {
            let keep = routes.len().min(distributions.len());
            log::warn!(
                "graph {id}: {} routes but {} distributions, using the first {keep}",
                routes.len(),
                distributions.len()
            );
            routes.truncate(keep);
            distributions.truncate(keep);
        }

        let graph = CostGraph::new(weights)?;
        let mut table = DistributionTable::new(&distributions, CandidateDecoder::for_graph(&graph))?;
        pipeline.run(&graph, &routes, &mut table, TrafficState::new(graph.n_nodes()))
    }
}
