//! Shortest-path routing with a congestion score.

use std::collections::HashMap;

use crate::error::DomainError;
use crate::graph::{CostGraph, TrafficState};
use crate::path::{path_cost, undirected, Edge, Path, PhantomHopPolicy};
use crate::shortest_path::ShortestPathOracle;

/// Result of [`ShortestPathRouter::route`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaselineResult {
    /// Shortest path per vehicle; `[start, end]` when unreachable.
    pub paths: Vec<Path>,

    /// Shortest-path cost per vehicle; `+inf` when unreachable.
    pub costs: Vec<f64>,

    /// Vehicles whose destination cannot be reached.
    pub unreachable: Vec<usize>,

    /// Usage of every edge on the paths.
    pub traffic: TrafficState,

    /// Sum of edge costs over all paths, unreachable hops excluded.
    pub travel_cost: f64,

    /// `Σ n(n − 1)` over undirected edges used by `n` vehicles.
    pub congestion_penalty: u64,

    /// Weight applied to the congestion penalty.
    pub congestion_weight: f64,

    /// `travel_cost + congestion_weight · congestion_penalty`.
    pub energy: f64,
}

/// Routes every vehicle independently over its shortest path.
///
/// # Examples
///
/// ```
/// use u_traffic::baseline::ShortestPathRouter;
/// use u_traffic::graph::CostGraph;
///
/// let graph = CostGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
/// let result = ShortestPathRouter::new()
///     .with_congestion_weight(1.0)
///     .route(&graph, &[(0, 2), (2, 0)])
///     .unwrap();
///
/// assert_eq!(result.paths, vec![vec![0, 1, 2], vec![2, 1, 0]]);
/// // Two vehicles on each of two edges: 2 · (2 · 1).
/// assert_eq!(result.congestion_penalty, 4);
/// assert!((result.energy - 8.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShortestPathRouter {
    congestion_weight: Option<f64>,
}

impl ShortestPathRouter {
    /// Creates a router whose congestion weight is tuned by problem size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the congestion weight instead of tuning it.
    pub fn with_congestion_weight(mut self, weight: f64) -> Self {
        self.congestion_weight = Some(weight);
        self
    }

    /// Congestion weight for `vehicles × nodes`: 0.5 below 1000, 0.3
    /// below 5000, 0.1 otherwise.
    pub fn auto_congestion_weight(vehicles: usize, nodes: usize) -> f64 {
        match vehicles.saturating_mul(nodes) {
            size if size < 1000 => 0.5,
            size if size < 5000 => 0.3,
            _ => 0.1,
        }
    }

    /// Routes with a fresh shortest-path oracle.
    ///
    /// # Errors
    ///
    /// [`DomainError::NodeOutOfRange`] if a route endpoint is not a node.
    pub fn route(
        &self,
        graph: &CostGraph,
        routes: &[(usize, usize)],
    ) -> Result<BaselineResult, DomainError> {
        self.route_with(&ShortestPathOracle::new(graph), routes)
    }

    /// Routes using an existing oracle, sharing its cache.
    pub fn route_with(
        &self,
        shortest: &ShortestPathOracle<'_>,
        routes: &[(usize, usize)],
    ) -> Result<BaselineResult, DomainError> {
        let graph = shortest.graph();
        let weight = self
            .congestion_weight
            .unwrap_or_else(|| Self::auto_congestion_weight(routes.len(), graph.n_nodes()));

        let mut paths = Vec::with_capacity(routes.len());
        let mut costs = Vec::with_capacity(routes.len());
        let mut unreachable = Vec::new();
        let mut traffic = TrafficState::new(graph.n_nodes());

        for (vehicle, &(start, end)) in routes.iter().enumerate() {
            let sp = shortest.shortest_path(start, end)?;
            if !sp.is_reachable() {
                log::debug!("vehicle {vehicle}: no path from {start} to {end}");
                unreachable.push(vehicle);
            }
            traffic.record_path(graph, &sp.path);
            costs.push(sp.cost);
            paths.push(sp.path);
        }

        let travel_cost = paths
            .iter()
            .map(|p| path_cost(graph, p, PhantomHopPolicy::Zero))
            .sum::<f64>();
        let congestion_penalty = congestion_penalty(graph, &paths);

        Ok(BaselineResult {
            paths,
            costs,
            unreachable,
            traffic,
            travel_cost,
            congestion_penalty,
            congestion_weight: weight,
            energy: travel_cost + weight * congestion_penalty as f64,
        })
    }
}

/// `Σ n(n − 1)` over undirected edges of `graph` used by `n` paths.
///
/// A path that crosses the same edge twice counts twice.
pub fn congestion_penalty(graph: &CostGraph, paths: &[Path]) -> u64 {
    let mut usage: HashMap<Edge, u64> = HashMap::new();
    for hop in paths.iter().flat_map(|p| p.windows(2)) {
        if graph.edge_cost(hop[0], hop[1]).is_some() {
            *usage.entry(undirected(hop[0], hop[1])).or_default() += 1;
        }
    }
    usage.values().map(|&n| n * (n - 1)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_weight_thresholds() {
        assert_eq!(ShortestPathRouter::auto_congestion_weight(10, 99), 0.5);
        assert_eq!(ShortestPathRouter::auto_congestion_weight(10, 100), 0.3);
        assert_eq!(ShortestPathRouter::auto_congestion_weight(50, 99), 0.3);
        assert_eq!(ShortestPathRouter::auto_congestion_weight(50, 100), 0.1);
        assert_eq!(ShortestPathRouter::auto_congestion_weight(usize::MAX, 2), 0.1);
    }

    #[test]
    fn test_route_uses_shortest_paths() {
        let g = CostGraph::from_edges(4, &[(0, 1, 1.0), (1, 3, 1.0), (0, 2, 1.0), (2, 3, 5.0)])
            .unwrap();
        let result = ShortestPathRouter::new().route(&g, &[(0, 3), (2, 2)]).unwrap();
        assert_eq!(result.paths, vec![vec![0, 1, 3], vec![2]]);
        assert_eq!(result.costs, vec![2.0, 0.0]);
        assert_eq!(result.congestion_weight, 0.5);
        assert_eq!(result.congestion_penalty, 0);
        assert!((result.energy - 2.0).abs() < 1e-12);
        assert_eq!(result.traffic.usage(1, 3), 1);
    }

    #[test]
    fn test_unreachable_vehicle() {
        let g = CostGraph::from_edges(3, &[(0, 1, 2.0)]).unwrap();
        let result = ShortestPathRouter::new().route(&g, &[(0, 2), (0, 1)]).unwrap();
        assert_eq!(result.paths[0], vec![0, 2]);
        assert!(result.costs[0].is_infinite());
        assert_eq!(result.unreachable, vec![0]);
        // The phantom hop neither costs nor congests.
        assert!((result.travel_cost - 2.0).abs() < 1e-12);
        assert_eq!(result.traffic.usage(0, 2), 0);
    }

    #[test]
    fn test_congestion_penalty_counts_pairs() {
        let g = CostGraph::from_edges(2, &[(0, 1, 1.0)]).unwrap();
        let paths = vec![vec![0, 1], vec![1, 0], vec![0, 1]];
        assert_eq!(congestion_penalty(&g, &paths), 6);
        assert_eq!(congestion_penalty(&g, &paths[..1]), 0);
    }

    #[test]
    fn test_route_rejects_unknown_node() {
        let g = CostGraph::from_edges(2, &[(0, 1, 1.0)]).unwrap();
        assert!(matches!(
            ShortestPathRouter::new().route(&g, &[(0, 5)]),
            Err(DomainError::NodeOutOfRange { node: 5, .. })
        ));
    }

    #[test]
    fn test_route_with_shares_cache() {
        let g = CostGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        let sp = ShortestPathOracle::new(&g);
        let router = ShortestPathRouter::new();
        router.route_with(&sp, &[(0, 2), (0, 2)]).unwrap();
        assert_eq!(sp.searches(), 1);
    }
}
