//! Sequential greedy path construction.
//!
//! # Algorithm
//!
//! For each vehicle, in route order:
//!
//! 1. `start == end`: the path is `[start]` with cost 0.
//! 2. Walk at most `max_path_length` steps, stopping at the destination:
//!    a. ask the oracle for a next node
//!    b. accept it if it is unvisited, a valid index, and joined to the
//!    current node by an edge; add `|w| + usage * traffic_penalty`
//!    c. otherwise apply the fallback strategy; a fallback hop adds `|w|`
//!    d. stop early if nothing qualifies
//!    e. count the hop in the traffic state (both directions)
//! 3. Force-append the destination if it was not reached.
//!
//! Later vehicles see the traffic left by earlier ones, so route order
//! is part of the result.

use super::config::{ConstructConfig, FallbackStrategy};
use super::types::{NextNodeOracle, OracleQuery};
use crate::error::DomainError;
use crate::graph::{CostGraph, TrafficState};
use crate::path::{Path, PhantomHopPolicy};
use crate::shortest_path::ShortestPathOracle;

/// Result of constructing one path per vehicle.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstructionResult {
    /// One path per vehicle, in route order.
    pub paths: Vec<Path>,

    /// Accumulated construction cost per vehicle, including traffic
    /// penalties on accepted oracle proposals.
    pub costs: Vec<f64>,

    /// Traffic after the last vehicle.
    pub traffic: TrafficState,

    /// Hops taken from oracle proposals.
    pub oracle_hops: usize,

    /// Hops taken by the fallback strategy.
    pub fallback_hops: usize,

    /// Vehicles whose destination had to be force-appended.
    pub forced_appends: Vec<usize>,
}

/// Builds paths for a route request.
pub struct PathConstructor;

impl PathConstructor {
    /// Constructs one path per `(start, end)` route, starting from
    /// `traffic`.
    ///
    /// # Errors
    ///
    /// - [`DomainError::NodeOutOfRange`] if a route endpoint is not a node
    /// - [`DomainError::CapacityShape`] if `traffic` does not match the graph
    /// - [`DomainError::InvalidConfig`] if `config` is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use u_traffic::construct::{ConstructConfig, OracleQuery, PathConstructor};
    /// use u_traffic::graph::{CostGraph, TrafficState};
    /// use u_traffic::shortest_path::ShortestPathOracle;
    ///
    /// let graph = CostGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
    /// let shortest = ShortestPathOracle::new(&graph);
    /// let mut no_candidate = |_: &OracleQuery<'_>| None::<usize>;
    ///
    /// let result = PathConstructor::run(
    ///     &shortest,
    ///     &[(0, 2)],
    ///     &mut no_candidate,
    ///     &ConstructConfig::default(),
    ///     TrafficState::new(3),
    /// ).unwrap();
    /// assert_eq!(result.paths[0], vec![0, 1, 2]);
    /// ```
    pub fn run<O: NextNodeOracle + ?Sized>(
        shortest: &ShortestPathOracle<'_>,
        routes: &[(usize, usize)],
        oracle: &mut O,
        config: &ConstructConfig,
        mut traffic: TrafficState,
    ) -> Result<ConstructionResult, DomainError> {
        config.validate().map_err(DomainError::InvalidConfig)?;
        let graph = shortest.graph();

        if traffic.n_nodes() != graph.n_nodes() {
            return Err(DomainError::CapacityShape {
                expected: graph.n_nodes(),
                found: traffic.n_nodes(),
            });
        }
        for &(start, end) in routes {
            graph.check_node(start)?;
            graph.check_node(end)?;
        }

        let mut paths = Vec::with_capacity(routes.len());
        let mut costs = Vec::with_capacity(routes.len());
        let mut oracle_hops = 0usize;
        let mut fallback_hops = 0usize;
        let mut forced_appends = Vec::new();

        for (vehicle, &(start, end)) in routes.iter().enumerate() {
            if start == end {
                paths.push(vec![start]);
                costs.push(0.0);
                continue;
            }

            let mut path = vec![start];
            let mut cost = 0.0;
            let mut current = start;

            for step in 0..config.max_path_length {
                if current == end {
                    break;
                }

                let proposal = oracle.propose(&OracleQuery {
                    vehicle,
                    step,
                    current,
                    destination: end,
                    path: &path,
                    traffic: &traffic,
                });

                let next = match proposal.filter(|&v| admissible(graph, &path, current, v)) {
                    Some(v) => {
                        let w = graph.edge_cost(current, v).unwrap_or(0.0);
                        cost += w + traffic.usage(current, v) as f64 * config.traffic_penalty;
                        oracle_hops += 1;
                        v
                    }
                    None => match fallback(shortest, config.fallback, &path, current, end)? {
                        Some(v) => {
                            cost += graph.edge_cost(current, v).unwrap_or(0.0);
                            fallback_hops += 1;
                            log::trace!("vehicle {vehicle} step {step}: fallback hop {current} -> {v}");
                            v
                        }
                        None => {
                            log::trace!("vehicle {vehicle} step {step}: no admissible move from {current}");
                            break;
                        }
                    },
                };

                traffic.record_hop(current, next);
                path.push(next);
                current = next;
            }

            if path.last() != Some(&end) {
                path.push(end);
                forced_appends.push(vehicle);
                if config.phantom_hop == PhantomHopPolicy::Infinite
                    && graph.edge_cost(path[path.len() - 2], end).is_none()
                {
                    cost = f64::INFINITY;
                }
            }

            log::debug!("vehicle {vehicle}: {start} -> {end} via {path:?}, cost {cost:.3}");
            paths.push(path);
            costs.push(cost);
        }

        if !forced_appends.is_empty() {
            log::debug!(
                "{} of {} vehicles needed a forced destination append",
                forced_appends.len(),
                routes.len()
            );
        }

        Ok(ConstructionResult {
            paths,
            costs,
            traffic,
            oracle_hops,
            fallback_hops,
            forced_appends,
        })
    }
}

/// Unvisited, in range, and joined to `current` by an edge.
fn admissible(graph: &CostGraph, path: &[usize], current: usize, v: usize) -> bool {
    graph.contains(v) && !path.contains(&v) && graph.edge_cost(current, v).is_some()
}

fn fallback(
    shortest: &ShortestPathOracle<'_>,
    strategy: FallbackStrategy,
    path: &[usize],
    current: usize,
    end: usize,
) -> Result<Option<usize>, DomainError> {
    let graph = shortest.graph();

    if strategy == FallbackStrategy::ShortestPathHop {
        if let Some(hop) = shortest.next_hop(current, end)? {
            if admissible(graph, path, current, hop) {
                return Ok(Some(hop));
            }
        }
    }

    Ok((0..graph.n_nodes()).find(|&v| admissible(graph, path, current, v)))
}
