//! Conflict repair loop.
//!
//! # Algorithm
//!
//! Each iteration:
//!
//! 1. List conflicting pairs among the current paths; stop if none.
//! 2. Take the first pair `(i, j)`.
//! 3. For both vehicles, generate alternatives: the unmodified path, then
//!    single-interior-node deletions whose hops all have capacity > 0, up
//!    to `max_alternatives` in total.
//! 4. Score each alternative with
//!    `Δ = (new cost − old cost) + λ · (new conflicts − old conflicts)`,
//!    where conflicts are counted against the other vehicles' current paths.
//!    Under [`ConflictGuard::NonIncreasing`], a candidate with more new
//!    conflicts than old scores `+inf` and is never picked.
//! 5. Pick the lowest Δ, earliest on ties, and apply it according to the
//!    [`AcceptanceRule`].
//!
//! The loop ends when no conflict remains, the iteration cap is reached,
//! the strict rule finds no improving candidate, or the run is cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::{AcceptanceRule, ConflictGuard, RepairConfig};
use super::conflict::{conflicts_against, ConflictGraph};
use crate::error::DomainError;
use crate::graph::{CapacityMatrix, CostGraph, TrafficState};
use crate::path::{cost_change, is_capacity_valid, path_cost, system_cost, Path};

/// A path replacement applied by the repair loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairMove {
    /// Iteration (1-based) in which the move was applied.
    pub iteration: usize,
    /// Vehicle whose path was replaced.
    pub vehicle: usize,
    /// Path before the move.
    pub from: Path,
    /// Path after the move.
    pub to: Path,
    /// Score of the move.
    pub delta: f64,
}

/// Result of a repair run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairResult {
    /// Final path per vehicle.
    pub paths: Vec<Path>,

    /// Cost of each final path.
    pub costs: Vec<f64>,

    /// System cost of the final paths.
    pub total_cost: f64,

    /// Traffic after replacements.
    pub traffic: TrafficState,

    /// Number of iterations that examined a conflict.
    pub iterations: usize,

    /// Number of path replacements applied.
    pub replacements: usize,

    /// Replacements in the order they were applied.
    pub moves: Vec<RepairMove>,

    /// Conflicting pairs before the first iteration.
    pub initial_conflicts: usize,

    /// Conflicting pairs `(i, j)`, `i < j`, left at the end.
    pub remaining_conflicts: Vec<(usize, usize)>,

    /// Conflict count before the first iteration and after each one.
    pub conflict_history: Vec<usize>,

    /// Whether the strict acceptance rule stopped the loop.
    pub stalled: bool,

    /// Whether cancelled externally.
    pub cancelled: bool,
}

impl RepairResult {
    /// Returns `true` if no conflict remains.
    pub fn is_conflict_free(&self) -> bool {
        self.remaining_conflicts.is_empty()
    }
}

/// Executes the conflict repair loop.
pub struct RepairRunner;

impl RepairRunner {
    /// Repairs `paths` until they are conflict-free or a stop condition
    /// is met.
    ///
    /// `traffic` should hold the usage of `paths`; each replacement releases
    /// the old path's edges and records the new one's.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidConfig`] if `config` is invalid
    /// - [`DomainError::CapacityShape`] if `capacity` or `traffic` does not
    ///   match the graph
    /// - [`DomainError::NodeOutOfRange`] if a path visits an unknown node
    ///
    /// # Examples
    ///
    /// ```
    /// use u_traffic::graph::{CapacityMatrix, CostGraph, TrafficState};
    /// use u_traffic::repair::{RepairConfig, RepairRunner};
    ///
    /// let graph = CostGraph::from_edges(
    ///     4,
    ///     &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (0, 2, 1.5)],
    /// ).unwrap();
    /// let capacity = CapacityMatrix::from_graph(&graph, 2)
    ///     .with_capacity(0, 1, 1)
    ///     .unwrap();
    /// let paths = vec![vec![0, 1], vec![0, 1, 2, 3]];
    ///
    /// let result = RepairRunner::run(
    ///     &graph,
    ///     &capacity,
    ///     paths,
    ///     TrafficState::new(4),
    ///     &RepairConfig::default(),
    /// ).unwrap();
    /// assert!(result.is_conflict_free());
    /// assert_eq!(result.paths[1], vec![0, 2, 3]);
    /// ```
    pub fn run(
        graph: &CostGraph,
        capacity: &CapacityMatrix,
        paths: Vec<Path>,
        traffic: TrafficState,
        config: &RepairConfig,
    ) -> Result<RepairResult, DomainError> {
        Self::run_with_cancel(graph, capacity, paths, traffic, config, None)
    }

    /// Runs the repair loop with an optional cancellation token.
    pub fn run_with_cancel(
        graph: &CostGraph,
        capacity: &CapacityMatrix,
        mut paths: Vec<Path>,
        mut traffic: TrafficState,
        config: &RepairConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RepairResult, DomainError> {
        config.validate().map_err(DomainError::InvalidConfig)?;
        validate_inputs(graph, capacity, &paths, &traffic)?;

        let mut conflicts = ConflictGraph::build(&paths, capacity);
        let initial_conflicts = conflicts.conflict_count(&paths);
        let mut conflict_history = vec![initial_conflicts];
        let mut moves = Vec::new();
        let mut iterations = 0usize;
        let mut stalled = false;
        let mut cancelled = false;

        log::debug!(
            "repairing {} paths with {} initial conflicts",
            paths.len(),
            initial_conflicts
        );

        for _ in 0..config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let pairs = conflicts.conflict_pairs(&paths);
            let Some(&(first, second)) = pairs.first() else {
                break;
            };
            iterations += 1;

            let candidates: Vec<(usize, Path)> = [first, second]
                .into_iter()
                .flat_map(|v| {
                    Self::alternatives(&paths[v], capacity, config.max_alternatives)
                        .into_iter()
                        .map(move |p| (v, p))
                })
                .collect();
            let deltas = evaluate(graph, capacity, &conflicts, &paths, &candidates, config);

            let mut best = 0;
            for (idx, &delta) in deltas.iter().enumerate() {
                if delta < deltas[best] {
                    best = idx;
                }
            }
            let delta = deltas[best];
            let improving = delta < 0.0;

            if config.acceptance == AcceptanceRule::StrictImprovement && !improving {
                log::debug!("iteration {iterations}: no improving candidate for ({first}, {second})");
                stalled = true;
                conflict_history.push(conflicts.conflict_count(&paths));
                break;
            }

            let (vehicle, candidate) = &candidates[best];
            if *candidate != paths[*vehicle] {
                let old = std::mem::replace(&mut paths[*vehicle], candidate.clone());
                traffic.release_path(graph, &old);
                traffic.record_path(graph, candidate);
                conflicts.refresh(*vehicle, &old, &paths, capacity);
                log::debug!(
                    "iteration {iterations}: vehicle {vehicle} {old:?} -> {candidate:?} (delta {delta})"
                );
                moves.push(RepairMove {
                    iteration: iterations,
                    vehicle: *vehicle,
                    from: old,
                    to: candidate.clone(),
                    delta,
                });
            }

            conflict_history.push(conflicts.conflict_count(&paths));
        }

        let remaining_conflicts = conflicts.conflict_pairs(&paths);
        if !remaining_conflicts.is_empty() {
            log::warn!(
                "{} conflicts remain after {iterations} repair iterations",
                remaining_conflicts.len()
            );
        }

        let costs: Vec<f64> = paths
            .iter()
            .map(|p| path_cost(graph, p, config.phantom_hop))
            .collect();
        let total_cost = system_cost(graph, &paths, config.phantom_hop);

        Ok(RepairResult {
            replacements: moves.len(),
            paths,
            costs,
            total_cost,
            traffic,
            iterations,
            moves,
            initial_conflicts,
            remaining_conflicts,
            conflict_history,
            stalled,
            cancelled,
        })
    }

    /// Candidate replacements for `path`.
    ///
    /// The first entry is always `path` itself. Then, in order of position,
    /// copies with one interior node removed, kept only if every hop has
    /// capacity > 0. At most `max` entries are returned (at least one).
    pub fn alternatives(path: &[usize], capacity: &CapacityMatrix, max: usize) -> Vec<Path> {
        let mut alternatives = vec![path.to_vec()];
        if path.len() <= 2 {
            return alternatives;
        }
        for i in 1..path.len() - 1 {
            if alternatives.len() >= max {
                break;
            }
            let mut candidate = path.to_vec();
            candidate.remove(i);
            if is_capacity_valid(&candidate, capacity) {
                alternatives.push(candidate);
            }
        }
        alternatives
    }
}

fn validate_inputs(
    graph: &CostGraph,
    capacity: &CapacityMatrix,
    paths: &[Path],
    traffic: &TrafficState,
) -> Result<(), DomainError> {
    for found in [capacity.n_nodes(), traffic.n_nodes()] {
        if found != graph.n_nodes() {
            return Err(DomainError::CapacityShape {
                expected: graph.n_nodes(),
                found,
            });
        }
    }
    for &node in paths.iter().flatten() {
        graph.check_node(node)?;
    }
    Ok(())
}

fn delta(
    graph: &CostGraph,
    capacity: &CapacityMatrix,
    conflicts: &ConflictGraph,
    paths: &[Path],
    vehicle: usize,
    candidate: &[usize],
    config: &RepairConfig,
) -> f64 {
    let current = &paths[vehicle];
    let cost = cost_change(
        path_cost(graph, candidate, config.phantom_hop),
        path_cost(graph, current, config.phantom_hop),
    );
    let old = conflicts.degree(vehicle, paths);
    let new = conflicts_against(vehicle, candidate, paths, capacity);
    if config.guard == ConflictGuard::NonIncreasing && new > old {
        return f64::INFINITY;
    }
    cost + config.conflict_weight * (new as f64 - old as f64)
}

fn evaluate(
    graph: &CostGraph,
    capacity: &CapacityMatrix,
    conflicts: &ConflictGraph,
    paths: &[Path],
    candidates: &[(usize, Path)],
    config: &RepairConfig,
) -> Vec<f64> {
    let score = |(vehicle, candidate): &(usize, Path)| {
        delta(graph, capacity, conflicts, paths, *vehicle, candidate, config)
    };

    #[cfg(feature = "parallel")]
    if config.parallel {
        return candidates.par_iter().map(score).collect();
    }

    candidates.iter().map(score).collect()
}
