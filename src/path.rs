//! Path representation and cost accounting.
//!
//! A path is an ordered node sequence. Hops that are not edges of the cost
//! graph ("phantom hops") can appear when the constructor force-appends a
//! destination it could not reach; [`PhantomHopPolicy`] decides how such
//! hops are costed.

use std::collections::HashSet;

use crate::graph::{CapacityMatrix, CostGraph};

/// An ordered sequence of node identifiers, start first.
pub type Path = Vec<usize>;

/// An undirected edge `(min, max)`.
pub type Edge = (usize, usize);

/// How hops without an edge contribute to cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhantomHopPolicy {
    /// Phantom hops cost nothing.
    #[default]
    Zero,

    /// A phantom hop makes the whole path cost `+inf`.
    Infinite,

    /// Phantom hops cost nothing on the path itself, but vehicles with a
    /// phantom hop are left out of the system total.
    Excluded,
}

/// Undirected edge set of a path.
pub fn path_edges(path: &[usize]) -> HashSet<Edge> {
    path.windows(2).map(|w| undirected(w[0], w[1])).collect()
}

/// Normalizes `(u, v)` to `(min, max)`.
pub fn undirected(u: usize, v: usize) -> Edge {
    (u.min(v), u.max(v))
}

/// Number of hops in `path` that are not edges of `graph`.
pub fn phantom_hops(graph: &CostGraph, path: &[usize]) -> usize {
    path.windows(2)
        .filter(|w| graph.edge_cost(w[0], w[1]).is_none())
        .count()
}

/// Sum of `|weight|` over the hops of `path`.
pub fn path_cost(graph: &CostGraph, path: &[usize], policy: PhantomHopPolicy) -> f64 {
    let mut cost = 0.0;
    for hop in path.windows(2) {
        match graph.edge_cost(hop[0], hop[1]) {
            Some(c) => cost += c,
            None if policy == PhantomHopPolicy::Infinite => return f64::INFINITY,
            None => {}
        }
    }
    cost
}

/// Total cost of a path set.
///
/// Under [`PhantomHopPolicy::Excluded`], paths with a phantom hop are
/// skipped.
pub fn system_cost(graph: &CostGraph, paths: &[Path], policy: PhantomHopPolicy) -> f64 {
    paths
        .iter()
        .filter(|p| policy != PhantomHopPolicy::Excluded || phantom_hops(graph, p) == 0)
        .map(|p| path_cost(graph, p, policy))
        .sum()
}

/// Returns `true` if every consecutive pair has capacity > 0.
pub fn is_capacity_valid(path: &[usize], capacity: &CapacityMatrix) -> bool {
    path.windows(2).all(|w| capacity.get(w[0], w[1]) > 0)
}

/// Returns `true` if every consecutive pair is an edge of `graph`.
///
/// Constructed paths may end in a forced phantom hop; callers that need
/// structurally valid paths check them with this.
pub fn is_edge_valid(graph: &CostGraph, path: &[usize]) -> bool {
    phantom_hops(graph, path) == 0
}

/// `new - old`, with `inf - inf` read as no change.
pub(crate) fn cost_change(new: f64, old: f64) -> f64 {
    if new.is_infinite() && old.is_infinite() && new.signum() == old.signum() {
        0.0
    } else {
        new - old
    }
}
