//! Conflict detection between vehicle paths.

use std::collections::{HashMap, HashSet};

use crate::graph::CapacityMatrix;
use crate::path::{path_edges, undirected, Path};

type Key = (usize, Path);

/// Returns `true` if `a` and `b` share an undirected edge with capacity
/// at most 1.
///
/// Capacity 0 counts too, so two paths sharing the same phantom hop
/// conflict.
pub fn paths_conflict(a: &[usize], b: &[usize], capacity: &CapacityMatrix) -> bool {
    if a.len() < 2 || b.len() < 2 {
        return false;
    }
    let edges = path_edges(a);
    b.windows(2).any(|w| {
        let e = undirected(w[0], w[1]);
        edges.contains(&e) && capacity.get(e.0, e.1) <= 1
    })
}

/// Number of other vehicles whose current path conflicts with `path`
/// when driven by `vehicle`.
pub fn conflicts_against(
    vehicle: usize,
    path: &[usize],
    paths: &[Path],
    capacity: &CapacityMatrix,
) -> usize {
    paths
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != vehicle && paths_conflict(path, other, capacity))
        .count()
}

/// Conflict relation between `(vehicle, path)` pairs.
///
/// Entries are keyed by the *exact* path a vehicle was driving when the
/// conflict was recorded. Once a vehicle's path changes, lookups with the
/// new path no longer see the old entries, and [`refresh`](Self::refresh)
/// must be called to record the new path's conflicts.
#[derive(Debug, Clone, Default)]
pub struct ConflictGraph {
    adjacency: HashMap<Key, HashSet<Key>>,
}

impl ConflictGraph {
    /// Records every conflict among `paths`.
    pub fn build(paths: &[Path], capacity: &CapacityMatrix) -> Self {
        let mut graph = Self::default();
        for i in 0..paths.len() {
            for j in (i + 1)..paths.len() {
                if paths_conflict(&paths[i], &paths[j], capacity) {
                    graph.link((i, paths[i].clone()), (j, paths[j].clone()));
                }
            }
        }
        graph
    }

    /// Drops the entries of `(vehicle, old_path)` and records the conflicts
    /// of the vehicle's current path `paths[vehicle]`.
    pub fn refresh(
        &mut self,
        vehicle: usize,
        old_path: &[usize],
        paths: &[Path],
        capacity: &CapacityMatrix,
    ) {
        let stale = (vehicle, old_path.to_vec());
        if let Some(neighbors) = self.adjacency.remove(&stale) {
            for n in neighbors {
                if let Some(set) = self.adjacency.get_mut(&n) {
                    set.remove(&stale);
                    if set.is_empty() {
                        self.adjacency.remove(&n);
                    }
                }
            }
        }

        let current = &paths[vehicle];
        for (j, other) in paths.iter().enumerate() {
            if j != vehicle && paths_conflict(current, other, capacity) {
                self.link((vehicle, current.clone()), (j, other.clone()));
            }
        }
    }

    /// Whether `(i, path_i)` and `(j, path_j)` are recorded as conflicting.
    pub fn conflicts(&self, i: usize, path_i: &[usize], j: usize, path_j: &[usize]) -> bool {
        self.adjacency
            .get(&(i, path_i.to_vec()))
            .is_some_and(|set| set.contains(&(j, path_j.to_vec())))
    }

    /// Conflicting vehicle pairs `(i, j)` with `i < j` among the current
    /// `paths`, in discovery order.
    pub fn conflict_pairs(&self, paths: &[Path]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..paths.len() {
            let Some(set) = self.adjacency.get(&(i, paths[i].clone())) else {
                continue;
            };
            for j in (i + 1)..paths.len() {
                if set.contains(&(j, paths[j].clone())) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Number of conflicting pairs among the current `paths`.
    pub fn conflict_count(&self, paths: &[Path]) -> usize {
        self.conflict_pairs(paths).len()
    }

    /// Number of vehicles recorded as conflicting with `vehicle`'s
    /// current path.
    pub fn degree(&self, vehicle: usize, paths: &[Path]) -> usize {
        let Some(set) = self.adjacency.get(&(vehicle, paths[vehicle].clone())) else {
            return 0;
        };
        paths
            .iter()
            .enumerate()
            .filter(|(j, p)| *j != vehicle && set.contains(&(*j, (*p).clone())))
            .count()
    }

    fn link(&mut self, a: Key, b: Key) {
        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b).or_default().insert(a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CostGraph;

    fn setup() -> (CostGraph, CapacityMatrix) {
        let g = CostGraph::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (0, 2, 1.0)])
            .unwrap();
        let cap = CapacityMatrix::from_graph(&g, 2).with_capacity(0, 1, 1).unwrap();
        (g, cap)
    }

    #[test]
    fn test_paths_conflict_needs_tight_edge() {
        let (_, cap) = setup();
        assert!(paths_conflict(&[0, 1], &[1, 0], &cap));
        assert!(paths_conflict(&[2, 1, 0], &[0, 1], &cap));
        // Edge (1, 2) has capacity 2.
        assert!(!paths_conflict(&[1, 2], &[1, 2], &cap));
        assert!(!paths_conflict(&[0], &[0, 1], &cap));
    }

    #[test]
    fn test_phantom_hop_conflicts() {
        let (_, cap) = setup();
        // (1, 3) has capacity 0.
        assert!(paths_conflict(&[0, 1, 3], &[3, 1], &cap));
    }

    #[test]
    fn test_build_and_pairs() {
        let (_, cap) = setup();
        let paths = vec![vec![0, 1], vec![1, 2], vec![2, 1, 0]];
        let graph = ConflictGraph::build(&paths, &cap);
        assert_eq!(graph.conflict_pairs(&paths), vec![(0, 2)]);
        assert_eq!(graph.conflict_count(&paths), 1);
        assert_eq!(graph.degree(0, &paths), 1);
        assert_eq!(graph.degree(1, &paths), 0);
        assert!(graph.conflicts(2, &paths[2], 0, &paths[0]));
    }

    #[test]
    fn test_entries_are_keyed_by_exact_path() {
        let (_, cap) = setup();
        let mut paths = vec![vec![0, 1], vec![0, 1, 2]];
        let mut graph = ConflictGraph::build(&paths, &cap);
        assert_eq!(graph.conflict_count(&paths), 1);

        // Change vehicle 1's path: the old entry no longer applies.
        let old = std::mem::replace(&mut paths[1], vec![0, 2]);
        assert_eq!(graph.conflict_count(&paths), 0);
        assert!(graph.conflicts(1, &old, 0, &paths[0]));

        graph.refresh(1, &old, &paths, &cap);
        assert!(!graph.conflicts(1, &old, 0, &paths[0]));
        assert_eq!(graph.conflict_count(&paths), 0);

        // And back: refresh records the conflict again.
        let old = std::mem::replace(&mut paths[1], vec![1, 0]);
        graph.refresh(1, &old, &paths, &cap);
        assert_eq!(graph.conflict_pairs(&paths), vec![(0, 1)]);
    }

    #[test]
    fn test_conflicts_against() {
        let (_, cap) = setup();
        let paths = vec![vec![0, 1], vec![1, 0], vec![2, 3]];
        assert_eq!(conflicts_against(0, &paths[0], &paths, &cap), 1);
        assert_eq!(conflicts_against(2, &[0, 1, 2], &paths, &cap), 2);
    }
}
