//! Memoized binary-heap Dijkstra.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{PoisonError, RwLock};

use crate::error::DomainError;
use crate::graph::CostGraph;
use crate::path::Path;

/// A shortest path and its cost.
///
/// `cost` is `f64::INFINITY` when the destination cannot be reached; the
/// path is then the two-node placeholder `[start, end]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShortestPath {
    /// Node sequence from start to end.
    pub path: Path,
    /// Sum of `|weight|` along the path.
    pub cost: f64,
}

impl ShortestPath {
    /// Whether the destination was reached.
    pub fn is_reachable(&self) -> bool {
        self.cost.is_finite()
    }

    /// The node after the start, if the path is reachable and non-trivial.
    pub fn next_hop(&self) -> Option<usize> {
        if self.is_reachable() {
            self.path.get(1).copied()
        } else {
            None
        }
    }
}

/// Heap entry ordered as a min-heap on `(cost, node)`.
#[derive(Debug, Clone, Copy)]
struct State {
    cost: f64,
    node: usize,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Single-pair shortest paths over a [`CostGraph`], memoized for the
/// oracle's lifetime.
///
/// The memo is keyed by the *ordered* pair `(start, end)` and is never
/// invalidated: the oracle ignores traffic entirely. Lookups take a read
/// lock; a miss runs the search and takes the write lock to store it, so
/// the oracle can be shared across threads.
///
/// # Examples
///
/// ```
/// use u_traffic::graph::CostGraph;
/// use u_traffic::shortest_path::ShortestPathOracle;
///
/// let graph = CostGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
/// let oracle = ShortestPathOracle::new(&graph);
///
/// let sp = oracle.shortest_path(0, 2).unwrap();
/// assert_eq!(sp.path, vec![0, 1, 2]);
/// assert_eq!(sp.cost, 2.0);
/// ```
#[derive(Debug)]
pub struct ShortestPathOracle<'g> {
    graph: &'g CostGraph,
    adjacency: Vec<Vec<(usize, f64)>>,
    cache: RwLock<HashMap<(usize, usize), ShortestPath>>,
    searches: AtomicUsize,
}

impl<'g> ShortestPathOracle<'g> {
    /// Creates an oracle with an empty memo.
    ///
    /// Outgoing edges are collected once here, so each search relaxes only
    /// real edges.
    pub fn new(graph: &'g CostGraph) -> Self {
        let adjacency = (0..graph.n_nodes())
            .map(|u| {
                graph
                    .neighbors(u)
                    .map(|edges| edges.collect::<Vec<_>>())
                    .unwrap_or_default()
            })
            .collect();
        Self {
            graph,
            adjacency,
            cache: RwLock::new(HashMap::new()),
            searches: AtomicUsize::new(0),
        }
    }

    /// The graph this oracle searches.
    pub fn graph(&self) -> &'g CostGraph {
        self.graph
    }

    /// Shortest path from `start` to `end`.
    ///
    /// # Errors
    ///
    /// [`DomainError::NodeOutOfRange`] for invalid endpoints. An
    /// unreachable destination is not an error.
    pub fn shortest_path(&self, start: usize, end: usize) -> Result<ShortestPath, DomainError> {
        self.graph.check_node(start)?;
        self.graph.check_node(end)?;

        if start == end {
            return Ok(ShortestPath {
                path: vec![start],
                cost: 0.0,
            });
        }

        let key = (start, end);
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(hit.clone());
        }

        // Another thread may have filled the entry between the two locks.
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(&key) {
            return Ok(hit.clone());
        }

        let result = self.search(start, end);
        self.searches.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(cache.entry(key).or_insert(result).clone())
    }

    /// Next node on the shortest path from `current` to `end`.
    pub fn next_hop(&self, current: usize, end: usize) -> Result<Option<usize>, DomainError> {
        Ok(self.shortest_path(current, end)?.next_hop())
    }

    /// Number of uncached searches run so far.
    pub fn searches(&self) -> usize {
        self.searches.load(AtomicOrdering::Relaxed)
    }

    /// Number of memoized `(start, end)` pairs.
    pub fn cached_pairs(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn search(&self, start: usize, end: usize) -> ShortestPath {
        let n = self.graph.n_nodes();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev = vec![usize::MAX; n];
        let mut heap = BinaryHeap::new();

        dist[start] = 0.0;
        heap.push(State {
            cost: 0.0,
            node: start,
        });

        while let Some(State { cost, node }) = heap.pop() {
            if node == end {
                break;
            }
            if cost > dist[node] {
                continue;
            }
            for &(v, w) in &self.adjacency[node] {
                let next = cost + w;
                if next < dist[v] {
                    dist[v] = next;
                    prev[v] = node;
                    heap.push(State { cost: next, node: v });
                }
            }
        }

        if dist[end].is_infinite() {
            return ShortestPath {
                path: vec![start, end],
                cost: f64::INFINITY,
            };
        }

        let mut path = vec![end];
        let mut current = end;
        while current != start {
            current = prev[current];
            path.push(current);
        }
        path.reverse();

        ShortestPath {
            path,
            cost: dist[end],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn test_three_node_line() {
        let g = CostGraph::new(vec![
            vec![0.0, 1.0, INF],
            vec![1.0, 0.0, 1.0],
            vec![INF, 1.0, 0.0],
        ])
        .unwrap();
        let oracle = ShortestPathOracle::new(&g);
        let sp = oracle.shortest_path(0, 2).unwrap();
        assert_eq!(sp.path, vec![0, 1, 2]);
        assert_eq!(sp.cost, 2.0);
        assert_eq!(sp.next_hop(), Some(1));
    }

    #[test]
    fn test_prefers_cheaper_detour() {
        let g = CostGraph::from_edges(4, &[(0, 3, 10.0), (0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)])
            .unwrap();
        let oracle = ShortestPathOracle::new(&g);
        let sp = oracle.shortest_path(0, 3).unwrap();
        assert_eq!(sp.path, vec![0, 1, 2, 3]);
        assert_eq!(sp.cost, 3.0);
    }

    #[test]
    fn test_negative_weights_use_magnitude() {
        let g = CostGraph::from_edges(3, &[(0, 1, -5.0), (0, 2, 1.0), (2, 1, 1.0)]).unwrap();
        let oracle = ShortestPathOracle::new(&g);
        let sp = oracle.shortest_path(0, 1).unwrap();
        assert_eq!(sp.path, vec![0, 2, 1]);
        assert_eq!(sp.cost, 2.0);
    }

    #[test]
    fn test_unreachable_is_infinite_not_error() {
        let g = CostGraph::from_edges(3, &[(0, 1, 1.0)]).unwrap();
        let oracle = ShortestPathOracle::new(&g);
        let sp = oracle.shortest_path(0, 2).unwrap();
        assert!(sp.cost.is_infinite());
        assert_eq!(sp.path, vec![0, 2]);
        assert!(!sp.is_reachable());
        assert_eq!(sp.next_hop(), None);
    }

    #[test]
    fn test_same_start_end() {
        let g = CostGraph::from_edges(2, &[(0, 1, 1.0)]).unwrap();
        let oracle = ShortestPathOracle::new(&g);
        let sp = oracle.shortest_path(1, 1).unwrap();
        assert_eq!(sp.path, vec![1]);
        assert_eq!(sp.cost, 0.0);
        assert_eq!(oracle.searches(), 0);
    }

    #[test]
    fn test_out_of_range_endpoint() {
        let g = CostGraph::from_edges(2, &[(0, 1, 1.0)]).unwrap();
        let oracle = ShortestPathOracle::new(&g);
        assert!(matches!(
            oracle.shortest_path(0, 2),
            Err(DomainError::NodeOutOfRange { node: 2, .. })
        ));
    }

    #[test]
    fn test_cache_is_transparent_and_counted() {
        let g = CostGraph::from_edges(4, &[(0, 1, 1.0), (1, 2, 2.0), (2, 3, 3.0)]).unwrap();
        let oracle = ShortestPathOracle::new(&g);

        let first = oracle.shortest_path(0, 3).unwrap();
        for _ in 0..5 {
            assert_eq!(oracle.shortest_path(0, 3).unwrap(), first);
        }
        assert_eq!(oracle.searches(), 1);

        // Ordered key: the reverse direction is a separate entry.
        let back = oracle.shortest_path(3, 0).unwrap();
        assert_eq!(back.path, vec![3, 2, 1, 0]);
        assert_eq!(oracle.searches(), 2);
        assert_eq!(oracle.cached_pairs(), 2);
    }

    #[test]
    fn test_adjacency_holds_real_edges_only() {
        // Ring of 6 with one chord: no diagonal entries, no INF cells.
        let g = CostGraph::from_edges(
            6,
            &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 5, 1.0), (5, 0, 1.0), (0, 3, -2.5)],
        )
        .unwrap();
        let oracle = ShortestPathOracle::new(&g);
        assert_eq!(oracle.adjacency[0], vec![(1, 1.0), (3, 2.5), (5, 1.0)]);
        assert_eq!(oracle.adjacency[2], vec![(1, 1.0), (3, 1.0)]);
        assert_eq!(
            oracle.adjacency.iter().map(Vec::len).sum::<usize>(),
            g.edge_count()
        );
        assert_eq!(oracle.shortest_path(0, 3).unwrap().cost, 2.5);
    }

    #[test]
    fn test_directed_graph_directions_differ() {
        let g = CostGraph::new(vec![vec![0.0, 1.0], vec![INF, 0.0]]).unwrap();
        let oracle = ShortestPathOracle::new(&g);
        assert_eq!(oracle.shortest_path(0, 1).unwrap().cost, 1.0);
        assert!(oracle.shortest_path(1, 0).unwrap().cost.is_infinite());
    }

    #[test]
    fn test_shared_across_threads() {
        let g = CostGraph::from_edges(5, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)])
            .unwrap();
        let oracle = ShortestPathOracle::new(&g);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let sp = oracle.shortest_path(0, 4).unwrap();
                    assert_eq!(sp.cost, 4.0);
                });
            }
        });
        assert_eq!(oracle.cached_pairs(), 1);
        assert_eq!(oracle.searches(), 1);
    }

    // ---- Brute force over simple paths ----

    fn brute_force(g: &CostGraph, start: usize, end: usize) -> f64 {
        fn dfs(g: &CostGraph, u: usize, end: usize, seen: &mut Vec<bool>, acc: f64, best: &mut f64) {
            if u == end {
                *best = best.min(acc);
                return;
            }
            for v in 0..g.n_nodes() {
                if seen[v] {
                    continue;
                }
                if let Some(w) = g.edge_cost(u, v) {
                    seen[v] = true;
                    dfs(g, v, end, seen, acc + w, best);
                    seen[v] = false;
                }
            }
        }
        let mut seen = vec![false; g.n_nodes()];
        seen[start] = true;
        let mut best = f64::INFINITY;
        dfs(g, start, end, &mut seen, 0.0, &mut best);
        best
    }

    fn small_graph() -> impl Strategy<Value = CostGraph> {
        (2usize..=7).prop_flat_map(|n| {
            prop::collection::vec(prop::option::weighted(0.5, -20i32..=20), n * n).prop_map(
                move |cells| {
                    let rows = (0..n)
                        .map(|u| {
                            (0..n)
                                .map(|v| match cells[u * n + v] {
                                    Some(w) => w as f64,
                                    None => f64::INFINITY,
                                })
                                .collect()
                        })
                        .collect();
                    CostGraph::new(rows).unwrap()
                },
            )
        })
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(g in small_graph()) {
            let oracle = ShortestPathOracle::new(&g);
            for s in 0..g.n_nodes() {
                for t in 0..g.n_nodes() {
                    let sp = oracle.shortest_path(s, t).unwrap();
                    let expected = if s == t { 0.0 } else { brute_force(&g, s, t) };
                    prop_assert_eq!(sp.cost, expected);
                    if sp.is_reachable() {
                        prop_assert_eq!(sp.path[0], s);
                        prop_assert_eq!(*sp.path.last().unwrap(), t);
                        let walked: f64 = sp.path.windows(2)
                            .map(|w| g.edge_cost(w[0], w[1]).unwrap())
                            .sum();
                        prop_assert_eq!(walked, sp.cost);
                    }
                }
            }
        }
    }
}
