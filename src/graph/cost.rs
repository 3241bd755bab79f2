//! Immutable weighted adjacency over `N` nodes.

use crate::error::DomainError;

/// A dense cost matrix with an explicit "no edge" sentinel.
///
/// Edges are read from an `N x N` row-major matrix of real weights. An
/// infinite entry means "no edge". The diagonal is never traversed, so
/// [`exists`](CostGraph::exists) is always `false` for `u == v`.
///
/// The traversal cost of an edge is the *magnitude* of its weight:
/// negative weights are accepted and their absolute value is used.
///
/// # Examples
///
/// ```
/// use u_traffic::graph::CostGraph;
///
/// let inf = f64::INFINITY;
/// let graph = CostGraph::new(vec![
///     vec![0.0, 1.0, inf],
///     vec![1.0, 0.0, -2.0],
///     vec![inf, -2.0, 0.0],
/// ]).unwrap();
///
/// assert!(graph.exists(0, 1).unwrap());
/// assert!(!graph.exists(0, 2).unwrap());
/// assert_eq!(graph.cost(1, 2).unwrap(), Some(2.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CostGraph {
    n: usize,
    weights: Vec<f64>,
}

impl CostGraph {
    /// Builds a graph from a square matrix of weights.
    ///
    /// # Errors
    ///
    /// - [`DomainError::EmptyGraph`] if `rows` is empty
    /// - [`DomainError::NonSquareMatrix`] if any row length differs from
    ///   the number of rows
    /// - [`DomainError::InvalidWeight`] if any entry is NaN
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, DomainError> {
        let n = rows.len();
        if n == 0 {
            return Err(DomainError::EmptyGraph);
        }

        let mut weights = Vec::with_capacity(n * n);
        for (u, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(DomainError::NonSquareMatrix {
                    rows: n,
                    row: u,
                    len: row.len(),
                });
            }
            if let Some(v) = row.iter().position(|w| w.is_nan()) {
                return Err(DomainError::InvalidWeight { u, v });
            }
            weights.extend(row);
        }

        Ok(Self { n, weights })
    }

    /// Builds a symmetric graph over `n` nodes from an undirected edge list.
    ///
    /// All pairs not listed have no edge. Diagonal entries are zero.
    pub fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Result<Self, DomainError> {
        if n == 0 {
            return Err(DomainError::EmptyGraph);
        }
        let mut weights = vec![f64::INFINITY; n * n];
        for u in 0..n {
            weights[u * n + u] = 0.0;
        }
        for &(u, v, w) in edges {
            for node in [u, v] {
                if node >= n {
                    return Err(DomainError::NodeOutOfRange { node, n_nodes: n });
                }
            }
            if w.is_nan() {
                return Err(DomainError::InvalidWeight { u, v });
            }
            weights[u * n + v] = w;
            weights[v * n + u] = w;
        }
        Ok(Self { n, weights })
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.n
    }

    /// Returns `true` if `node` is a valid node index.
    pub fn contains(&self, node: usize) -> bool {
        node < self.n
    }

    /// Fails with [`DomainError::NodeOutOfRange`] unless `node` is valid.
    pub fn check_node(&self, node: usize) -> Result<(), DomainError> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(DomainError::NodeOutOfRange {
                node,
                n_nodes: self.n,
            })
        }
    }

    /// Raw weight of `(u, v)`, or `None` when the entry is the
    /// unreachable sentinel.
    pub fn weight(&self, u: usize, v: usize) -> Result<Option<f64>, DomainError> {
        self.check_node(u)?;
        self.check_node(v)?;
        let w = self.weights[u * self.n + v];
        Ok(if w.is_infinite() { None } else { Some(w) })
    }

    /// Returns `true` iff `u != v` and the weight is not the sentinel.
    pub fn exists(&self, u: usize, v: usize) -> Result<bool, DomainError> {
        self.check_node(u)?;
        self.check_node(v)?;
        Ok(self.edge_cost(u, v).is_some())
    }

    /// Traversal cost `|weight(u, v)|` of an existing edge.
    pub fn cost(&self, u: usize, v: usize) -> Result<Option<f64>, DomainError> {
        self.check_node(u)?;
        self.check_node(v)?;
        Ok(self.edge_cost(u, v))
    }

    /// Unchecked edge cost for hot loops. Out-of-range indices read as
    /// "no edge".
    pub(crate) fn edge_cost(&self, u: usize, v: usize) -> Option<f64> {
        if u == v || u >= self.n || v >= self.n {
            return None;
        }
        let w = self.weights[u * self.n + v];
        if w.is_infinite() {
            None
        } else {
            Some(w.abs())
        }
    }

    /// Existing outgoing edges of `u` as `(v, cost)`, in ascending `v`.
    pub fn neighbors(&self, u: usize) -> Result<impl Iterator<Item = (usize, f64)> + '_, DomainError> {
        self.check_node(u)?;
        Ok((0..self.n).filter_map(move |v| self.edge_cost(u, v).map(|c| (v, c))))
    }

    /// Number of directed edges (ordered pairs with an edge).
    pub fn edge_count(&self) -> usize {
        (0..self.n)
            .map(|u| (0..self.n).filter(|&v| self.edge_cost(u, v).is_some()).count())
            .sum()
    }

    /// Width of the binary node code: `ceil(log2(n_nodes))`.
    pub fn bits_per_node(&self) -> usize {
        bits_for(self.n)
    }
}

/// `ceil(log2(n))`, with `bits_for(1) == 0`.
pub(crate) fn bits_for(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}
