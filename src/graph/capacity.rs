//! Per-edge capacity limits.

use super::CostGraph;
use crate::error::DomainError;

/// Symmetric matrix of edge capacities.
///
/// Derived capacities give every pair with an edge in *either* direction
/// the same default capacity, so `capacity(u, v) == capacity(v, u)` holds
/// even for directed cost matrices. Non-edges have capacity 0.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacityMatrix {
    n: usize,
    values: Vec<u32>,
}

impl CapacityMatrix {
    /// Derives capacities from the edges of `graph`.
    pub fn from_graph(graph: &CostGraph, default_capacity: u32) -> Self {
        let n = graph.n_nodes();
        let mut values = vec![0; n * n];
        for u in 0..n {
            for v in 0..n {
                if graph.edge_cost(u, v).is_some() || graph.edge_cost(v, u).is_some() {
                    values[u * n + v] = default_capacity;
                }
            }
        }
        Self { n, values }
    }

    /// Builds a capacity matrix from explicit rows.
    ///
    /// # Errors
    ///
    /// [`DomainError::CapacityShape`] if the matrix is not square, and
    /// [`DomainError::AsymmetricCapacity`] if it is not symmetric.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, DomainError> {
        let n = rows.len();
        let mut values = Vec::with_capacity(n * n);
        for row in rows {
            if row.len() != n {
                return Err(DomainError::CapacityShape {
                    expected: n,
                    found: row.len(),
                });
            }
            values.extend(row);
        }
        for u in 0..n {
            for v in (u + 1)..n {
                if values[u * n + v] != values[v * n + u] {
                    return Err(DomainError::AsymmetricCapacity { u, v });
                }
            }
        }
        Ok(Self { n, values })
    }

    /// Overrides the capacity of the undirected edge `{u, v}`.
    pub fn with_capacity(mut self, u: usize, v: usize, capacity: u32) -> Result<Self, DomainError> {
        self.check_node(u)?;
        self.check_node(v)?;
        self.values[u * self.n + v] = capacity;
        self.values[v * self.n + u] = capacity;
        Ok(self)
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.n
    }

    /// Capacity of `(u, v)`.
    pub fn capacity(&self, u: usize, v: usize) -> Result<u32, DomainError> {
        self.check_node(u)?;
        self.check_node(v)?;
        Ok(self.get(u, v))
    }

    /// Unchecked lookup. Out-of-range pairs have capacity 0.
    pub(crate) fn get(&self, u: usize, v: usize) -> u32 {
        if u >= self.n || v >= self.n {
            0
        } else {
            self.values[u * self.n + v]
        }
    }

    fn check_node(&self, node: usize) -> Result<(), DomainError> {
        if node < self.n {
            Ok(())
        } else {
            Err(DomainError::NodeOutOfRange {
                node,
                n_nodes: self.n,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn test_from_graph_default() {
        let g = CostGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 5.0)]).unwrap();
        let cap = CapacityMatrix::from_graph(&g, 2);
        assert_eq!(cap.capacity(0, 1).unwrap(), 2);
        assert_eq!(cap.capacity(2, 1).unwrap(), 2);
        assert_eq!(cap.capacity(0, 2).unwrap(), 0);
        assert_eq!(cap.capacity(1, 1).unwrap(), 0);
    }

    #[test]
    fn test_from_directed_graph_is_symmetric() {
        let g = CostGraph::new(vec![vec![0.0, 3.0], vec![INF, 0.0]]).unwrap();
        let cap = CapacityMatrix::from_graph(&g, 2);
        assert_eq!(cap.capacity(0, 1).unwrap(), cap.capacity(1, 0).unwrap());
        assert_eq!(cap.capacity(1, 0).unwrap(), 2);
    }

    #[test]
    fn test_from_rows_rejects_asymmetric() {
        let err = CapacityMatrix::from_rows(vec![vec![0, 1], vec![2, 0]]).unwrap_err();
        assert_eq!(err, DomainError::AsymmetricCapacity { u: 0, v: 1 });
        assert!(CapacityMatrix::from_rows(vec![vec![0, 1], vec![1]]).is_err());
    }

    #[test]
    fn test_with_capacity_sets_both_directions() {
        let g = CostGraph::from_edges(3, &[(0, 1, 1.0)]).unwrap();
        let cap = CapacityMatrix::from_graph(&g, 2)
            .with_capacity(1, 0, 1)
            .unwrap();
        assert_eq!(cap.capacity(0, 1).unwrap(), 1);
        assert_eq!(cap.capacity(1, 0).unwrap(), 1);
        assert!(cap.capacity(0, 5).is_err());
    }
}
