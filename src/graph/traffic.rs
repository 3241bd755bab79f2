//! Running edge-usage counters.

use super::CostGraph;
use crate::error::DomainError;

/// Symmetric usage counters over node pairs.
///
/// Each traversal of an existing edge `(u, v)` increments both `(u, v)`
/// and `(v, u)` by one. Hops without an edge (forced destination appends)
/// are never counted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficState {
    n: usize,
    counts: Vec<u32>,
}

impl TrafficState {
    /// All-zero traffic over `n` nodes.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            counts: vec![0; n * n],
        }
    }

    /// Starts from an externally supplied usage matrix.
    ///
    /// # Errors
    ///
    /// [`DomainError::CapacityShape`] if the matrix is not square, and
    /// [`DomainError::AsymmetricTraffic`] if it is not symmetric.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, DomainError> {
        let n = rows.len();
        let mut counts = Vec::with_capacity(n * n);
        for row in rows {
            if row.len() != n {
                return Err(DomainError::CapacityShape {
                    expected: n,
                    found: row.len(),
                });
            }
            counts.extend(row);
        }
        for u in 0..n {
            for v in (u + 1)..n {
                if counts[u * n + v] != counts[v * n + u] {
                    return Err(DomainError::AsymmetricTraffic { u, v });
                }
            }
        }
        Ok(Self { n, counts })
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.n
    }

    /// Current usage of `(u, v)`. Out-of-range pairs read as 0.
    pub fn usage(&self, u: usize, v: usize) -> u32 {
        if u >= self.n || v >= self.n {
            0
        } else {
            self.counts[u * self.n + v]
        }
    }

    /// Counts one traversal of `{u, v}` in both directions. Counters
    /// saturate at `u32::MAX`.
    pub fn record_hop(&mut self, u: usize, v: usize) {
        if u < self.n && v < self.n {
            let a = &mut self.counts[u * self.n + v];
            *a = a.saturating_add(1);
            let b = &mut self.counts[v * self.n + u];
            *b = b.saturating_add(1);
        }
    }

    /// Undoes one traversal of `{u, v}`.
    pub fn release_hop(&mut self, u: usize, v: usize) {
        if u < self.n && v < self.n {
            let a = &mut self.counts[u * self.n + v];
            *a = a.saturating_sub(1);
            let b = &mut self.counts[v * self.n + u];
            *b = b.saturating_sub(1);
        }
    }

    /// Records every hop of `path` that is an edge of `graph`.
    pub fn record_path(&mut self, graph: &CostGraph, path: &[usize]) {
        for hop in path.windows(2) {
            if graph.edge_cost(hop[0], hop[1]).is_some() {
                self.record_hop(hop[0], hop[1]);
            }
        }
    }

    /// Releases every hop of `path` that is an edge of `graph`.
    pub fn release_path(&mut self, graph: &CostGraph, path: &[usize]) {
        for hop in path.windows(2) {
            if graph.edge_cost(hop[0], hop[1]).is_some() {
                self.release_hop(hop[0], hop[1]);
            }
        }
    }

    /// Sum of all counters (each traversal contributes 2).
    pub fn total_usage(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Copies the counters out as rows, for result emission.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.counts.chunks(self.n.max(1)).map(|r| r.to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_hop_symmetric() {
        let mut t = TrafficState::new(3);
        t.record_hop(0, 2);
        assert_eq!(t.usage(0, 2), 1);
        assert_eq!(t.usage(2, 0), 1);
        assert_eq!(t.total_usage(), 2);
    }

    #[test]
    fn test_release_saturates() {
        let mut t = TrafficState::new(2);
        t.release_hop(0, 1);
        assert_eq!(t.usage(0, 1), 0);
    }

    #[test]
    fn test_record_path_skips_non_edges() {
        let g = CostGraph::from_edges(3, &[(0, 1, 1.0)]).unwrap();
        let mut t = TrafficState::new(3);
        t.record_path(&g, &[0, 1, 2]);
        assert_eq!(t.usage(0, 1), 1);
        assert_eq!(t.usage(1, 2), 0);

        t.release_path(&g, &[0, 1, 2]);
        assert_eq!(t.total_usage(), 0);
    }

    #[test]
    fn test_from_rows() {
        let t = TrafficState::from_rows(vec![vec![0, 3], vec![3, 0]]).unwrap();
        assert_eq!(t.usage(1, 0), 3);
        assert_eq!(t.to_rows(), vec![vec![0, 3], vec![3, 0]]);
        assert!(TrafficState::from_rows(vec![vec![0, 3], vec![3]]).is_err());
    }

    #[test]
    fn test_from_rows_rejects_asymmetric() {
        let result = TrafficState::from_rows(vec![vec![0, 3, 0], vec![2, 0, 0], vec![0, 0, 0]]);
        assert_eq!(result, Err(DomainError::AsymmetricTraffic { u: 0, v: 1 }));
    }

    #[test]
    fn test_record_hop_saturates() {
        let mut t = TrafficState::from_rows(vec![vec![0, u32::MAX], vec![u32::MAX, 0]]).unwrap();
        t.record_hop(0, 1);
        assert_eq!(t.usage(0, 1), u32::MAX);
        assert_eq!(t.usage(1, 0), u32::MAX);
    }
}
