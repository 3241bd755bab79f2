//! Error types for malformed graph, route, and distribution input.

/// Errors raised for malformed input.
///
/// A `DomainError` is fatal for the graph it was raised on. Batch
/// processing records it and moves on to the next graph.
///
/// Unreachable destinations are *not* errors; they are reported as
/// `f64::INFINITY` path costs.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The cost matrix has no rows.
    EmptyGraph,

    /// A row of the cost matrix does not have `n` entries.
    NonSquareMatrix {
        /// Number of rows (expected row length).
        rows: usize,
        /// Index of the offending row.
        row: usize,
        /// Actual length of that row.
        len: usize,
    },

    /// A weight is NaN.
    InvalidWeight { u: usize, v: usize },

    /// A node identifier is outside `0..n_nodes`.
    NodeOutOfRange { node: usize, n_nodes: usize },

    /// A supplied capacity or traffic matrix does not match the graph size.
    CapacityShape { expected: usize, found: usize },

    /// A supplied capacity matrix has `capacity(u, v) != capacity(v, u)`.
    AsymmetricCapacity { u: usize, v: usize },

    /// A supplied traffic matrix has `usage(u, v) != usage(v, u)`.
    AsymmetricTraffic { u: usize, v: usize },

    /// A bit-string has the wrong width or a non-binary character.
    InvalidBitstring { bitstring: String, expected_bits: usize },

    /// A configuration failed validation.
    InvalidConfig(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::EmptyGraph => write!(f, "cost matrix is empty"),
            DomainError::NonSquareMatrix { rows, row, len } => write!(
                f,
                "cost matrix is not square: row {row} has {len} entries, expected {rows}"
            ),
            DomainError::InvalidWeight { u, v } => {
                write!(f, "weight ({u}, {v}) is not a number")
            }
            DomainError::NodeOutOfRange { node, n_nodes } => {
                write!(f, "node {node} out of range for graph with {n_nodes} nodes")
            }
            DomainError::CapacityShape { expected, found } => write!(
                f,
                "matrix size mismatch: expected {expected}x{expected}, found {found}"
            ),
            DomainError::AsymmetricCapacity { u, v } => {
                write!(f, "capacity ({u}, {v}) differs from capacity ({v}, {u})")
            }
            DomainError::AsymmetricTraffic { u, v } => {
                write!(f, "traffic ({u}, {v}) differs from traffic ({v}, {u})")
            }
            DomainError::InvalidBitstring {
                bitstring,
                expected_bits,
            } => write!(
                f,
                "bit-string {bitstring:?} is not a {expected_bits}-bit binary code"
            ),
            DomainError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_node_out_of_range() {
        let err = DomainError::NodeOutOfRange {
            node: 7,
            n_nodes: 3,
        };
        assert_eq!(
            err.to_string(),
            "node 7 out of range for graph with 3 nodes"
        );
    }

    #[test]
    fn test_display_bitstring() {
        let err = DomainError::InvalidBitstring {
            bitstring: "1x".into(),
            expected_bits: 2,
        };
        assert!(err.to_string().contains("\"1x\""));
    }
}
