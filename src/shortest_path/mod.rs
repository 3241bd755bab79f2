//! Shortest-path oracle.
//!
//! Single-source Dijkstra with a binary heap, answering `(start, end)`
//! queries and memoizing every answer for the lifetime of the oracle.
//! Complexity is `O((|E| + |V|) log |V|)` per uncached query and `O(1)`
//! amortized afterwards.
//!
//! # References
//!
//! Dijkstra, E. W. (1959). "A note on two problems in connexion with graphs",
//! *Numerische Mathematik* 1, 269-271.

mod oracle;

pub use oracle::{ShortestPath, ShortestPathOracle};
