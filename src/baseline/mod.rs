//! Congestion-unaware baseline.
//!
//! Every vehicle takes its own shortest path, and the set is scored with
//! a quadratic congestion energy
//!
//! ```text
//! E = Σ path costs + weight · Σ_e n_e (n_e − 1)
//! ```
//!
//! where `n_e` is the number of vehicles on undirected edge `e`. This is
//! the reference point the constructed and repaired paths are compared
//! against.

mod router;

pub use router::{congestion_penalty, BaselineResult, ShortestPathRouter};
