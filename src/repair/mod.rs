//! Conflict repair.
//!
//! Two vehicles conflict when their paths share an undirected edge whose
//! capacity is at most 1. The repair loop repeatedly takes the first
//! conflicting pair and replaces one of the two paths with the candidate
//! that best trades path cost against conflicts:
//!
//! ```text
//! Δ = (new cost − old cost) + λ · (new conflicts − old conflicts)
//! ```
//!
//! Candidates are only ever shortcuts of the current path (one interior
//! node removed), so repair never lengthens a path. Under the default
//! [`ConflictGuard::NonIncreasing`], a candidate that would conflict with
//! more vehicles than the path it replaces is never selected, so the
//! conflict count never grows.
//!
//! # Key Types
//!
//! - [`RepairConfig`]: iteration cap, λ, candidate cap, acceptance rule, guard
//! - [`ConflictGraph`]: conflict relation keyed by exact paths
//! - [`RepairRunner`]: runs the loop and returns a [`RepairResult`]

mod config;
mod conflict;
mod runner;

pub use config::{AcceptanceRule, ConflictGuard, RepairConfig};
pub use conflict::{conflicts_against, paths_conflict, ConflictGraph};
pub use runner::{RepairMove, RepairResult, RepairRunner};
