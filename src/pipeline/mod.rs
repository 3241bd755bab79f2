//! End-to-end routing.
//!
//! [`RoutingPipeline`] runs one graph through construction and repair and
//! returns a [`RoutingReport`]. [`BatchRunner`] does the same for many
//! independent [`GraphInstance`]s, skipping the ones that fail.

mod batch;
mod config;
mod runner;

pub use batch::{BatchFailure, BatchReport, BatchRunner, GraphInstance};
pub use config::RoutingConfig;
pub use runner::{RoutingPipeline, RoutingReport};
