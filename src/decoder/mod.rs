//! Candidate decoding.
//!
//! An external sampler reports, per vehicle, how often it observed each
//! fixed-width bit-string. [`CandidateDecoder`] maps the most frequent
//! bit-string to a node index; [`Distribution`] holds the counts.

#[allow(clippy::module_inception)]
mod decoder;
mod distribution;

pub use decoder::CandidateDecoder;
pub use distribution::Distribution;
