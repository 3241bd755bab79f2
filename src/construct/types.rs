//! Next-node oracles consumed by the path constructor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::decoder::{CandidateDecoder, Distribution};
use crate::error::DomainError;
use crate::graph::TrafficState;
use crate::shortest_path::ShortestPathOracle;

/// Everything an oracle may look at when proposing the next node.
#[derive(Debug, Clone, Copy)]
pub struct OracleQuery<'a> {
    /// Vehicle index (position in the route request).
    pub vehicle: usize,
    /// Zero-based step within this vehicle's walk.
    pub step: usize,
    /// Node the vehicle is currently at.
    pub current: usize,
    /// The vehicle's destination.
    pub destination: usize,
    /// Path walked so far, starting at the vehicle's start.
    pub path: &'a [usize],
    /// Traffic left by earlier vehicles and earlier steps.
    pub traffic: &'a TrafficState,
}

/// Proposes the next node of a vehicle's path.
///
/// The constructor checks every proposal (not yet visited, valid index,
/// edge exists) and falls back on its own when the proposal is rejected
/// or `None`. Implementations need not filter.
///
/// Closures of type `FnMut(&OracleQuery) -> Option<usize>` implement this
/// trait.
///
/// # Examples
///
/// ```
/// use u_traffic::construct::{NextNodeOracle, OracleQuery};
///
/// // Always proposes the destination directly.
/// let mut greedy = |q: &OracleQuery<'_>| Some(q.destination);
/// # let _ = &mut greedy as &mut dyn NextNodeOracle;
/// ```
pub trait NextNodeOracle {
    /// Returns a candidate next node, or `None` for "no candidate".
    fn propose(&mut self, query: &OracleQuery<'_>) -> Option<usize>;
}

impl<F> NextNodeOracle for F
where
    F: FnMut(&OracleQuery<'_>) -> Option<usize>,
{
    fn propose(&mut self, query: &OracleQuery<'_>) -> Option<usize> {
        self(query)
    }
}

/// One fixed distribution per vehicle, decoded once.
///
/// Every step of a vehicle's walk sees the same snapshot, so the oracle
/// proposes the same node at each step. Vehicles beyond the table get no
/// candidate.
#[derive(Debug, Clone)]
pub struct DistributionTable {
    decoded: Vec<Option<usize>>,
}

impl DistributionTable {
    /// Validates and decodes every distribution.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidBitstring`] if any entry is malformed.
    pub fn new(distributions: &[Distribution], decoder: CandidateDecoder) -> Result<Self, DomainError> {
        let decoded = distributions
            .iter()
            .map(|dist| {
                decoder.validate(dist)?;
                decoder.decode(dist)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { decoded })
    }

    /// Number of vehicles with a distribution.
    pub fn len(&self) -> usize {
        self.decoded.len()
    }

    /// Returns `true` if the table holds no distributions.
    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }

    /// Decoded candidate for `vehicle`.
    pub fn candidate(&self, vehicle: usize) -> Option<usize> {
        self.decoded.get(vehicle).copied().flatten()
    }
}

impl NextNodeOracle for DistributionTable {
    fn propose(&mut self, query: &OracleQuery<'_>) -> Option<usize> {
        self.candidate(query.vehicle)
    }
}

/// A seeded stand-in for an external sampler.
///
/// At every step it draws `shots` codes: with probability `fidelity` the
/// code of the next hop on the shortest path to the destination, otherwise
/// a uniformly random code of the decoder's width (which may fold onto any
/// node). The resulting [`Distribution`] is decoded like a real sample.
pub struct NoisySampler<'o, 'g> {
    shortest: &'o ShortestPathOracle<'g>,
    decoder: CandidateDecoder,
    shots: u32,
    fidelity: f64,
    rng: StdRng,
}

impl<'o, 'g> NoisySampler<'o, 'g> {
    /// Creates a sampler with 1024 shots, fidelity 0.6, and seed 42.
    pub fn new(shortest: &'o ShortestPathOracle<'g>) -> Self {
        Self {
            shortest,
            decoder: CandidateDecoder::for_graph(shortest.graph()),
            shots: 1024,
            fidelity: 0.6,
            rng: StdRng::seed_from_u64(42),
        }
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Sets the probability of sampling the shortest-path next hop,
    /// clamped to `[0, 1]`.
    pub fn with_fidelity(mut self, fidelity: f64) -> Self {
        self.fidelity = if fidelity.is_nan() {
            0.0
        } else {
            fidelity.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Draws one distribution for `query`.
    pub fn sample(&mut self, query: &OracleQuery<'_>) -> Distribution {
        let target = match self.shortest.next_hop(query.current, query.destination) {
            Ok(hop) => hop,
            Err(err) => {
                log::warn!("sampler query failed: {err}");
                None
            }
        };
        let codes = 1usize << self.decoder.bits_per_node();

        let mut dist = Distribution::new();
        for _ in 0..self.shots {
            let code = match target {
                Some(hop) if self.rng.random_bool(self.fidelity) => hop,
                _ => self.rng.random_range(0..codes),
            };
            dist.add(self.decoder.encode(code), 1);
        }
        dist
    }
}

impl NextNodeOracle for NoisySampler<'_, '_> {
    fn propose(&mut self, query: &OracleQuery<'_>) -> Option<usize> {
        let dist = self.sample(query);
        match self.decoder.decode(&dist) {
            Ok(node) => node,
            Err(err) => {
                log::warn!("sampler produced an undecodable distribution: {err}");
                None
            }
        }
    }
}
