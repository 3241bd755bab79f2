//! Bit-string to node decoding.

use super::Distribution;
use crate::error::DomainError;
use crate::graph::{bits_for, CostGraph};

/// Turns a sampled [`Distribution`] into one concrete node.
///
/// Node codes are unsigned binary integers `bits_per_node` characters
/// wide, with `bits_per_node = ceil(log2(n_nodes))`. Codes at or above
/// `n_nodes` are folded back into range with `code % n_nodes` rather than
/// rejected.
///
/// # Examples
///
/// ```
/// use u_traffic::decoder::{CandidateDecoder, Distribution};
///
/// let decoder = CandidateDecoder::new(5).unwrap(); // 3 bits
/// let dist = Distribution::from_counts([("001", 10), ("111", 90)]);
///
/// // 0b111 = 7 folds to 7 % 5 = 2.
/// assert_eq!(decoder.decode(&dist).unwrap(), Some(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateDecoder {
    n_nodes: usize,
    bits: usize,
}

impl CandidateDecoder {
    /// Creates a decoder for a graph with `n_nodes` nodes.
    pub fn new(n_nodes: usize) -> Result<Self, DomainError> {
        if n_nodes == 0 {
            return Err(DomainError::EmptyGraph);
        }
        Ok(Self {
            n_nodes,
            bits: bits_for(n_nodes),
        })
    }

    /// Creates a decoder sized for `graph`.
    pub fn for_graph(graph: &CostGraph) -> Self {
        Self {
            n_nodes: graph.n_nodes(),
            bits: graph.bits_per_node(),
        }
    }

    /// Number of nodes codes are folded into.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Width of a node code.
    pub fn bits_per_node(&self) -> usize {
        self.bits
    }

    /// Decodes a single bit-string.
    pub fn decode_bitstring(&self, bitstring: &str) -> Result<usize, DomainError> {
        let invalid = || DomainError::InvalidBitstring {
            bitstring: bitstring.to_string(),
            expected_bits: self.bits,
        };

        if bitstring.len() != self.bits || !bitstring.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(invalid());
        }
        if self.bits == 0 {
            return Ok(0);
        }

        let raw = u64::from_str_radix(bitstring, 2).map_err(|_| invalid())?;
        Ok((raw % self.n_nodes as u64) as usize)
    }

    /// Decodes the most frequent bit-string, or `None` for an empty
    /// distribution.
    pub fn decode(&self, dist: &Distribution) -> Result<Option<usize>, DomainError> {
        dist.most_frequent()
            .map(|bits| self.decode_bitstring(bits))
            .transpose()
    }

    /// Checks that every entry of `dist` is a well-formed code.
    pub fn validate(&self, dist: &Distribution) -> Result<(), DomainError> {
        for (bits, _) in dist.entries() {
            self.decode_bitstring(bits)?;
        }
        Ok(())
    }

    /// Encodes `code` as a zero-padded bit-string of the decoder's width.
    ///
    /// `code` may exceed `n_nodes`; it is not folded.
    pub fn encode(&self, code: usize) -> String {
        if self.bits == 0 {
            String::new()
        } else {
            format!("{code:0width$b}", width = self.bits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_from_node_count() {
        assert_eq!(CandidateDecoder::new(1).unwrap().bits_per_node(), 0);
        assert_eq!(CandidateDecoder::new(4).unwrap().bits_per_node(), 2);
        assert_eq!(CandidateDecoder::new(6).unwrap().bits_per_node(), 3);
        assert_eq!(CandidateDecoder::new(0), Err(DomainError::EmptyGraph));
    }

    #[test]
    fn test_decode_in_range() {
        let d = CandidateDecoder::new(6).unwrap();
        assert_eq!(d.decode_bitstring("101").unwrap(), 5);
        assert_eq!(d.decode_bitstring("000").unwrap(), 0);
    }

    #[test]
    fn test_decode_folds_out_of_range() {
        let d = CandidateDecoder::new(6).unwrap();
        assert_eq!(d.decode_bitstring("110").unwrap(), 0);
        assert_eq!(d.decode_bitstring("111").unwrap(), 1);
    }

    #[test]
    fn test_decode_rejects_bad_width_and_chars() {
        let d = CandidateDecoder::new(4).unwrap();
        assert!(d.decode_bitstring("1").is_err());
        assert!(d.decode_bitstring("101").is_err());
        assert!(matches!(
            d.decode_bitstring("1x"),
            Err(DomainError::InvalidBitstring { expected_bits: 2, .. })
        ));
    }

    #[test]
    fn test_decode_empty_distribution_is_none() {
        let d = CandidateDecoder::new(4).unwrap();
        assert_eq!(d.decode(&Distribution::new()).unwrap(), None);
    }

    #[test]
    fn test_decode_picks_highest_count() {
        let d = CandidateDecoder::new(4).unwrap();
        let dist = Distribution::from_counts([("00", 1), ("10", 9), ("11", 3)]);
        assert_eq!(d.decode(&dist).unwrap(), Some(2));
    }

    #[test]
    fn test_single_node_graph() {
        let d = CandidateDecoder::new(1).unwrap();
        assert_eq!(d.encode(0), "");
        assert_eq!(d.decode_bitstring("").unwrap(), 0);
    }

    #[test]
    fn test_encode_round_trip() {
        let d = CandidateDecoder::new(5).unwrap();
        assert_eq!(d.encode(3), "011");
        assert_eq!(d.decode_bitstring(&d.encode(4)).unwrap(), 4);
    }

    #[test]
    fn test_validate() {
        let d = CandidateDecoder::new(4).unwrap();
        assert!(d.validate(&Distribution::from_counts([("01", 1)])).is_ok());
        assert!(d.validate(&Distribution::from_counts([("01", 1), ("2", 1)])).is_err());
    }
}
