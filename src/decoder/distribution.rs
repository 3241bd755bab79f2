//! Frequency distributions over bit-encoded node identifiers.

/// Occurrence counts keyed by fixed-width bit-strings.
///
/// Entries keep their first-insertion order, which decides ties in
/// [`most_frequent`](Distribution::most_frequent). Adding an existing
/// bit-string accumulates its count.
///
/// # Examples
///
/// ```
/// use u_traffic::decoder::Distribution;
///
/// let dist = Distribution::from_counts([("01", 12), ("11", 40), ("10", 40)]);
/// assert_eq!(dist.most_frequent(), Some("11"));
/// assert_eq!(dist.total(), 92);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distribution {
    entries: Vec<(String, u64)>,
}

impl Distribution {
    /// Creates an empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a distribution from `(bit-string, count)` pairs.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut dist = Self::new();
        for (bits, count) in counts {
            dist.add(bits, count);
        }
        dist
    }

    /// Adds `count` occurrences of `bitstring`.
    pub fn add(&mut self, bitstring: impl Into<String>, count: u64) {
        let bitstring = bitstring.into();
        match self.entries.iter_mut().find(|(b, _)| *b == bitstring) {
            Some((_, c)) => *c += count,
            None => self.entries.push((bitstring, count)),
        }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    /// Number of distinct bit-strings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no bit-string was observed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// The bit-string with the highest count; the earliest entry wins ties.
    pub fn most_frequent(&self) -> Option<&str> {
        let mut best: Option<&(String, u64)> = None;
        for entry in &self.entries {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(b, _)| b.as_str())
    }

    /// Marginal probabilities `P(bit_i = 1)` for `i in 0..n_bits`.
    ///
    /// Bit 0 is the least-significant (rightmost) character. Characters
    /// other than `'1'` count as zero. An empty or all-zero distribution
    /// yields all zeros.
    pub fn marginals(&self, n_bits: usize) -> Vec<f64> {
        let mut marginals = vec![0.0; n_bits];
        let total = self.total();
        if total == 0 {
            return marginals;
        }

        for (bits, count) in &self.entries {
            for (i, ch) in bits.chars().rev().take(n_bits).enumerate() {
                if ch == '1' {
                    marginals[i] += *count as f64;
                }
            }
        }

        for m in &mut marginals {
            *m /= total as f64;
        }
        marginals
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Distribution {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self::from_counts(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let d = Distribution::new();
        assert!(d.is_empty());
        assert_eq!(d.most_frequent(), None);
        assert_eq!(d.marginals(3), vec![0.0; 3]);
    }

    #[test]
    fn test_tie_keeps_first() {
        let d = Distribution::from_counts([("10", 5), ("01", 5)]);
        assert_eq!(d.most_frequent(), Some("10"));
    }

    #[test]
    fn test_add_accumulates_in_place() {
        let mut d = Distribution::new();
        d.add("00", 3);
        d.add("01", 4);
        d.add("00", 2);
        assert_eq!(d.len(), 2);
        assert_eq!(d.entries()[0], ("00".to_string(), 5));
        assert_eq!(d.most_frequent(), Some("00"));
    }

    #[test]
    fn test_marginals_lsb_first() {
        // "01": bit0 = 1; "10": bit1 = 1.
        let d = Distribution::from_counts([("01", 3), ("10", 1)]);
        let m = d.marginals(2);
        assert!((m[0] - 0.75).abs() < 1e-12);
        assert!((m[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_collect() {
        let d: Distribution = vec![("1".to_string(), 2u64)].into_iter().collect();
        assert_eq!(d.total(), 2);
    }
}
