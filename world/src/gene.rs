//! Fixed-length genetic codes with one-directional mutation.

use std::fmt;

use crate::RandomSource;

/// Fixed-length bit string carried by cells and immune agents.
///
/// Positions only ever flip from `0` to `1`, so the gene value of a lineage
/// never decreases.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneticCode {
    bits: Vec<bool>,
}

impl GeneticCode {
    /// Gene of the given length with every position intact.
    #[must_use]
    pub fn zeroed(length: usize) -> Self {
        Self {
            bits: vec![false; length],
        }
    }

    /// Gene of the given length with every position mutated.
    #[must_use]
    pub fn saturated(length: usize) -> Self {
        Self {
            bits: vec![true; length],
        }
    }

    /// Gene of the given length with every position set by a coin flip.
    #[must_use]
    pub fn random(length: usize, random: &mut RandomSource) -> Self {
        let mut gene = Self::zeroed(length);
        gene.randomize(random);
        gene
    }

    /// Builds a gene from a string of `'0'` and `'1'`; any other character reads as `'0'`.
    #[must_use]
    pub fn from_bits(bits: &str) -> Self {
        Self {
            bits: bits.chars().map(|bit| bit == '1').collect(),
        }
    }

    /// Sets each position independently by a coin flip.
    pub fn randomize(&mut self, random: &mut RandomSource) {
        for bit in &mut self.bits {
            *bit = random.coin_flip();
        }
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Reports whether the gene has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of mutated positions.
    #[must_use]
    pub fn value(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }

    /// Reports whether the first position is mutated.
    #[must_use]
    pub fn is_mutant(&self) -> bool {
        self.bits.first().copied().unwrap_or(false)
    }

    /// With probability `percent`, mutates one uniformly chosen position.
    ///
    /// Returns `true` only when an intact position flipped; hitting an already
    /// mutated position changes nothing.
    pub fn mutate(&mut self, percent: f64, random: &mut RandomSource) -> bool {
        if self.bits.is_empty() || !random.probability(percent) {
            return false;
        }
        let position = random.index(self.bits.len());
        match self.bits.get_mut(position) {
            Some(bit) if !*bit => {
                *bit = true;
                true
            }
            _ => false,
        }
    }

    /// Exact equality, the immune recognition criterion.
    #[must_use]
    pub fn matches(&self, other: &GeneticCode) -> bool {
        self == other
    }

    /// Share of mutated positions as a percentage in `[0, 100]`.
    #[must_use]
    pub fn immunogenicity(&self) -> f64 {
        if self.bits.is_empty() {
            return 0.0;
        }
        100.0 * self.value() as f64 / self.bits.len() as f64
    }
}

impl fmt::Display for GeneticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
