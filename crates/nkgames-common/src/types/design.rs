//! Design - a fixed-length bit string evaluated on an NK landscape
//!
//! A design has no identity beyond its bits. Engines own their designs and
//! mutate copies, never a design they were handed.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, NkError, Result};

/// Binary design of length N, stored one locus per byte (0 or 1)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Design(Vec<u8>);

impl Design {
    /// All-zero design of length `n`
    pub fn zeros(n: usize) -> Self {
        Self(vec![0; n])
    }

    /// Build from explicit bit values; every value must be 0 or 1
    pub fn from_bits(bits: Vec<u8>) -> Result<Self> {
        if let Some(bad) = bits.iter().find(|&&b| b > 1) {
            return Err(ConfigError::InvalidBitstring(format!(
                "bit value {} is not binary",
                bad
            ))
            .into());
        }
        Ok(Self(bits))
    }

    /// Parse a bit string such as `"0101"` or `"01 01"`.
    ///
    /// Characters other than `0`/`1` are ignored; the remaining length must
    /// equal `n`.
    pub fn parse(text: &str, n: usize) -> Result<Self> {
        let bits: Vec<u8> = text
            .chars()
            .filter_map(|c| match c {
                '0' => Some(0),
                '1' => Some(1),
                _ => None,
            })
            .collect();
        if bits.len() != n {
            return Err(ConfigError::InvalidBitstring(format!(
                "bit string length {} does not match expected {}",
                bits.len(),
                n
            ))
            .into());
        }
        Ok(Self(bits))
    }

    /// Design length
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the design has no loci
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bit value at `locus`
    #[inline]
    pub fn bit(&self, locus: usize) -> u8 {
        self.0[locus]
    }

    /// Set a bit (any non-zero value is stored as 1)
    #[inline]
    pub fn set(&mut self, locus: usize, value: u8) {
        self.0[locus] = u8::from(value != 0);
    }

    /// Flip one bit in place
    #[inline]
    pub fn flip(&mut self, locus: usize) {
        self.0[locus] ^= 1;
    }

    /// Copy of this design with one bit flipped
    pub fn flipped(&self, locus: usize) -> Self {
        let mut next = self.clone();
        next.flip(locus);
        next
    }

    /// Copy `loci` from `source` into this design
    pub fn copy_loci_from(&mut self, source: &Design, loci: &[usize]) -> Result<()> {
        NkError::check_len(self.len(), source.len())?;
        for &locus in loci {
            self.0[locus] = source.0[locus];
        }
        Ok(())
    }

    /// Bits as a slice
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Iterate bit values
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<Vec<u8>> for Design {
    type Error = NkError;

    fn try_from(bits: Vec<u8>) -> Result<Self> {
        Self::from_bits(bits)
    }
}

impl From<Design> for Vec<u8> {
    fn from(design: Design) -> Self {
        design.0
    }
}

impl std::fmt::Display for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in &self.0 {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}
