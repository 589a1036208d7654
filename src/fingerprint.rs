//! Fingerprint and metadata types.
//!
//! The fingerprint schema is part of the public contract: any change that
//! alters produced bits must bump [`crate::SIMHASH_VERSION`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{BitExtension, HashAlgorithm};
use crate::error::SimHashError;

/// Fixed-length bit fingerprint.
///
/// Position `i` is bit `i % 64` of word `i / 64`; bits past `len` in the
/// last word are always zero. Serialized as its `'0'`/`'1'` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint {
    len: usize,
    words: Vec<u64>,
}

impl Fingerprint {
    /// Build a fingerprint from bits in position order.
    pub fn from_bits<I>(bits: I) -> Result<Self, SimHashError>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut words = Vec::new();
        let mut len = 0;
        for bit in bits {
            if len % 64 == 0 {
                words.push(0);
            }
            if bit {
                words[len / 64] |= 1u64 << (len % 64);
            }
            len += 1;
        }
        if len == 0 {
            return Err(SimHashError::InvalidConfiguration(
                "fingerprint must have at least one bit".into(),
            ));
        }
        Ok(Self { len, words })
    }

    /// Number of bits `L`.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bit(&self, i: usize) -> Option<bool> {
        (i < self.len).then(|| (self.words[i / 64] >> (i % 64)) & 1 == 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| (self.words[i / 64] >> (i % 64)) & 1 == 1)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Packed words, position `i` at bit `i % 64` of word `i / 64`.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Bitwise complement with the same length.
    pub fn complement(&self) -> Self {
        let mut words: Vec<u64> = self.words.iter().map(|w| !w).collect();
        let tail = self.len % 64;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
        Self {
            len: self.len,
            words,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Fingerprint {
    type Err = SimHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = Vec::with_capacity(s.len());
        for (position, found) in s.chars().enumerate() {
            match found {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return Err(SimHashError::InvalidBitString { position, found }),
            }
        }
        Self::from_bits(bits)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_string()
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = SimHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Fingerprint of one document together with how it was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimHashFingerprint {
    pub fingerprint: Fingerprint,
    pub meta: SimHashMeta,
}

/// Metadata for traceability and determinism.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimHashMeta {
    /// Algorithm version owned by this crate.
    pub simhash_version: u16,
    /// Human-readable algorithm identifier.
    pub algorithm_name: String,
    pub hash: HashAlgorithm,
    /// Fingerprint length `L`.
    pub bits: usize,
    pub extension: BitExtension,
    /// Distinct terms that contributed.
    pub term_count: usize,
    /// Configuration schema version supplied by the caller.
    pub config_version: u32,
}
