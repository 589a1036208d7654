//! Term projection: term -> `L` hash bits -> bipolar vector.
//!
//! A term's digest is read most significant bit first, so bit `0` of the
//! projection is the top bit of the first digest byte. For MD5 this is the
//! same bit string as the zero-filled binary rendering of the digest as a
//! 128-bit integer, which keeps fingerprints comparable with existing
//! reference data.

use md5::Md5;
use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::Xxh3;

use crate::config::{BitExtension, HashAlgorithm, SimHashConfig};
use crate::error::SimHashError;

/// Fixed-length vector over {-1, +1} derived from a term's hash bits.
///
/// Stored packed: position `i` is bit `i % 64` of word `i / 64`, a set bit
/// meaning `+1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BipolarVector {
    len: usize,
    words: Vec<u64>,
}

impl BipolarVector {
    /// Build a vector from bits in position order (`true` -> `+1`).
    pub fn from_bits<I>(bits: I) -> Self
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
        Self { len, words }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value at position `i`, `None` when out of range.
    pub fn get(&self, i: usize) -> Option<i8> {
        (i < self.len).then(|| {
            if self.bit(i) { 1 } else { -1 }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = i8> + '_ {
        (0..self.len).map(|i| if self.bit(i) { 1 } else { -1 })
    }

    pub fn to_vec(&self) -> Vec<i8> {
        self.iter().collect()
    }

    #[inline]
    pub(crate) fn bit(&self, i: usize) -> bool {
        (self.words[i / 64] >> (i % 64)) & 1 == 1
    }
}

/// Project `term` into a bipolar vector of `cfg.bits` positions.
///
/// Deterministic across runs and processes. Any string is accepted,
/// including the empty one; only an invalid configuration fails.
pub fn project(term: &str, cfg: &SimHashConfig) -> Result<BipolarVector, SimHashError> {
    cfg.validate()?;
    Ok(project_validated(term, cfg))
}

/// Projection for a configuration that already passed `validate()`.
pub(crate) fn project_validated(term: &str, cfg: &SimHashConfig) -> BipolarVector {
    let len = cfg.bits;
    let width = cfg.hash_width_bits();
    let term = term.as_bytes();

    let words = match cfg.extension {
        BitExtension::ZeroPad if len > width => {
            pack_msb_first(len, len - width, digest(cfg.hash, &[term]))
        }
        BitExtension::Rehash if len > width => {
            // Block 0 is the plain digest, so the first `width` bits match
            // the unextended projection.
            let blocks = (0u32..).flat_map(|counter| {
                if counter == 0 {
                    digest(cfg.hash, &[term])
                } else {
                    digest(cfg.hash, &[&counter.to_be_bytes()[..], term])
                }
            });
            pack_msb_first(len, 0, blocks)
        }
        _ => pack_msb_first(len, 0, digest(cfg.hash, &[term])),
    };

    BipolarVector { len, words }
}

/// Digest of the concatenated `parts` under `hash`, big-endian bytes.
pub(crate) fn digest(hash: HashAlgorithm, parts: &[&[u8]]) -> Vec<u8> {
    match hash {
        HashAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.finalize().to_vec()
        }
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.finalize().to_vec()
        }
        HashAlgorithm::Xxh3_128 => {
            let mut hasher = Xxh3::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.digest128().to_be_bytes().to_vec()
        }
    }
}

/// Pack bytes MSB first into `len` positions, starting after `skip` zero bits.
/// Input beyond `len` positions is ignored.
fn pack_msb_first<I>(len: usize, skip: usize, bytes: I) -> Vec<u64>
where
    I: IntoIterator<Item = u8>,
{
    let mut words = vec![0u64; len.div_ceil(64)];
    let mut pos = skip;
    'bytes: for byte in bytes {
        for shift in (0..8).rev() {
            if pos >= len {
                break 'bytes;
            }
            if (byte >> shift) & 1 == 1 {
                words[pos / 64] |= 1u64 << (pos % 64);
            }
            pos += 1;
        }
    }
    words
}
