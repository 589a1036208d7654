//! Hamming-distance similarity between fingerprints.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::SimHashError;
use crate::fingerprint::Fingerprint;

/// Count of positions where `a` and `b` differ.
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<usize, SimHashError> {
    if a.len() != b.len() {
        return Err(SimHashError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.words()
        .iter()
        .zip(b.words())
        .map(|(x, y)| (x ^ y).count_ones() as usize)
        .sum())
}

/// Similarity `1 - d / L` in `[0, 1]`; `1.0` for identical fingerprints.
pub fn similarity(a: &Fingerprint, b: &Fingerprint) -> Result<f64, SimHashError> {
    let distance = hamming_distance(a, b)?;
    Ok(1.0 - distance as f64 / a.len() as f64)
}

/// Score `probe` against every candidate, in candidate order.
///
/// Uses the rayon pool when `parallel` is set and the `parallel` feature is
/// enabled. Any length mismatch fails the whole call.
pub fn similarity_many(
    probe: &Fingerprint,
    candidates: &[Fingerprint],
    parallel: bool,
) -> Result<Vec<f64>, SimHashError> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return candidates
                .par_iter()
                .map(|candidate| similarity(probe, candidate))
                .collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    candidates
        .iter()
        .map(|candidate| similarity(probe, candidate))
        .collect()
}
