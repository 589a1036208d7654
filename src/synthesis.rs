//! Fingerprint synthesis: weighted sum of bipolar vectors, then a sign
//! threshold per position.
//!
//! A position whose accumulator is exactly zero becomes `0`. Changing that
//! convention would change every fingerprint that can hit a zero sum, so it
//! is fixed.

use std::borrow::Borrow;

use crate::config::SimHashConfig;
use crate::error::SimHashError;
use crate::fingerprint::Fingerprint;
use crate::projection::{BipolarVector, project_validated};
use crate::weights::{TermWeights, Weight};

/// Synthesize the fingerprint of a term-weight mapping.
///
/// An empty mapping yields the all-zero fingerprint of `cfg.bits` bits.
pub fn synthesize<W: Weight>(
    weights: &TermWeights<W>,
    cfg: &SimHashConfig,
) -> Result<Fingerprint, SimHashError> {
    cfg.validate()?;
    synthesize_with(weights, cfg.bits, |term| project_validated(term, cfg))
}

/// Synthesize with a caller-supplied projection.
///
/// `project` must return vectors of exactly `bits` positions; a vector of
/// any other length fails with [`SimHashError::LengthMismatch`]. Terms of
/// zero weight are skipped without being projected.
pub fn synthesize_with<W, F, V>(
    weights: &TermWeights<W>,
    bits: usize,
    mut project: F,
) -> Result<Fingerprint, SimHashError>
where
    W: Weight,
    F: FnMut(&str) -> V,
    V: Borrow<BipolarVector>,
{
    let mut acc = vec![W::Accumulator::default(); bits];

    for (term, weight) in weights {
        if weight == W::zero() {
            continue;
        }
        let vector = project(term);
        let vector = vector.borrow();
        if vector.len() != bits {
            return Err(SimHashError::LengthMismatch {
                left: bits,
                right: vector.len(),
            });
        }

        let w = weight.to_accumulator();
        for (i, slot) in acc.iter_mut().enumerate() {
            if vector.bit(i) {
                *slot += w;
            } else {
                *slot -= w;
            }
        }
    }

    threshold(&acc)
}

/// `1` where the accumulator is strictly positive, `0` otherwise.
fn threshold<A>(acc: &[A]) -> Result<Fingerprint, SimHashError>
where
    A: Copy + Default + PartialOrd,
{
    let zero = A::default();
    Fingerprint::from_bits(acc.iter().map(|v| *v > zero))
}
