//! # SimHash fingerprinting
//!
//! This crate computes fixed-length SimHash fingerprints for weighted term
//! multisets and scores near-duplicate similarity between fingerprints by
//! normalized Hamming distance.
//!
//! ## Contract
//!
//! - Input is an already tokenized term sequence, optionally weighted. The
//!   crate never tokenizes, normalizes or reads documents.
//! - Every operation is a pure function of its inputs and a
//!   [`SimHashConfig`]: no I/O, no clocks in the output, no global state.
//!
//! Invariant: for the same term multiset and the same [`SimHashConfig`],
//! the fingerprint is bit identical regardless of term order, thread or
//! process.
//!
//! ## Core Pipeline
//!
//! 1.  **Projection**: each distinct term is hashed and the leading `L`
//!     digest bits become a bipolar vector (`0 -> -1`, `1 -> +1`).
//! 2.  **Aggregation**: repeated terms sum their weights (1 per plain
//!     occurrence).
//! 3.  **Synthesis**: weighted vectors are summed per position and the sign
//!     of each sum gives one fingerprint bit; a zero sum gives `0`.
//! 4.  **Scoring**: `1 - hamming / L` between two fingerprints of equal
//!     length.
//!
//! ## Example Usage
//!
//! ```
//! use simhash::{SimHashConfig, similarity, simhash_terms};
//!
//! let cfg = SimHashConfig::default();
//! let a = simhash_terms(["the", "quick", "brown", "fox"], &cfg).unwrap();
//! let b = simhash_terms(["the", "quick", "brown", "dog"], &cfg).unwrap();
//!
//! assert_eq!(a.fingerprint.len(), 128);
//! let score = similarity(&a.fingerprint, &b.fingerprint).unwrap();
//! assert!((0.0..=1.0).contains(&score));
//! ```
//!
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{Level, debug, warn};

pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod projection;
pub mod similarity;
pub mod synthesis;
pub mod weights;

pub use crate::cache::ProjectionCache;
pub use crate::config::{
    BitExtension, ConfigLoadError, HashAlgorithm, MAX_FINGERPRINT_BITS, SimHashConfig,
};
pub use crate::error::SimHashError;
pub use crate::fingerprint::{Fingerprint, SimHashFingerprint, SimHashMeta};
pub use crate::projection::{BipolarVector, project};
pub use crate::similarity::{hamming_distance, similarity, similarity_many};
pub use crate::synthesis::{synthesize, synthesize_with};
pub use crate::weights::{TermWeights, Weight, aggregate, aggregate_weighted};

/// Current SimHash algorithm version for this crate.
pub const SIMHASH_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const SIMHASH_ALGORITHM: &str = "weighted_bipolar_simhash_v1";

/// Fingerprint a plain term sequence; each occurrence weighs 1.
pub fn simhash_terms<I, S>(terms: I, cfg: &SimHashConfig) -> Result<SimHashFingerprint, SimHashError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    traced(cfg, || Ok(aggregate(terms)))
}

/// Fingerprint a sequence of `(term, weight)` pairs.
pub fn simhash_weighted<I, S, W>(
    pairs: I,
    cfg: &SimHashConfig,
) -> Result<SimHashFingerprint, SimHashError>
where
    I: IntoIterator<Item = (S, W)>,
    S: AsRef<str>,
    W: Weight,
{
    traced(cfg, || aggregate_weighted(pairs))
}

/// Fingerprint each document independently, preserving input order.
///
/// Runs on the rayon pool when `cfg.use_parallel` is set; the output is the
/// same either way.
pub fn simhash_batch<D, S>(
    documents: &[D],
    cfg: &SimHashConfig,
) -> Result<Vec<SimHashFingerprint>, SimHashError>
where
    D: AsRef<[S]> + Sync,
    S: AsRef<str> + Sync,
{
    cfg.validate()?;

    #[cfg(feature = "parallel")]
    {
        if cfg.use_parallel {
            return documents
                .par_iter()
                .map(|doc| simhash_terms(doc.as_ref(), cfg))
                .collect();
        }
    }

    documents
        .iter()
        .map(|doc| simhash_terms(doc.as_ref(), cfg))
        .collect()
}

/// Aggregate, synthesize and attach metadata inside a tracing span.
fn traced<W, F>(cfg: &SimHashConfig, collect_weights: F) -> Result<SimHashFingerprint, SimHashError>
where
    W: Weight,
    F: FnOnce() -> Result<TermWeights<W>, SimHashError>,
{
    let start = Instant::now();
    let span = tracing::span!(
        Level::DEBUG,
        "simhash.fingerprint",
        bits = cfg.bits,
        hash = cfg.hash.name()
    );
    let _guard = span.enter();

    let result = collect_weights().and_then(|weights| {
        let fingerprint = synthesize(&weights, cfg)?;
        Ok(SimHashFingerprint {
            fingerprint,
            meta: SimHashMeta {
                simhash_version: SIMHASH_VERSION,
                algorithm_name: SIMHASH_ALGORITHM.to_string(),
                hash: cfg.hash,
                bits: cfg.bits,
                extension: cfg.extension,
                term_count: weights.len(),
                config_version: cfg.version,
            },
        })
    });

    let elapsed_micros = start.elapsed().as_micros();
    match &result {
        Ok(fp) => debug!(
            terms = fp.meta.term_count,
            ones = fp.fingerprint.count_ones(),
            elapsed_micros,
            "simhash_success"
        ),
        Err(err) => warn!(error = %err, elapsed_micros, "simhash_failure"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simhash_terms_fills_meta() {
        let cfg = SimHashConfig::default();
        let fp = simhash_terms(["a", "b", "a"], &cfg).unwrap();
        assert_eq!(fp.fingerprint.len(), 128);
        assert_eq!(fp.meta.simhash_version, SIMHASH_VERSION);
        assert_eq!(fp.meta.algorithm_name, SIMHASH_ALGORITHM);
        assert_eq!(fp.meta.hash, HashAlgorithm::Md5);
        assert_eq!(fp.meta.bits, 128);
        assert_eq!(fp.meta.term_count, 2);
        assert_eq!(fp.meta.config_version, 1);
    }

    #[test]
    fn simhash_terms_matches_manual_pipeline() {
        let cfg = SimHashConfig::new().with_bits(64);
        let terms = ["one", "two", "two", "three"];
        let fp = simhash_terms(terms, &cfg).unwrap();
        let manual = synthesize(&aggregate(terms), &cfg).unwrap();
        assert_eq!(fp.fingerprint, manual);
    }

    #[test]
    fn plain_and_unit_weighted_agree() {
        let cfg = SimHashConfig::default();
        let plain = simhash_terms(["x", "y", "x"], &cfg).unwrap();
        let weighted = simhash_weighted([("x", 1u64), ("y", 1), ("x", 1)], &cfg).unwrap();
        assert_eq!(plain, weighted);
    }

    #[test]
    fn simhash_weighted_propagates_invalid_weight() {
        let cfg = SimHashConfig::default();
        let err = simhash_weighted([("x", -2.0f64)], &cfg).unwrap_err();
        assert!(matches!(err, SimHashError::InvalidWeight { .. }));
    }

    #[test]
    fn empty_document_is_all_zero() {
        let fp = simhash_terms(Vec::<String>::new(), &SimHashConfig::default()).unwrap();
        assert_eq!(fp.fingerprint.count_ones(), 0);
        assert_eq!(fp.meta.term_count, 0);
    }

    #[test]
    fn batch_matches_individual_calls() {
        let docs = vec![
            vec!["red", "green", "blue"],
            vec![],
            vec!["red", "red", "amber"],
        ];
        for parallel in [false, true] {
            let cfg = SimHashConfig::default().with_parallel(parallel);
            let batch = simhash_batch(&docs, &cfg).unwrap();
            assert_eq!(batch.len(), docs.len());
            for (doc, fp) in docs.iter().zip(&batch) {
                assert_eq!(*fp, simhash_terms(doc, &cfg).unwrap());
            }
        }
    }

    #[test]
    fn batch_rejects_invalid_config() {
        let docs: Vec<Vec<&str>> = vec![vec!["a"]];
        let cfg = SimHashConfig::new().with_bits(0);
        assert!(simhash_batch(&docs, &cfg).is_err());
    }
}
