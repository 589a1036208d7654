use thiserror::Error;

/// Errors returned by SimHash projection, synthesis and scoring.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimHashError {
    #[error("fingerprint length mismatch: {left} bits vs {right} bits")]
    LengthMismatch { left: usize, right: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid weight {weight} for term {term:?}; weights and per-term totals must be finite and >= 0")]
    InvalidWeight { term: String, weight: f64 },

    #[error("invalid fingerprint bit string: unexpected {found:?} at position {position}")]
    InvalidBitString { position: usize, found: char },
}
