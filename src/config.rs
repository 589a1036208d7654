//! Configuration for SimHash fingerprinting.
//!
//! The configuration is a plain value: fingerprinting is a pure function of
//! `(terms, config)`. It can be built in code through the `with_*` builders
//! or loaded from YAML:
//!
//! ```yaml
//! version: 1
//! bits: 128
//! hash: md5
//! extension: reject
//! use_parallel: false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SimHashError;

/// Upper bound on the fingerprint length `L`.
pub const MAX_FINGERPRINT_BITS: usize = 65_536;

/// Hash function used to project a term onto bits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// MD5 digest read as a big-endian 128-bit integer.
    #[default]
    Md5,
    /// XXH3 128-bit, big-endian.
    #[serde(rename = "xxh3_128")]
    Xxh3_128,
    /// SHA-256 digest.
    Sha256,
}

impl HashAlgorithm {
    /// Number of bits one digest of this algorithm yields.
    pub const fn width_bits(self) -> usize {
        match self {
            HashAlgorithm::Md5 | HashAlgorithm::Xxh3_128 => 128,
            HashAlgorithm::Sha256 => 256,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Xxh3_128 => "xxh3_128",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

/// How to obtain `L` bits when `L` exceeds the digest width.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BitExtension {
    /// Refuse configurations wider than the digest.
    #[default]
    Reject,
    /// Left-pad the digest with zero bits.
    ZeroPad,
    /// Append digests of `counter || term` until enough bits exist.
    Rehash,
}

/// Configuration for SimHash fingerprinting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SimHashConfig {
    /// Configuration schema version.
    ///
    /// Any change that can alter fingerprints must bump this version.
    pub version: u32,
    /// Fingerprint length `L` in bits.
    pub bits: usize,
    /// Term hash function.
    pub hash: HashAlgorithm,
    /// Policy when `bits` exceeds the digest width.
    pub extension: BitExtension,
    /// Fingerprint batches and score probe sets on the rayon pool.
    pub use_parallel: bool,
}

impl SimHashConfig {
    /// Create a new configuration with defaults (128-bit MD5).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fingerprint length `L`.
    pub fn with_bits(mut self, bits: usize) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_extension(mut self, extension: BitExtension) -> Self {
        self.extension = extension;
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Digest width of the configured hash.
    pub fn hash_width_bits(&self) -> usize {
        self.hash.width_bits()
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), SimHashError> {
        if self.version < 1 {
            return Err(SimHashError::InvalidConfiguration(format!(
                "version must be >= 1 (got {})",
                self.version
            )));
        }
        if self.bits < 1 {
            return Err(SimHashError::InvalidConfiguration(
                "bits must be >= 1 (got 0)".into(),
            ));
        }
        if self.bits > MAX_FINGERPRINT_BITS {
            return Err(SimHashError::InvalidConfiguration(format!(
                "bits must be <= {MAX_FINGERPRINT_BITS} (got {})",
                self.bits
            )));
        }
        let width = self.hash_width_bits();
        if self.bits > width && self.extension == BitExtension::Reject {
            return Err(SimHashError::InvalidConfiguration(format!(
                "{} yields {width} bits but {} were requested; choose a bit extension",
                self.hash.name(),
                self.bits
            )));
        }
        Ok(())
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SimHashConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

impl Default for SimHashConfig {
    fn default() -> Self {
        Self {
            version: 1,
            bits: 128,
            hash: HashAlgorithm::Md5,
            extension: BitExtension::Reject,
            use_parallel: false,
        }
    }
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Invalid(#[from] SimHashError),
}
