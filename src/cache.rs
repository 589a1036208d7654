//! Shared cache of term projections.
//!
//! Projection is a pure function of `(term, config)`, so a cache bound to
//! one validated configuration returns exactly what [`crate::project`]
//! would. It is safe to share across threads behind an `Arc`.

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::SimHashConfig;
use crate::error::SimHashError;
use crate::fingerprint::Fingerprint;
use crate::projection::{BipolarVector, project_validated};
use crate::synthesis::synthesize_with;
use crate::weights::{TermWeights, Weight};

/// Concurrent term -> projection cache for one configuration.
#[derive(Debug)]
pub struct ProjectionCache {
    cfg: SimHashConfig,
    entries: DashMap<String, Arc<BipolarVector>>,
    max_entries: Option<usize>,
}

impl ProjectionCache {
    /// Create an unbounded cache for `cfg`.
    pub fn new(cfg: SimHashConfig) -> Result<Self, SimHashError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            entries: DashMap::new(),
            max_entries: None,
        })
    }

    /// Stop inserting once roughly `max_entries` terms are cached.
    ///
    /// Lookups past the bound still project, they are just not stored.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn config(&self) -> &SimHashConfig {
        &self.cfg
    }

    /// Projection of `term`, computed on first use.
    pub fn project(&self, term: &str) -> Arc<BipolarVector> {
        if let Some(hit) = self.entries.get(term) {
            return Arc::clone(hit.value());
        }

        let vector = Arc::new(project_validated(term, &self.cfg));
        let has_room = self
            .max_entries
            .is_none_or(|max| self.entries.len() < max);
        if has_room {
            // Another thread may have raced us here; both values are equal.
            self.entries
                .entry(term.to_owned())
                .or_insert_with(|| Arc::clone(&vector));
        }
        vector
    }

    /// Same as [`crate::synthesize`] with this cache's configuration.
    pub fn synthesize<W: Weight>(
        &self,
        weights: &TermWeights<W>,
    ) -> Result<Fingerprint, SimHashError> {
        synthesize_with(weights, self.cfg.bits, |term| self.project(term))
    }

    /// Number of cached terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BitExtension, HashAlgorithm};
    use crate::projection::project;
    use crate::synthesis::synthesize;
    use crate::weights::aggregate;
    use std::thread;

    #[test]
    fn cache_rejects_invalid_config() {
        assert!(ProjectionCache::new(SimHashConfig::new().with_bits(0)).is_err());
    }

    #[test]
    fn cached_projection_matches_direct() {
        let cfg = SimHashConfig::new()
            .with_hash(HashAlgorithm::Sha256)
            .with_bits(300)
            .with_extension(BitExtension::Rehash);
        let cache = ProjectionCache::new(cfg.clone()).unwrap();

        for term in ["alpha", "beta", "alpha", ""] {
            assert_eq!(*cache.project(term), project(term, &cfg).unwrap());
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn cached_synthesis_matches_direct() {
        let cfg = SimHashConfig::default();
        let cache = ProjectionCache::new(cfg.clone()).unwrap();
        let weights = aggregate(["the", "quick", "brown", "fox", "the"]);

        let direct = synthesize(&weights, &cfg).unwrap();
        assert_eq!(cache.synthesize(&weights).unwrap(), direct);
        // Second pass served from the cache.
        assert_eq!(cache.synthesize(&weights).unwrap(), direct);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn bounded_cache_stops_growing() {
        let cache = ProjectionCache::new(SimHashConfig::default())
            .unwrap()
            .with_max_entries(2);
        let cfg = cache.config().clone();
        for term in ["a", "b", "c", "d"] {
            assert_eq!(*cache.project(term), project(term, &cfg).unwrap());
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_empties_cache() {
        let cache = ProjectionCache::new(SimHashConfig::default()).unwrap();
        cache.project("x");
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_lookups_agree() {
        let cache = Arc::new(ProjectionCache::new(SimHashConfig::default()).unwrap());
        let weights = Arc::new(aggregate(["shared", "terms", "across", "threads"]));
        let expected = synthesize(&weights, cache.config()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let weights = Arc::clone(&weights);
                thread::spawn(move || cache.synthesize(&weights).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert_eq!(cache.len(), 4);
    }
}
