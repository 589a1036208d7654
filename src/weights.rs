//! Term weight aggregation.
//!
//! Terms are collected into a [`TermWeights`] map keyed by the exact term
//! bytes. The map is ordered, so any traversal visits terms in the same
//! order no matter how the input sequence was arranged.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::{AddAssign, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SimHashError;

/// Scalar weight attached to a term.
///
/// Integer weights accumulate exactly in a wider signed type; real weights
/// accumulate in `f64`. Combining two weights never clamps: an integer sum
/// that overflows the weight type, or a real sum that is no longer finite,
/// is reported as [`SimHashError::InvalidWeight`].
pub trait Weight: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Signed per-position accumulator used during synthesis.
    type Accumulator: Copy
        + Default
        + PartialOrd
        + AddAssign
        + SubAssign
        + fmt::Debug
        + Send
        + Sync;

    fn zero() -> Self;

    /// Sum of two weights of the same term, `None` if it leaves the valid
    /// range.
    fn checked_combine(self, other: Self) -> Option<Self>;

    /// Total order used to sum repeated weights of one term.
    fn canonical_cmp(&self, other: &Self) -> Ordering;

    fn to_accumulator(self) -> Self::Accumulator;

    /// Finite and non-negative.
    fn is_valid(self) -> bool;

    fn as_f64(self) -> f64;
}

impl Weight for u32 {
    type Accumulator = i64;

    fn zero() -> Self {
        0
    }

    fn checked_combine(self, other: Self) -> Option<Self> {
        self.checked_add(other)
    }

    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn to_accumulator(self) -> i64 {
        i64::from(self)
    }

    fn is_valid(self) -> bool {
        true
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Weight for u64 {
    type Accumulator = i128;

    fn zero() -> Self {
        0
    }

    fn checked_combine(self, other: Self) -> Option<Self> {
        self.checked_add(other)
    }

    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn to_accumulator(self) -> i128 {
        i128::from(self)
    }

    fn is_valid(self) -> bool {
        true
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Weight for f32 {
    type Accumulator = f64;

    fn zero() -> Self {
        0.0
    }

    fn checked_combine(self, other: Self) -> Option<Self> {
        let sum = self + other;
        sum.is_finite().then_some(sum)
    }

    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn to_accumulator(self) -> f64 {
        f64::from(self)
    }

    fn is_valid(self) -> bool {
        self.is_finite() && self >= 0.0
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Weight for f64 {
    type Accumulator = f64;

    fn zero() -> Self {
        0.0
    }

    fn checked_combine(self, other: Self) -> Option<Self> {
        let sum = self + other;
        sum.is_finite().then_some(sum)
    }

    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn to_accumulator(self) -> f64 {
        self
    }

    fn is_valid(self) -> bool {
        self.is_finite() && self >= 0.0
    }

    fn as_f64(self) -> f64 {
        self
    }
}

fn check_weight<W: Weight>(term: &str, weight: W) -> Result<(), SimHashError> {
    if weight.is_valid() {
        Ok(())
    } else {
        Err(SimHashError::InvalidWeight {
            term: term.to_owned(),
            weight: weight.as_f64(),
        })
    }
}

/// Sum the weights of one term in ascending order, so the total depends only
/// on the multiset of weights.
fn canonical_total<W: Weight>(term: &str, parts: &mut [W]) -> Result<W, SimHashError> {
    parts.sort_unstable_by(W::canonical_cmp);
    let mut total = W::zero();
    for &part in parts.iter() {
        total = total
            .checked_combine(part)
            .ok_or_else(|| SimHashError::InvalidWeight {
                term: term.to_owned(),
                weight: total.as_f64() + part.as_f64(),
            })?;
    }
    Ok(total)
}

/// Mapping from distinct term to its aggregate weight.
///
/// Serializes as a plain `term -> weight` map. Deserializing validates every
/// weight.
#[derive(Debug, Clone, PartialEq)]
pub struct TermWeights<W = u64> {
    entries: BTreeMap<String, W>,
}

impl<W: Weight> TermWeights<W> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<W> {
        self.entries.get(term).copied()
    }

    /// Entries in ascending term order.
    pub fn iter(&self) -> Iter<'_, W> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

impl<W: Weight> Default for TermWeights<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Weight> TryFrom<BTreeMap<String, W>> for TermWeights<W> {
    type Error = SimHashError;

    fn try_from(entries: BTreeMap<String, W>) -> Result<Self, Self::Error> {
        for (term, weight) in &entries {
            check_weight(term, *weight)?;
        }
        Ok(Self { entries })
    }
}

impl<W: Serialize> Serialize for TermWeights<W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de, W> Deserialize<'de> for TermWeights<W>
where
    W: Weight + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, W>::deserialize(deserializer)?;
        Self::try_from(entries).map_err(serde::de::Error::custom)
    }
}

/// Iterator over `(term, weight)` in ascending term order.
pub struct Iter<'a, W> {
    inner: btree_map::Iter<'a, String, W>,
}

impl<'a, W: Copy> Iterator for Iter<'a, W> {
    type Item = (&'a str, W);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(term, weight)| (term.as_str(), *weight))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, W: Weight> IntoIterator for &'a TermWeights<W> {
    type Item = (&'a str, W);
    type IntoIter = Iter<'a, W>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Count plain term occurrences: each occurrence adds 1.
pub fn aggregate<I, S>(terms: I) -> TermWeights<u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries: BTreeMap<String, u64> = BTreeMap::new();
    for term in terms {
        let term = term.as_ref();
        match entries.get_mut(term) {
            Some(count) => *count += 1,
            None => {
                entries.insert(term.to_owned(), 1);
            }
        }
    }
    TermWeights { entries }
}

/// Sum externally supplied weights per term.
///
/// Fails with [`SimHashError::InvalidWeight`] on the first negative or
/// non-finite weight, and when a term's total overflows. Zero weights are
/// kept. Repeated weights of one term are summed in ascending order, so the
/// result is the same for every arrangement of `pairs`.
pub fn aggregate_weighted<I, S, W>(pairs: I) -> Result<TermWeights<W>, SimHashError>
where
    I: IntoIterator<Item = (S, W)>,
    S: AsRef<str>,
    W: Weight,
{
    let mut grouped: BTreeMap<String, Vec<W>> = BTreeMap::new();
    for (term, weight) in pairs {
        let term = term.as_ref();
        check_weight(term, weight)?;
        match grouped.get_mut(term) {
            Some(parts) => parts.push(weight),
            None => {
                grouped.insert(term.to_owned(), vec![weight]);
            }
        }
    }

    let mut entries = BTreeMap::new();
    for (term, mut parts) in grouped {
        let total = canonical_total(&term, &mut parts)?;
        entries.insert(term, total);
    }
    Ok(TermWeights { entries })
}
