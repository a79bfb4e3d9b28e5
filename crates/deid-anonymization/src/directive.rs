use crate::error::AnonymizationError;
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    num::{NonZeroU64, NonZeroUsize},
};

/// A validated, strictly positive bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalSize(NonZeroU64);

impl IntervalSize {
    /// `None` for zero and negative sizes.
    pub fn new(size: i64) -> Option<Self> {
        u64::try_from(size).ok().and_then(NonZeroU64::new).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    pub fn as_f64(self) -> f64 {
        self.0.get() as f64
    }
}

/// Columns the caller opted into, with the interval size chosen for each.
///
/// Sizes are kept as given and only checked by [`ColumnDirectives::validate`],
/// so an invalid size is reported with the column it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDirectives {
    intervals: BTreeMap<String, i64>,
}

impl ColumnDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, interval: i64) {
        self.intervals.insert(column.into(), interval);
    }

    pub fn with(mut self, column: impl Into<String>, interval: i64) -> Self {
        self.insert(column, interval);
        self
    }

    pub fn get(&self, column: &str) -> Option<i64> {
        self.intervals.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.intervals
            .iter()
            .map(|(column, interval)| (column.as_str(), *interval))
    }

    /// Fails on the first (by column name) non-positive interval.
    pub fn validate(&self) -> Result<HashMap<&str, IntervalSize>, AnonymizationError> {
        self.iter()
            .map(|(column, interval)| match IntervalSize::new(interval) {
                Some(size) => Ok((column, size)),
                None => Err(AnonymizationError::InvalidInterval {
                    column: column.to_string(),
                    interval,
                }),
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for ColumnDirectives {
    fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
        Self {
            intervals: iter
                .into_iter()
                .map(|(column, interval)| (column.into(), interval))
                .collect(),
        }
    }
}

/// What happens to text columns that have no directive.
///
/// `Passthrough` leaves them untouched, so only the columns named in the
/// directives are rewritten, as in a classic k-anonymize pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlistedTextPolicy {
    Hash,
    Passthrough,
}

impl Default for UnlistedTextPolicy {
    fn default() -> Self {
        UnlistedTextPolicy::Hash
    }
}

/// Everything a single anonymization run needs.
///
/// `k` is recorded and reported alongside the result. Nothing checks that the
/// output actually contains groups of at least `k` indistinguishable rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymizationRequest {
    pub directives: ColumnDirectives,
    pub k: NonZeroUsize,
    pub unlisted_text: UnlistedTextPolicy,
}

impl AnonymizationRequest {
    pub fn new(directives: ColumnDirectives, k: NonZeroUsize) -> Self {
        Self {
            directives,
            k,
            unlisted_text: UnlistedTextPolicy::default(),
        }
    }

    pub fn with_unlisted_text(mut self, policy: UnlistedTextPolicy) -> Self {
        self.unlisted_text = policy;
        self
    }
}
