//! The filter engine: a pure, single-pass predicate over the dataset.

use crate::store::types::Record;
use std::collections::BTreeSet;

/// Which cluster labels pass the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterSelection {
    /// The "all" sentinel: every record passes regardless of label.
    All,
    /// Only records whose canonical integer label is in the set.
    Ids(BTreeSet<i64>),
}

impl ClusterSelection {
    pub fn ids<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        ClusterSelection::Ids(ids.into_iter().collect())
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            ClusterSelection::All => true,
            // A record without a numeric label can never match a concrete id.
            ClusterSelection::Ids(ids) => record.cluster().is_some_and(|c| ids.contains(&c)),
        }
    }
}

/// Which insider category passes the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsiderSelection {
    All,
    Only(i64),
}

impl InsiderSelection {
    fn matches(&self, record: &Record) -> bool {
        match self {
            InsiderSelection::All => true,
            InsiderSelection::Only(label) => record.insider() == Some(*label),
        }
    }
}

/// The declarative filter specification.
///
/// Invariant (caller's duty): `score_min <= score_max`. The engine applies
/// the bounds as given and does not reorder an inconsistent pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub clusters: ClusterSelection,
    pub insider: InsiderSelection,
    pub score_min: f64,
    pub score_max: f64,
}

impl FilterSpec {
    /// The spec that passes every record; the store starts a session here.
    pub fn unrestricted() -> Self {
        Self {
            clusters: ClusterSelection::All,
            insider: InsiderSelection::All,
            score_min: f64::NEG_INFINITY,
            score_max: f64::INFINITY,
        }
    }
}

/// Applies `spec` to `records`, returning the surviving records in their
/// original relative order. Pure: the input slice is untouched.
///
/// A record passes iff it passes all three tests. Records without a numeric
/// anomaly score are not excluded by the score test; the score range only
/// constrains rows that actually carry a score.
pub fn apply(records: &[Record], spec: &FilterSpec) -> Vec<Record> {
    records
        .iter()
        .filter(|r| {
            spec.clusters.matches(r)
                && spec.insider.matches(r)
                && score_in_range(r, spec.score_min, spec.score_max)
        })
        .cloned()
        .collect()
}

fn score_in_range(record: &Record, min: f64, max: f64) -> bool {
    match record.anomaly_score() {
        Some(score) => min <= score && score <= max,
        None => true,
    }
}
