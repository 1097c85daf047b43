//! Grouped summaries: per-entity aggregates, per-cluster feature means, and
//! the per-cluster weekly score series.
//!
//! Group keys are always derived from records actually present in the input,
//! so no aggregated group is ever empty; that precondition is relied upon
//! rather than re-checked at every mean.

use crate::analysis::error::AggregateError;
use crate::store::types::Record;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One row per entity: feature means across the entity's periods, plus the
/// entity-level labels (unanimous across periods by invariant) and the
/// first-seen record as the carrier for fields that do not vary by period.
#[derive(Debug, Clone)]
pub struct EntityAggregate {
    pub entity: String,
    pub cluster: Option<i64>,
    pub insider: Option<i64>,
    pub first_seen: Record,
    /// Aligned to the requested columns; `None` where the entity has no
    /// numeric occurrence of that column.
    pub means: Vec<Option<f64>>,
}

/// Per-cluster mean of each requested feature, over records (an entity with
/// several periods counts once per period).
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterMeans {
    pub cluster: i64,
    /// Aligned to the requested features; `None` where no record in the
    /// cluster carries a numeric value.
    pub means: Vec<Option<f64>>,
}

/// Weekly mean anomaly score of one cluster, for the temporal line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSeries {
    pub cluster: i64,
    pub points: Vec<WeekPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekPoint {
    pub week: i64,
    pub mean_score: f64,
}

/// Running mean over the numeric occurrences of one column.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Groups `records` by entity identifier (first-seen order, so downstream
/// sampling is deterministic) and averages each requested column.
///
/// Cluster and insider labels are entity-level invariants; a group whose
/// records disagree is a data-integrity violation and aborts the aggregation
/// with [`AggregateError::LabelConflict`].
pub fn entity_aggregates(
    records: &[Record],
    columns: &[String],
) -> Result<Vec<EntityAggregate>, AggregateError> {
    struct Group {
        aggregate: EntityAggregate,
        accs: Vec<MeanAcc>,
    }

    let mut order: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut anonymous = 0usize;

    for record in records {
        let Some(entity) = record.entity_id() else {
            anonymous += 1;
            continue;
        };
        let slot = match index.get(entity) {
            Some(&i) => i,
            None => {
                index.insert(entity.to_string(), order.len());
                order.push(Group {
                    aggregate: EntityAggregate {
                        entity: entity.to_string(),
                        cluster: record.cluster(),
                        insider: record.insider(),
                        first_seen: record.clone(),
                        means: Vec::new(),
                    },
                    accs: vec![MeanAcc::default(); columns.len()],
                });
                order.len() - 1
            }
        };

        let group = &mut order[slot];
        if group.aggregate.cluster != record.cluster() {
            return Err(AggregateError::LabelConflict {
                entity: entity.to_string(),
                column: "cluster",
            });
        }
        if group.aggregate.insider != record.insider() {
            return Err(AggregateError::LabelConflict {
                entity: entity.to_string(),
                column: "insider",
            });
        }
        for (acc, column) in group.accs.iter_mut().zip(columns) {
            if let Some(v) = record.numeric(column) {
                acc.push(v);
            }
        }
    }

    if anonymous > 0 {
        log::debug!("{} record(s) without an entity id skipped", anonymous);
    }

    Ok(order
        .into_iter()
        .map(|mut g| {
            g.aggregate.means = g.accs.iter().map(MeanAcc::mean).collect();
            g.aggregate
        })
        .collect())
}

/// Mean of each requested feature per cluster label present in `records`.
/// A cluster filtered out of the input is absent from the output, never
/// present with a zero or null mean.
pub fn cluster_means(records: &[Record], features: &[String]) -> Vec<ClusterMeans> {
    let mut groups: BTreeMap<i64, Vec<MeanAcc>> = BTreeMap::new();
    let mut unlabeled = 0usize;

    for record in records {
        let Some(cluster) = record.cluster() else {
            unlabeled += 1;
            continue;
        };
        let accs = groups
            .entry(cluster)
            .or_insert_with(|| vec![MeanAcc::default(); features.len()]);
        for (acc, feature) in accs.iter_mut().zip(features) {
            if let Some(v) = record.numeric(feature) {
                acc.push(v);
            }
        }
    }
    if unlabeled > 0 {
        log::debug!("{} record(s) without a cluster label skipped", unlabeled);
    }

    groups
        .into_iter()
        .map(|(cluster, accs)| ClusterMeans {
            cluster,
            means: accs.iter().map(MeanAcc::mean).collect(),
        })
        .collect()
}

/// Mean anomaly score per (cluster, week), ordered by cluster then week.
/// Weeks where a cluster has no numeric score contribute no point.
pub fn cluster_week_series(records: &[Record]) -> Vec<ClusterSeries> {
    let mut cells: BTreeMap<(i64, i64), MeanAcc> = BTreeMap::new();
    for record in records {
        let (Some(cluster), Some(week), Some(score)) =
            (record.cluster(), record.week(), record.anomaly_score())
        else {
            continue;
        };
        cells.entry((cluster, week)).or_default().push(score);
    }

    let mut series: Vec<ClusterSeries> = Vec::new();
    for ((cluster, week), acc) in cells {
        let mean_score = acc.mean().unwrap_or_default();
        match series.last_mut() {
            Some(s) if s.cluster == cluster => s.points.push(WeekPoint { week, mean_score }),
            _ => series.push(ClusterSeries {
                cluster,
                points: vec![WeekPoint { week, mean_score }],
            }),
        }
    }
    series
}

/// Deterministic sampling cap for dense views: the first `cap` aggregates in
/// first-seen order, so repeated renders of the same subset are identical.
pub fn sample_entities(aggregates: &[EntityAggregate], cap: usize) -> &[EntityAggregate] {
    &aggregates[..cap.min(aggregates.len())]
}
