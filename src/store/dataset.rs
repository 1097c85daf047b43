//! The per-session dataset store: one immutable dataset, one filtered view.

use crate::analysis::filter::{self, FilterSpec};
use crate::ingest::RawTable;
use crate::schema::policy::{self, classify, ColumnClass};
use crate::schema::typing::type_row;
use crate::store::error::StoreError;
use crate::store::types::{Header, Record, SubsetStats};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Owns the session's data. Lifecycle: uninitialized -> loaded ->
/// (repeatedly) refiltered. The dataset itself is never mutated after load;
/// the filtered subset is fully replaced on every refilter.
///
/// One dashboard session owns exactly one store; it is constructed by the
/// caller and passed by reference, not reached through a global.
#[derive(Debug, Default)]
pub struct DashboardStore {
    data: Option<Loaded>,
}

#[derive(Debug)]
struct Loaded {
    header: Arc<Header>,
    records: Vec<Record>,
    filtered: Vec<Record>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Types every row of `table` and replaces the session's dataset. The
    /// filtered subset starts as a full copy of the dataset, so downstream
    /// code never special-cases an "unfiltered" state.
    ///
    /// Returns the number of records loaded. Typing fallbacks are reported to
    /// the observability channel, never raised.
    pub fn load(&mut self, table: RawTable) -> usize {
        let header = Arc::new(Header::from_names(table.header));
        if header.index_of(policy::ENTITY_COLUMN).is_none() {
            log::warn!(
                "dataset has no '{}' column; entity views will be empty",
                policy::ENTITY_COLUMN
            );
        }

        let mut records = Vec::with_capacity(table.rows.len());
        let mut fallback_fields = 0usize;
        let mut fallback_rows = 0usize;
        for row in &table.rows {
            let (record, outcome) = type_row(&header, row);
            if !outcome.is_clean() {
                fallback_fields += outcome.fallback_count();
                fallback_rows += 1;
            }
            records.push(record);
        }
        if fallback_rows > 0 {
            log::warn!(
                "typing fell back to text for {} field(s) across {} row(s)",
                fallback_fields,
                fallback_rows
            );
        }

        let count = records.len();
        log::info!(
            "loaded {} records, {} distinct entities",
            count,
            distinct_entities(&records)
        );
        self.data = Some(Loaded {
            header,
            filtered: records.clone(),
            records,
        });
        count
    }

    /// The immutable full dataset.
    pub fn dataset(&self) -> Result<&[Record], StoreError> {
        self.loaded().map(|d| d.records.as_slice())
    }

    /// The current filtered subset.
    pub fn filtered(&self) -> Result<&[Record], StoreError> {
        self.loaded().map(|d| d.filtered.as_slice())
    }

    pub fn header(&self) -> Result<&Arc<Header>, StoreError> {
        self.loaded().map(|d| &d.header)
    }

    /// Recomputes the filtered subset from the full dataset and `spec`,
    /// fully replacing the previous subset. Returns the surviving count.
    pub fn filter_data(&mut self, spec: &FilterSpec) -> Result<usize, StoreError> {
        let data = self.data.as_mut().ok_or(StoreError::NotLoaded)?;
        data.filtered = filter::apply(&data.records, spec);
        log::debug!(
            "filter kept {} of {} records",
            data.filtered.len(),
            data.records.len()
        );
        Ok(data.filtered.len())
    }

    /// Summary statistics over the filtered subset. An empty subset yields
    /// zero counts and the `None` sentinel for mean/max, never a panic.
    pub fn statistics(&self) -> Result<SubsetStats, StoreError> {
        let filtered = self.filtered()?;
        let insider_rows = filtered
            .iter()
            .filter(|r| r.insider() == Some(1))
            .count();

        let mut sum = 0.0;
        let mut scored = 0usize;
        let mut max: Option<f64> = None;
        for score in filtered.iter().filter_map(Record::anomaly_score) {
            sum += score;
            scored += 1;
            max = Some(max.map_or(score, |m: f64| m.max(score)));
        }

        Ok(SubsetStats {
            rows: filtered.len(),
            distinct_entities: distinct_entities(filtered),
            insider_rows,
            mean_score: (scored > 0).then(|| sum / scored as f64),
            max_score: max,
        })
    }

    /// Sorted distinct cluster labels over the FULL dataset. Filter options
    /// are populated from here so they never shrink with the current filter.
    pub fn unique_clusters(&self) -> Result<Vec<i64>, StoreError> {
        self.distinct_labels(Record::cluster, "cluster")
    }

    /// Sorted distinct week numbers over the full dataset.
    pub fn unique_weeks(&self) -> Result<Vec<i64>, StoreError> {
        self.distinct_labels(Record::week, "week")
    }

    /// Columns the per-column policy types as numeric features, in header
    /// order. This is the feature domain for entity aggregation.
    pub fn numeric_columns(&self) -> Result<Vec<String>, StoreError> {
        let header = self.header()?;
        Ok(header
            .names()
            .iter()
            .filter(|n| classify(n) == ColumnClass::Numeric)
            .cloned()
            .collect())
    }

    fn loaded(&self) -> Result<&Loaded, StoreError> {
        self.data.as_ref().ok_or(StoreError::NotLoaded)
    }

    fn distinct_labels(
        &self,
        label: fn(&Record) -> Option<i64>,
        what: &str,
    ) -> Result<Vec<i64>, StoreError> {
        let records = self.dataset()?;
        let mut labels = BTreeSet::new();
        let mut unlabeled = 0usize;
        for r in records {
            match label(r) {
                Some(v) => {
                    labels.insert(v);
                }
                None => unlabeled += 1,
            }
        }
        if unlabeled > 0 {
            log::debug!("{} record(s) carry no numeric {} label", unlabeled, what);
        }
        Ok(labels.into_iter().collect())
    }
}

fn distinct_entities(records: &[Record]) -> usize {
    records
        .iter()
        .filter_map(Record::entity_id)
        .collect::<HashSet<_>>()
        .len()
}
