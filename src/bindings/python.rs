use crate::analysis::{self, ClusterSelection, FilterSpec, InsiderSelection};
use crate::display;
use crate::ingest::RawTable;
use crate::store::{DashboardStore, StoreError};
use crate::tables::profiles::PROFILE_PADDING;
use crate::tables::{ClusterLabelMap, ClusterProfiles};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use serde_json::{Map, Value};

/// One dashboard session: the store plus the two auxiliary tables, behind a
/// Python facade. Derived views leave as JSON strings that the host hands to
/// the browser unchanged.
#[pyclass(name = "_Dashboard")]
#[derive(Debug, Default)]
pub struct PyDashboard {
    store: DashboardStore,
    profiles: Option<ClusterProfiles>,
    labels: ClusterLabelMap,
}

#[pymethods]
impl PyDashboard {
    #[new]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the main dataset from CSV text. Returns the record count.
    pub fn load_csv(&mut self, text: &str) -> PyResult<usize> {
        let table = RawTable::parse(text).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(self.store.load(table))
    }

    /// Loads the main dataset from a file path. Returns the record count.
    pub fn load_csv_path(&mut self, path: &str) -> PyResult<usize> {
        let table = RawTable::read_path(path).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(self.store.load(table))
    }

    /// Loads the per-cluster feature-profile table. Returns the cluster count.
    pub fn load_cluster_profiles(&mut self, text: &str) -> PyResult<usize> {
        let table = RawTable::parse(text).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let profiles = ClusterProfiles::from_table(&table);
        let count = profiles.cluster_count();
        self.profiles = Some(profiles);
        Ok(count)
    }

    /// Loads the descriptive cluster labels. Returns the mapping size.
    pub fn load_cluster_labels(&mut self, text: &str) -> PyResult<usize> {
        let table = RawTable::parse(text).map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.labels = ClusterLabelMap::from_table(&table);
        Ok(self.labels.len())
    }

    /// Recomputes the filtered subset. `clusters=None` / `insider=None` are
    /// the "all" sentinels; omitted bounds are unbounded. Returns the
    /// surviving record count.
    #[pyo3(signature = (clusters=None, insider=None, score_min=None, score_max=None))]
    pub fn filter_data(
        &mut self,
        clusters: Option<Vec<i64>>,
        insider: Option<i64>,
        score_min: Option<f64>,
        score_max: Option<f64>,
    ) -> PyResult<usize> {
        let spec = FilterSpec {
            clusters: match clusters {
                Some(ids) => ClusterSelection::ids(ids),
                None => ClusterSelection::All,
            },
            insider: match insider {
                Some(label) => InsiderSelection::Only(label),
                None => InsiderSelection::All,
            },
            score_min: score_min.unwrap_or(f64::NEG_INFINITY),
            score_max: score_max.unwrap_or(f64::INFINITY),
        };
        self.store.filter_data(&spec).map_err(store_err)
    }

    pub fn get_unique_clusters(&self) -> PyResult<Vec<i64>> {
        self.store.unique_clusters().map_err(store_err)
    }

    pub fn get_unique_weeks(&self) -> PyResult<Vec<i64>> {
        self.store.unique_weeks().map_err(store_err)
    }

    /// Subset statistics as JSON; mean/max are null for an empty subset.
    pub fn get_stats(&self) -> PyResult<String> {
        let stats = self.store.statistics().map_err(store_err)?;
        to_json(&stats)
    }

    /// The filtered subset as a JSON array of row objects.
    pub fn get_filtered_data(&self) -> PyResult<String> {
        let filtered = self.store.filtered().map_err(store_err)?;
        to_json(&filtered)
    }

    /// Row-major correlation grid over the filtered subset as JSON.
    pub fn calculate_correlation(&self, features: Vec<String>) -> PyResult<String> {
        let filtered = self.store.filtered().map_err(store_err)?;
        to_json(&analysis::correlate(filtered, &features))
    }

    /// Per-cluster feature means over the filtered subset, one JSON object
    /// per cluster present in the subset.
    pub fn get_cluster_means(&self, features: Vec<String>) -> PyResult<String> {
        let filtered = self.store.filtered().map_err(store_err)?;
        let rows: Vec<Value> = analysis::cluster_means(filtered, &features)
            .into_iter()
            .map(|cm| {
                let mut obj = Map::new();
                obj.insert("cluster".into(), cm.cluster.into());
                for (feature, mean) in features.iter().zip(cm.means) {
                    obj.insert(feature.clone(), opt_number(mean));
                }
                Value::Object(obj)
            })
            .collect();
        to_json(&rows)
    }

    /// One JSON object per entity in the filtered subset: labels plus the
    /// mean of every numeric feature column. `limit` caps the output
    /// deterministically on first-seen order.
    #[pyo3(signature = (limit=None))]
    pub fn get_entity_aggregates(&self, limit: Option<usize>) -> PyResult<String> {
        let filtered = self.store.filtered().map_err(store_err)?;
        let columns = self.store.numeric_columns().map_err(store_err)?;
        let aggregates = analysis::entity_aggregates(filtered, &columns).map_err(|e| {
            log::error!("entity aggregation failed: {}", e);
            PyRuntimeError::new_err(e.to_string())
        })?;
        let capped = analysis::sample_entities(&aggregates, limit.unwrap_or(usize::MAX));

        let rows: Vec<Value> = capped
            .iter()
            .map(|agg| {
                let mut obj = Map::new();
                obj.insert("user_id".into(), agg.entity.clone().into());
                obj.insert("cluster".into(), opt_label(agg.cluster));
                obj.insert("insider".into(), opt_label(agg.insider));
                for (column, mean) in columns.iter().zip(&agg.means) {
                    obj.insert(column.clone(), opt_number(*mean));
                }
                Value::Object(obj)
            })
            .collect();
        to_json(&rows)
    }

    /// Weekly mean anomaly score per cluster, as JSON for the line chart.
    pub fn get_temporal_series(&self) -> PyResult<String> {
        let filtered = self.store.filtered().map_err(store_err)?;
        to_json(&analysis::cluster_week_series(filtered))
    }

    /// Descriptive label for a cluster id, with the "Cluster {id}" fallback.
    pub fn cluster_label(&self, id: i64) -> String {
        self.labels.label(id)
    }

    /// Cluster profiles min-max rescaled per feature, as JSON for the radar.
    pub fn get_normalized_profiles(&self, features: Vec<String>) -> PyResult<String> {
        let profiles = self
            .profiles
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("cluster profiles not loaded"))?;
        let rows: Vec<Value> = profiles
            .normalized(&features, PROFILE_PADDING)
            .into_iter()
            .map(|p| {
                let mut obj = Map::new();
                obj.insert("cluster".into(), p.cluster.into());
                for (feature, value) in features.iter().zip(p.values) {
                    obj.insert(feature.clone(), opt_number(Some(value)));
                }
                Value::Object(obj)
            })
            .collect();
        to_json(&rows)
    }

    /// Plain-text session summary for the host's debug console.
    pub fn summary(&self) -> String {
        display::format_summary(&self.store)
    }
}

fn store_err(e: StoreError) -> PyErr {
    PyRuntimeError::new_err(e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

fn opt_number(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn opt_label(value: Option<i64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}
