use crate::schema::policy;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

/// One typed field of a record.
///
/// Serializes untagged so a record becomes the same JSON object shape the
/// charts already consume: numbers as numbers, text as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the field. Text is never coerced here; coercion is the
    /// typing pass's job.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Integer-label view. A float holding an integral value counts, so a
    /// label that arrived as "2.0" still matches cluster 2.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Shared column layout for every record of one dataset.
///
/// Built once per load; records reference it so field access stays an index
/// lookup instead of a per-row map.
#[derive(Debug, Default)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
    entity: Option<usize>,
    cluster: Option<usize>,
    insider: Option<usize>,
    week: Option<usize>,
    score: Option<usize>,
}

impl Header {
    pub fn from_names(names: Vec<String>) -> Self {
        let index: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let find = |name: &str| index.get(name).copied();
        Self {
            entity: find(policy::ENTITY_COLUMN),
            cluster: find(policy::CLUSTER_COLUMN),
            insider: find(policy::INSIDER_COLUMN),
            week: find(policy::WEEK_COLUMN),
            score: find(policy::SCORE_COLUMN),
            names,
            index,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// One observation: an entity in one period, with its typed fields.
#[derive(Debug, Clone)]
pub struct Record {
    header: Arc<Header>,
    values: Vec<FieldValue>,
}

impl Record {
    /// The typing pass guarantees `values` is aligned to the header.
    pub(crate) fn new(header: Arc<Header>, values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(header.len(), values.len());
        Self { header, values }
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.header.index_of(column).map(|i| &self.values[i])
    }

    pub fn value_at(&self, index: usize) -> &FieldValue {
        &self.values[index]
    }

    /// Numeric view of a named column, if the field holds a number.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(FieldValue::as_f64)
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.header.entity.and_then(|i| self.values[i].as_text())
    }

    pub fn cluster(&self) -> Option<i64> {
        self.header.cluster.and_then(|i| self.values[i].as_i64())
    }

    pub fn insider(&self) -> Option<i64> {
        self.header.insider.and_then(|i| self.values[i].as_i64())
    }

    pub fn week(&self) -> Option<i64> {
        self.header.week.and_then(|i| self.values[i].as_i64())
    }

    pub fn anomaly_score(&self) -> Option<f64> {
        self.header.score.and_then(|i| self.values[i].as_f64())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.header.names.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Summary statistics over the current filtered subset.
///
/// `mean_score` / `max_score` are `None` when no record carries a numeric
/// score: the explicit "unavailable" sentinel, never NaN and never a panic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetStats {
    /// Row count of the subset (entities appear once per period).
    pub rows: usize,
    /// Distinct entity identifiers in the subset.
    pub distinct_entities: usize,
    /// Rows labeled as known malicious insiders.
    pub insider_rows: usize,
    pub mean_score: Option<f64>,
    pub max_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(names: &[&str], values: Vec<FieldValue>) -> Record {
        let header = Arc::new(Header::from_names(
            names.iter().map(|s| s.to_string()).collect(),
        ));
        Record::new(header, values)
    }

    #[test]
    fn test_well_known_accessors() {
        let r = record(
            &["user_id", "cluster", "insider", "week", "final_anomaly_score"],
            vec![
                FieldValue::Text("u1".into()),
                FieldValue::Int(2),
                FieldValue::Int(0),
                FieldValue::Int(3),
                FieldValue::Float(7.25),
            ],
        );
        assert_eq!(r.entity_id(), Some("u1"));
        assert_eq!(r.cluster(), Some(2));
        assert_eq!(r.insider(), Some(0));
        assert_eq!(r.week(), Some(3));
        assert_eq!(r.anomaly_score(), Some(7.25));
    }

    #[test]
    fn test_text_label_is_not_a_label() {
        // A lenient typing fallback leaves "N/A" on the record; label
        // accessors see it as absent rather than inventing a number.
        let r = record(&["cluster"], vec![FieldValue::Text("N/A".into())]);
        assert_eq!(r.cluster(), None);
        assert_eq!(r.get("cluster").unwrap().as_text(), Some("N/A"));
    }

    #[test]
    fn test_integral_float_matches_label() {
        assert_eq!(FieldValue::Float(2.0).as_i64(), Some(2));
        assert_eq!(FieldValue::Float(2.5).as_i64(), None);
        assert_eq!(FieldValue::Float(f64::NAN).as_i64(), None);
    }

    #[test]
    fn test_record_serializes_as_object() {
        let r = record(
            &["user_id", "week"],
            vec![FieldValue::Text("u9".into()), FieldValue::Int(4)],
        );
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"user_id":"u9","week":4}"#);
    }
}
