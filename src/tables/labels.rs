//! Descriptive names for cluster ids, with a uniform fallback for ids the
//! mapping does not cover.

use crate::ingest::RawTable;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ClusterLabelMap {
    labels: HashMap<i64, String>,
}

impl ClusterLabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the mapping from a two-column table (`cluster`, `label`), or the
    /// first two columns when the header uses other names. Rows without a
    /// parseable id are skipped.
    pub fn from_table(table: &RawTable) -> Self {
        let id_col = table.column_index("cluster").unwrap_or(0);
        let label_col = table
            .column_index("label")
            .unwrap_or(if id_col == 0 { 1 } else { 0 });

        let mut labels = HashMap::new();
        let mut skipped = 0usize;
        for row in &table.rows {
            let id = row.get(id_col).and_then(|tok| tok.trim().parse::<i64>().ok());
            match (id, row.get(label_col)) {
                (Some(id), Some(label)) if !label.trim().is_empty() => {
                    labels.insert(id, label.trim().to_string());
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            log::debug!("{} cluster-label row(s) skipped", skipped);
        }
        Self { labels }
    }

    pub fn from_pairs<I: IntoIterator<Item = (i64, String)>>(pairs: I) -> Self {
        Self {
            labels: pairs.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The descriptive label for `id`, or `"Cluster {id}"` when unmapped.
    pub fn label(&self, id: i64) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Cluster {}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_and_fallback_labels() {
        let map = ClusterLabelMap::from_pairs([
            (0, "Quiet baseline".to_string()),
            (3, "After-hours heavy".to_string()),
        ]);
        assert_eq!(map.label(0), "Quiet baseline");
        assert_eq!(map.label(3), "After-hours heavy");
        assert_eq!(map.label(7), "Cluster 7");
    }

    #[test]
    fn test_from_table() {
        let table = RawTable::parse(
            "cluster,label\n\
             0,Quiet baseline\n\
             1,USB exfil pattern\n\
             bad,ignored\n",
        )
        .unwrap();
        let map = ClusterLabelMap::from_table(&table);
        assert_eq!(map.len(), 2);
        assert_eq!(map.label(1), "USB exfil pattern");
        assert_eq!(map.label(2), "Cluster 2");
    }

    #[test]
    fn test_empty_map_always_falls_back() {
        let map = ClusterLabelMap::new();
        assert!(map.is_empty());
        assert_eq!(map.label(-1), "Cluster -1");
    }
}
