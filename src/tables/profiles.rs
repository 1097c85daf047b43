//! The per-cluster feature-profile table: one row per cluster, one column
//! per feature, consumed directly by cluster-level views.

use crate::ingest::RawTable;
use serde::Serialize;

/// Share of the visual range reserved at each end when normalizing, so
/// profile shapes never touch the center or the rim of the radar.
pub const PROFILE_PADDING: f64 = 0.10;

#[derive(Debug, Clone, Default)]
pub struct ClusterProfiles {
    clusters: Vec<i64>,
    features: Vec<String>,
    /// `values[row]` aligned to `features`; a missing or malformed cell
    /// reads as 0.0, as the exporting pipeline never emits gaps.
    values: Vec<Vec<f64>>,
}

/// One cluster's profile rescaled into `[padding, 1 - padding]` per feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProfile {
    pub cluster: i64,
    /// Aligned to the features requested from [`ClusterProfiles::normalized`].
    pub values: Vec<f64>,
}

impl ClusterProfiles {
    /// Builds the profile table from a parsed file. The cluster id lives in
    /// a `cluster` column or, in older exports, in an unnamed leading index
    /// column; an unparseable id defaults to 0.
    pub fn from_table(table: &RawTable) -> Self {
        let id_column = table
            .column_index("cluster")
            .or_else(|| table.column_index(""));

        let features: Vec<String> = table
            .header
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != id_column)
            .map(|(_, name)| name.clone())
            .collect();

        let mut clusters = Vec::with_capacity(table.rows.len());
        let mut values = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let id = id_column
                .and_then(|i| row.get(i))
                .and_then(|tok| tok.trim().parse::<i64>().ok())
                .unwrap_or(0);
            clusters.push(id);
            values.push(
                table
                    .header
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(*i) != id_column)
                    .map(|(i, _)| {
                        row.get(i)
                            .and_then(|tok| tok.trim().parse::<f64>().ok())
                            .unwrap_or(0.0)
                    })
                    .collect(),
            );
        }

        Self {
            clusters,
            features,
            values,
        }
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Raw profile value for one cluster and feature.
    pub fn value(&self, cluster: i64, feature: &str) -> Option<f64> {
        let row = self.clusters.iter().position(|&c| c == cluster)?;
        let col = self.features.iter().position(|f| f == feature)?;
        Some(self.values[row][col])
    }

    /// Min-max rescales each requested feature across the clusters into
    /// `[padding, 1 - padding]`, so differences between clusters span the
    /// whole visual range. A feature with zero span across clusters (or one
    /// absent from the table) maps to 0.5 for every cluster instead of
    /// dividing by zero.
    pub fn normalized(&self, features: &[String], padding: f64) -> Vec<NormalizedProfile> {
        let columns: Vec<Option<usize>> = features
            .iter()
            .map(|f| self.features.iter().position(|have| have == f))
            .collect();

        // Extents are computed over the cluster profiles themselves, not the
        // raw dataset; that is what makes the shapes comparable.
        let extents: Vec<Option<(f64, f64)>> = columns
            .iter()
            .map(|col| {
                col.map(|c| {
                    let mut min = f64::INFINITY;
                    let mut max = f64::NEG_INFINITY;
                    for row in &self.values {
                        min = min.min(row[c]);
                        max = max.max(row[c]);
                    }
                    (min, max)
                })
            })
            .collect();

        self.clusters
            .iter()
            .zip(&self.values)
            .map(|(&cluster, row)| NormalizedProfile {
                cluster,
                values: columns
                    .iter()
                    .zip(&extents)
                    .map(|(col, extent)| match (col, extent) {
                        (Some(c), Some((min, max))) if max > min => {
                            let raw = (row[*c] - min) / (max - min);
                            padding + raw * (1.0 - 2.0 * padding)
                        }
                        _ => 0.5,
                    })
                    .collect(),
            })
            .collect()
    }
}
