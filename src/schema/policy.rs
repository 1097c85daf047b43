//! The fixed per-column type policy for the behavioral dataset.

/// Well-known column names, as exported by the upstream pipeline.
pub const ENTITY_COLUMN: &str = "user_id";
pub const CLUSTER_COLUMN: &str = "cluster";
pub const INSIDER_COLUMN: &str = "insider";
pub const WEEK_COLUMN: &str = "week";
pub const SCORE_COLUMN: &str = "final_anomaly_score";

/// Columns kept as text verbatim, even when the token looks numeric.
const CATEGORICAL_COLUMNS: &[&str] = &[
    ENTITY_COLUMN,
    "role",
    "b_unit",
    "f_unit",
    "dept",
    "team",
    "ITAdmin",
    "timestamp",
];

/// Columns coerced to an integer label / ordinal.
const ORDINAL_COLUMNS: &[&str] = &[INSIDER_COLUMN, CLUSTER_COLUMN, WEEK_COLUMN];

/// How a column's text tokens are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    /// Kept as text, never coerced.
    Categorical,
    /// Integer coercion; on failure the text is preserved and reported.
    Ordinal,
    /// Float coercion; on failure the text is preserved. Unknown columns land
    /// here so free-text additions survive without a schema change.
    Numeric,
}

/// Total classification function over column names.
pub fn classify(column: &str) -> ColumnClass {
    if CATEGORICAL_COLUMNS.contains(&column) {
        ColumnClass::Categorical
    } else if ORDINAL_COLUMNS.contains(&column) {
        ColumnClass::Ordinal
    } else {
        ColumnClass::Numeric
    }
}
