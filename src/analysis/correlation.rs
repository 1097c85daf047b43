//! Pairwise Pearson correlation over the filtered subset.
//!
//! Population mean, deviation and covariance are used consistently (the
//! sample variant would cancel identically in the ratio; the choice is
//! recorded in DESIGN.md). O(k^2 * n) for k features over n records.

use crate::store::types::Record;
use serde::Serialize;

/// One cell of the correlation grid, in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    #[serde(rename = "x")]
    pub feature_x: String,
    #[serde(rename = "y")]
    pub feature_y: String,
    pub value: f64,
}

/// Computes the full `features x features` grid over `records`.
///
/// Each pair is evaluated over its pairwise-complete observations: rows where
/// either feature is non-numeric are excluded from that pair's statistics.
/// A pair with fewer than 2 complete observations, or where either feature
/// has zero deviation, gets the value 0, the "no signal" convention, so the
/// heatmap never sees NaN.
///
/// The output is a flat row-major list of length `features.len()^2`;
/// consumers reshape it into a grid without re-sorting.
pub fn correlate(records: &[Record], features: &[String]) -> Vec<CorrelationCell> {
    let mut cells = Vec::with_capacity(features.len() * features.len());
    for fx in features {
        for fy in features {
            cells.push(CorrelationCell {
                feature_x: fx.clone(),
                feature_y: fy.clone(),
                value: pearson(records, fx, fy),
            });
        }
    }
    cells
}

fn pearson(records: &[Record], fx: &str, fy: &str) -> f64 {
    // Pass 1: means over the pairwise-complete observations.
    let mut n = 0usize;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for r in records {
        if let (Some(x), Some(y)) = (r.numeric(fx), r.numeric(fy)) {
            n += 1;
            sum_x += x;
            sum_y += y;
        }
    }
    if n < 2 {
        return 0.0;
    }
    let mean_x = sum_x / n as f64;
    let mean_y = sum_y / n as f64;

    // Pass 2: population covariance and variances.
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for r in records {
        if let (Some(x), Some(y)) = (r.numeric(fx), r.numeric(fy)) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    // The n divisors cancel in the ratio; clamp soaks up float drift at the
    // diagonal.
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RawTable;
    use crate::schema::typing::type_row;
    use crate::store::types::Header;
    use std::sync::Arc;

    fn records(csv: &str) -> Vec<Record> {
        let table = RawTable::parse(csv).unwrap();
        let header = Arc::new(Header::from_names(table.header.clone()));
        table
            .rows
            .iter()
            .map(|row| type_row(&header, row).0)
            .collect()
    }

    fn features(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn cell<'a>(cells: &'a [CorrelationCell], x: &str, y: &str) -> &'a CorrelationCell {
        cells
            .iter()
            .find(|c| c.feature_x == x && c.feature_y == y)
            .unwrap()
    }

    const SAMPLE: &str = "user_id,cluster,insider,week,a,b,c\n\
                          u1,0,0,1,1.0,2.0,5.0\n\
                          u2,0,0,1,2.0,4.0,5.0\n\
                          u3,0,0,1,3.0,6.0,5.0\n\
                          u4,0,0,1,4.0,8.0,5.0\n";

    #[test]
    fn test_row_major_grid_shape() {
        let cells = correlate(&records(SAMPLE), &features(&["a", "b"]));
        assert_eq!(cells.len(), 4);
        let order: Vec<(&str, &str)> = cells
            .iter()
            .map(|c| (c.feature_x.as_str(), c.feature_y.as_str()))
            .collect();
        assert_eq!(order, vec![("a", "a"), ("a", "b"), ("b", "a"), ("b", "b")]);
    }

    #[test]
    fn test_perfect_linear_correlation() {
        // b = 2a exactly, so r(a, b) = 1.
        let cells = correlate(&records(SAMPLE), &features(&["a", "b"]));
        assert!((cell(&cells, "a", "b").value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_is_one_under_variance() {
        let cells = correlate(&records(SAMPLE), &features(&["a", "b"]));
        assert!((cell(&cells, "a", "a").value - 1.0).abs() < 1e-12);
        assert!((cell(&cells, "b", "b").value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let data = records(
            "user_id,cluster,insider,week,a,b,c\n\
             u1,0,0,1,1.0,9.0,2.5\n\
             u2,0,0,1,4.0,3.0,1.0\n\
             u3,0,0,1,2.0,7.0,8.0\n\
             u4,0,0,1,5.0,1.0,0.5\n",
        );
        let names = features(&["a", "b", "c"]);
        let cells = correlate(&data, &names);
        for fx in &names {
            for fy in &names {
                assert_eq!(cell(&cells, fx, fy).value, cell(&cells, fy, fx).value);
            }
        }
    }

    #[test]
    fn test_zero_variance_yields_zero_not_nan() {
        // c is constant: every pairing with it reports "no signal".
        let cells = correlate(&records(SAMPLE), &features(&["a", "c"]));
        assert_eq!(cell(&cells, "a", "c").value, 0.0);
        assert_eq!(cell(&cells, "c", "a").value, 0.0);
        assert_eq!(cell(&cells, "c", "c").value, 0.0);
    }

    #[test]
    fn test_fewer_than_two_records_yields_zeros() {
        let one = records("user_id,cluster,insider,week,a,b\nu1,0,0,1,1.0,2.0\n");
        let cells = correlate(&one, &features(&["a", "b"]));
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|c| c.value == 0.0));

        let none = records("user_id,cluster,insider,week,a,b\n");
        assert!(correlate(&none, &features(&["a", "b"]))
            .iter()
            .all(|c| c.value == 0.0));
    }

    #[test]
    fn test_text_tokens_use_pairwise_complete_rows() {
        // The malformed row drops out of the (a, b) pair; the remaining
        // rows still correlate perfectly.
        let data = records(
            "user_id,cluster,insider,week,a,b\n\
             u1,0,0,1,1.0,2.0\n\
             u2,0,0,1,oops,3.0\n\
             u3,0,0,1,3.0,6.0\n\
             u4,0,0,1,4.0,8.0\n",
        );
        let cells = correlate(&data, &features(&["a", "b"]));
        assert!((cell(&cells, "a", "b").value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_anticorrelation() {
        let data = records(
            "user_id,cluster,insider,week,a,b\n\
             u1,0,0,1,1.0,4.0\n\
             u2,0,0,1,2.0,3.0\n\
             u3,0,0,1,3.0,2.0\n\
             u4,0,0,1,4.0,1.0\n",
        );
        let cells = correlate(&data, &features(&["a", "b"]));
        assert!((cell(&cells, "a", "b").value + 1.0).abs() < 1e-12);
    }
}
