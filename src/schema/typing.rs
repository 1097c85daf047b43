//! Converts one raw text row into a typed [`Record`].
//!
//! Typing never fails and never drops a row. Every coercion outcome is made
//! explicit through [`RowOutcome`] so the caller decides what a malformed
//! token means, instead of that policy living inside the loader.

use crate::schema::policy::{classify, ColumnClass};
use crate::store::types::{FieldValue, Header, Record};
use smallvec::SmallVec;
use std::sync::Arc;

/// Per-row typing report: which columns fell back to text because their token
/// failed numeric coercion. An empty token is missing data, not a malformed
/// one, and is not counted here.
#[derive(Debug, Default)]
pub struct RowOutcome {
    fallbacks: SmallVec<[u32; 4]>,
}

impl RowOutcome {
    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty()
    }

    pub fn fallback_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.fallbacks.iter().map(|&i| i as usize)
    }

    pub fn fallback_count(&self) -> usize {
        self.fallbacks.len()
    }
}

/// Types one raw row against the header's column policy.
///
/// A row shorter than the header is padded with empty text fields; surplus
/// fields beyond the header are ignored.
pub fn type_row(header: &Arc<Header>, row: &[String]) -> (Record, RowOutcome) {
    let mut values = Vec::with_capacity(header.len());
    let mut outcome = RowOutcome::default();

    for (i, name) in header.names().iter().enumerate() {
        let token = row.get(i).map(String::as_str).unwrap_or("");
        let value = match classify(name) {
            ColumnClass::Categorical => FieldValue::Text(token.to_string()),
            ColumnClass::Ordinal | ColumnClass::Numeric => match parse_numeric(token) {
                Some(v) => v,
                None => {
                    if !token.trim().is_empty() {
                        outcome.fallbacks.push(i as u32);
                    }
                    FieldValue::Text(token.to_string())
                }
            },
        };
        values.push(value);
    }

    (Record::new(Arc::clone(header), values), outcome)
}

/// Numeric coercion: integer first so clean labels stay integers, float as
/// the general case. Surrounding whitespace is tolerated.
fn parse_numeric(token: &str) -> Option<FieldValue> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Ok(v) = token.parse::<i64>() {
        return Some(FieldValue::Int(v));
    }
    token.parse::<f64>().ok().map(FieldValue::Float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn header(names: &[&str]) -> Arc<Header> {
        Arc::new(Header::from_names(
            names.iter().map(|s| s.to_string()).collect(),
        ))
    }

    fn row(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_categorical_never_coerced() {
        // "team" looks numeric here; the policy keeps it text anyway.
        let h = header(&["user_id", "team"]);
        let (r, outcome) = type_row(&h, &row(&["AAM0658", "42"]));
        assert_eq!(r.get("team").unwrap(), &FieldValue::Text("42".into()));
        assert!(outcome.is_clean());
    }

    #[rstest]
    #[case("3", FieldValue::Int(3))]
    #[case(" 3 ", FieldValue::Int(3))]
    #[case("2.0", FieldValue::Float(2.0))]
    #[case("-1.5", FieldValue::Float(-1.5))]
    fn test_numeric_coercion(#[case] token: &str, #[case] expected: FieldValue) {
        let h = header(&["n_logon"]);
        let (r, outcome) = type_row(&h, &row(&[token]));
        assert_eq!(r.get("n_logon").unwrap(), &expected);
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_ordinal_failure_preserves_text() {
        // Legacy leniency under test: cluster="N/A" stays the literal text,
        // and the label accessor reports the field as absent.
        let h = header(&["user_id", "cluster"]);
        let (r, outcome) = type_row(&h, &row(&["u1", "N/A"]));
        assert_eq!(r.get("cluster").unwrap(), &FieldValue::Text("N/A".into()));
        assert_eq!(r.cluster(), None);
        assert_eq!(outcome.fallback_count(), 1);
        assert_eq!(outcome.fallback_columns().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_free_text_column_survives() {
        let h = header(&["notes"]);
        let (r, outcome) = type_row(&h, &row(&["escalated to SOC"]));
        assert_eq!(
            r.get("notes").unwrap(),
            &FieldValue::Text("escalated to SOC".into())
        );
        assert_eq!(outcome.fallback_count(), 1);
    }

    #[test]
    fn test_empty_token_is_missing_not_malformed() {
        let h = header(&["n_usb"]);
        let (r, outcome) = type_row(&h, &row(&[""]));
        assert_eq!(r.get("n_usb").unwrap(), &FieldValue::Text(String::new()));
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_short_row_padded() {
        let h = header(&["user_id", "week", "n_file"]);
        let (r, outcome) = type_row(&h, &row(&["u2"]));
        assert_eq!(r.get("week").unwrap(), &FieldValue::Text(String::new()));
        assert_eq!(r.get("n_file").unwrap(), &FieldValue::Text(String::new()));
        assert!(outcome.is_clean());
    }
}
