use crate::store::DashboardStore;
use std::fmt::Write;

/// Renders the session state as an aligned plain-text block: dataset size,
/// filtered size, available clusters, and the subset statistics. Meant for
/// the host's debug console, not for the UI.
pub fn format_summary(store: &DashboardStore) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SESSION SUMMARY");
    let _ = writeln!(out, "--------------------------------------------------");

    let Ok(dataset) = store.dataset() else {
        let _ = writeln!(out, "no dataset loaded");
        return out;
    };
    // The store is loaded past this point; the remaining accessors cannot
    // fail.
    let filtered = store.filtered().unwrap_or_default();
    let clusters = store.unique_clusters().unwrap_or_default();
    let weeks = store.unique_weeks().unwrap_or_default();

    let _ = writeln!(out, "records loaded   : {}", dataset.len());
    let _ = writeln!(out, "records filtered : {}", filtered.len());
    let _ = writeln!(out, "clusters         : {:?}", clusters);
    let _ = writeln!(out, "weeks            : {:?}", weeks);

    if let Ok(stats) = store.statistics() {
        let fmt = |v: Option<f64>| match v {
            Some(v) => format!("{:.2}", v),
            None => "n/a".to_string(),
        };
        let _ = writeln!(out, "distinct entities: {}", stats.distinct_entities);
        let _ = writeln!(out, "insider rows     : {}", stats.insider_rows);
        let _ = writeln!(out, "mean score       : {}", fmt(stats.mean_score));
        let _ = writeln!(out, "max score        : {}", fmt(stats.max_score));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RawTable;

    #[test]
    fn test_summary_before_load() {
        let store = DashboardStore::new();
        let text = format_summary(&store);
        assert!(text.contains("no dataset loaded"));
    }

    #[test]
    fn test_summary_after_load() {
        let mut store = DashboardStore::new();
        store.load(
            RawTable::parse(
                "user_id,cluster,insider,week,final_anomaly_score\n\
                 u1,0,0,1,2.0\n\
                 u2,1,1,1,10.0\n",
            )
            .unwrap(),
        );
        let text = format_summary(&store);
        assert!(text.contains("records loaded   : 2"));
        assert!(text.contains("clusters         : [0, 1]"));
        assert!(text.contains("mean score       : 6.00"));
    }
}
