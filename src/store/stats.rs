//! Aggregate statistics derived from a snapshot of the store

use crate::store::record::{ScanRecord, Symbology};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts derived from the store contents
///
/// Every known symbology has an entry in `by_type` (possibly zero), any other
/// tag present in the store gets its own entry, and the counts always sum to
/// `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    /// Creation timestamp of the most recently inserted record
    pub last_scan_at: Option<i64>,
}

impl AggregateStats {
    /// Derive stats from records ordered most-recent-first
    pub fn from_records(records: &[ScanRecord]) -> Self {
        let mut by_type: BTreeMap<String, usize> = Symbology::known_tags()
            .map(|tag| (tag.to_string(), 0))
            .collect();

        for record in records {
            *by_type.entry(record.type_tag.clone()).or_insert(0) += 1;
        }

        Self {
            total: records.len(),
            by_type,
            last_scan_at: records.first().map(|r| r.created_at),
        }
    }

    pub fn count_for(&self, tag: &str) -> usize {
        self.by_type.get(tag).copied().unwrap_or(0)
    }

    /// Tags with at least one record, largest count first
    pub fn non_empty_types(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .by_type
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(tag, count)| (tag.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, tag: &str, created_at: i64) -> ScanRecord {
        ScanRecord {
            id,
            data: format!("payload-{}", id),
            type_tag: tag.to_string(),
            created_at,
        }
    }

    #[test]
    fn test_empty_stats_list_every_known_type() {
        let stats = AggregateStats::from_records(&[]);

        assert_eq!(stats.total, 0);
        assert_eq!(stats.last_scan_at, None);
        assert_eq!(stats.by_type.len(), Symbology::known_tags().count());
        assert!(stats.by_type.values().all(|count| *count == 0));
    }

    #[test]
    fn test_counts_sum_to_total_with_unknown_tags() {
        // most-recent-first
        let records = vec![
            record(4, "maxicode", 400),
            record(3, "qr", 300),
            record(2, "code128", 200),
            record(1, "qr", 100),
        ];

        let stats = AggregateStats::from_records(&records);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.count_for("qr"), 2);
        assert_eq!(stats.count_for("code128"), 1);
        assert_eq!(stats.count_for("maxicode"), 1);
        assert_eq!(stats.count_for("aztec"), 0);
        assert_eq!(stats.by_type.values().sum::<usize>(), stats.total);
        assert_eq!(stats.last_scan_at, Some(400));
    }

    #[test]
    fn test_last_scan_follows_insertion_not_timestamp() {
        // newest insertion carries an older clock reading
        let records = vec![record(2, "qr", 50), record(1, "qr", 900)];
        let stats = AggregateStats::from_records(&records);
        assert_eq!(stats.last_scan_at, Some(50));
    }

    #[test]
    fn test_non_empty_types_ordering() {
        let records = vec![
            record(3, "ean13", 3),
            record(2, "qr", 2),
            record(1, "qr", 1),
        ];
        let stats = AggregateStats::from_records(&records);
        assert_eq!(stats.non_empty_types(), vec![("qr", 2), ("ean13", 1)]);
    }
}
