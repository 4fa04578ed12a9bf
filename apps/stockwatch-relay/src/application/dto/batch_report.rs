//! Batch Failure Report DTO
//!
//! Serializes to the partial-batch response the stream runtime expects:
//!
//! ```json
//! {"batchItemFailures": [{"itemIdentifier": "<sequence number>"}]}
//! ```
//!
//! Only the listed records are redelivered. An empty list acknowledges the
//! whole batch.

use serde::{Deserialize, Serialize};

use crate::domain::change_record::{ChangeRecord, RecordId};

/// One failed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    /// Identifier of the record to redeliver.
    pub item_identifier: RecordId,
}

/// Records of a batch that were not processed, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailureReport {
    batch_item_failures: Vec<BatchItemFailure>,
}

impl BatchFailureReport {
    /// Report every record of a batch as failed.
    #[must_use]
    pub fn for_records(records: &[ChangeRecord]) -> Self {
        let mut report = Self::default();
        for record in records {
            report.push(record.id.clone());
        }
        report
    }

    /// Add a failed record. Duplicate IDs are ignored.
    pub fn push(&mut self, id: RecordId) {
        if !self.contains(&id) {
            self.batch_item_failures.push(BatchItemFailure {
                item_identifier: id,
            });
        }
    }

    /// Check if a record is reported as failed.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.batch_item_failures
            .iter()
            .any(|failure| &failure.item_identifier == id)
    }

    /// Failed record IDs, in input order.
    pub fn failed_record_ids(&self) -> impl Iterator<Item = &RecordId> {
        self.batch_item_failures
            .iter()
            .map(|failure| &failure.item_identifier)
    }

    /// Number of failed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batch_item_failures.len()
    }

    /// Check if the whole batch succeeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch_item_failures.is_empty()
    }
}

impl FromIterator<RecordId> for BatchFailureReport {
    fn from_iter<T: IntoIterator<Item = RecordId>>(iter: T) -> Self {
        let mut report = Self::default();
        for id in iter {
            report.push(id);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change_record::ChangeKey;

    #[test]
    fn serializes_to_runtime_shape() {
        let report: BatchFailureReport =
            [RecordId::new("100"), RecordId::new("200")].into_iter().collect();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "batchItemFailures": [
                    {"itemIdentifier": "100"},
                    {"itemIdentifier": "200"}
                ]
            })
        );
    }

    #[test]
    fn empty_report_acknowledges_batch() {
        let json = serde_json::to_string(&BatchFailureReport::default()).unwrap();
        assert_eq!(json, r#"{"batchItemFailures":[]}"#);
    }

    #[test]
    fn push_keeps_order_and_drops_duplicates() {
        let mut report = BatchFailureReport::default();
        report.push(RecordId::new("3"));
        report.push(RecordId::new("1"));
        report.push(RecordId::new("3"));

        let ids: Vec<&str> = report.failed_record_ids().map(RecordId::as_str).collect();
        assert_eq!(ids, vec!["3", "1"]);
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn for_records_reports_every_record() {
        let records = vec![
            ChangeRecord::new("a", ChangeKey::new("PRICE", "AAPL")),
            ChangeRecord::new("b", ChangeKey::new("SYMBOL", "AAPL")),
        ];

        let report = BatchFailureReport::for_records(&records);
        assert!(report.contains(&RecordId::new("a")));
        assert!(report.contains(&RecordId::new("b")));
        assert_eq!(report.len(), 2);
    }
}
