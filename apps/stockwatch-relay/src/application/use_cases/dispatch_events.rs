//! Dispatch Events Use Case
//!
//! Turns one batch of change records into delta writes and published
//! events, and reports which records must be redelivered.
//!
//! # Algorithm
//!
//! 1. Classify each record in input order. Price records yield a delta
//!    record and a price event, delta records yield a price delta event,
//!    unknown records are skipped without being reported.
//! 2. A record that cannot be turned into its delta or event is reported
//!    and processing continues with the next record.
//! 3. If any record was reported, nothing is written or published and the
//!    report is returned as is. Redelivery of the batch re-runs the records
//!    that were valid.
//! 4. Otherwise the deltas are upserted, then all events are published in a
//!    single call. A store or bus call that fails outright reports every
//!    record of the batch.
//! 5. If the bus accepts the call but rejects some entries, the rejected
//!    entries are mapped back to their source records by position.
//!
//! Delivery is at-least-once: consumers must tolerate duplicate events.

use std::sync::Arc;
use std::time::Instant;

use crate::application::dto::BatchFailureReport;
use crate::application::ports::{
    DEFAULT_EVENT_SOURCE, DeltaStoreError, DeltaStorePort, EventPublisherPort, PublishEntry,
    PublishOutcome,
};
use crate::application::services::DispatchStats;
use crate::domain::change_record::{ChangeRecord, RecordId};
use crate::domain::classification::{RecordKind, classify};
use crate::domain::delta::{DeltaRecord, compute_delta};
use crate::domain::events::{SymbolEvent, build_price_delta_event, build_price_event};
use crate::domain::shared::RecordError;
use crate::infrastructure::metrics;

/// Publishing settings for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Source identifier attached to every entry.
    pub event_source: String,
    /// Target bus; `None` targets the default bus.
    pub event_bus_name: Option<String>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            event_source: DEFAULT_EVENT_SOURCE.to_string(),
            event_bus_name: None,
        }
    }
}

/// An event waiting to be published, with the record it came from.
#[derive(Debug, Clone)]
struct PendingEvent {
    record_id: RecordId,
    event: SymbolEvent,
}

/// Writes and events derived from a fully valid batch.
#[derive(Debug, Default)]
struct BatchPlan {
    deltas: Vec<DeltaRecord>,
    events: Vec<PendingEvent>,
}

/// Use case for dispatching a batch of change records.
pub struct DispatchEventsUseCase<S, P>
where
    S: DeltaStorePort,
    P: EventPublisherPort,
{
    store: Arc<S>,
    publisher: Arc<P>,
    settings: DispatchSettings,
    stats: Arc<DispatchStats>,
}

impl<S, P> DispatchEventsUseCase<S, P>
where
    S: DeltaStorePort,
    P: EventPublisherPort,
{
    /// Create a new DispatchEventsUseCase.
    pub fn new(store: Arc<S>, publisher: Arc<P>, settings: DispatchSettings) -> Self {
        Self {
            store,
            publisher,
            settings,
            stats: Arc::new(DispatchStats::new()),
        }
    }

    /// Shared dispatch counters.
    #[must_use]
    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Dispatch one batch and report the records to redeliver.
    #[tracing::instrument(skip_all, fields(batch_size = records.len()))]
    pub async fn dispatch(&self, records: &[ChangeRecord]) -> BatchFailureReport {
        let started = Instant::now();
        let report = self.run(records).await;

        metrics::record_dispatch_duration(started.elapsed());
        self.stats.record_batch(records.len(), report.len());

        if report.is_empty() {
            tracing::debug!("Batch dispatched");
        } else {
            tracing::info!(failed = report.len(), "Batch dispatched with failures");
        }
        report
    }

    async fn run(&self, records: &[ChangeRecord]) -> BatchFailureReport {
        // Any invalid record blocks the whole batch.
        let plan = match Self::plan(records) {
            Ok(plan) => plan,
            Err(report) => return report,
        };

        if let Err(e) = self.write_deltas(&plan.deltas).await {
            tracing::error!(error = %e, "Delta write failed, failing whole batch");
            metrics::record_publish_failure("store");
            self.stats.record_transport_failure();
            return BatchFailureReport::for_records(records);
        }

        if plan.events.is_empty() {
            return BatchFailureReport::default();
        }

        self.publish(plan.events, records).await
    }

    fn plan(records: &[ChangeRecord]) -> Result<BatchPlan, BatchFailureReport> {
        let mut plan = BatchPlan::default();
        let mut report = BatchFailureReport::default();

        for record in records {
            let kind = classify(record);
            metrics::record_received(kind);

            let planned = match kind {
                RecordKind::Price => Self::plan_price(record).map(|(delta, event)| {
                    plan.deltas.push(delta);
                    event
                }),
                RecordKind::Delta => build_price_delta_event(record).map(SymbolEvent::from),
                RecordKind::Unknown => {
                    tracing::debug!(
                        record_id = %record.id,
                        partition_key = %record.key.partition_key,
                        "Skipping record with unrecognized partition key"
                    );
                    metrics::record_skipped();
                    continue;
                }
            };

            match planned {
                Ok(event) => plan.events.push(PendingEvent {
                    record_id: record.id.clone(),
                    event,
                }),
                Err(e) => {
                    tracing::warn!(
                        record_id = %record.id,
                        event_id = %record.event_id,
                        change = record.kind.as_str(),
                        kind = kind.as_str(),
                        error = %e,
                        "Failed to process change record"
                    );
                    metrics::record_failed(e.reason());
                    report.push(record.id.clone());
                }
            }
        }

        if report.is_empty() {
            Ok(plan)
        } else {
            tracing::warn!(
                failed = report.len(),
                "Batch has invalid records, publishing nothing"
            );
            Err(report)
        }
    }

    fn plan_price(record: &ChangeRecord) -> Result<(DeltaRecord, SymbolEvent), RecordError> {
        let delta = compute_delta(record)?;
        let event = build_price_event(record)?;
        Ok((delta, event.into()))
    }

    async fn write_deltas(&self, deltas: &[DeltaRecord]) -> Result<(), DeltaStoreError> {
        for delta in deltas {
            self.store.put_delta(delta).await?;
            metrics::record_delta_written();
            tracing::debug!(symbol = %delta.symbol(), delta = delta.delta(), "Delta written");
        }
        if !deltas.is_empty() {
            self.stats.record_transport_success();
        }
        Ok(())
    }

    async fn publish(
        &self,
        events: Vec<PendingEvent>,
        records: &[ChangeRecord],
    ) -> BatchFailureReport {
        let entries: Result<Vec<PublishEntry>, _> = events
            .iter()
            .map(|pending| {
                PublishEntry::from_event(
                    &pending.event,
                    &self.settings.event_source,
                    self.settings.event_bus_name.as_deref(),
                )
            })
            .collect();

        let entries = match entries {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build publish entries");
                metrics::record_publish_failure("serialization");
                return BatchFailureReport::for_records(records);
            }
        };

        let outcome = match self.publisher.publish_events(entries).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Publish failed, failing whole batch");
                metrics::record_publish_failure("transport");
                self.stats.record_transport_failure();
                return BatchFailureReport::for_records(records);
            }
        };
        self.stats.record_transport_success();

        let report = rejected_records(&events, &outcome);
        let published = events.len().saturating_sub(report.len());
        for pending in events
            .iter()
            .filter(|pending| !report.contains(&pending.record_id))
        {
            metrics::record_event_published(pending.event.event_type());
        }
        self.stats.record_published(published);

        if report.is_empty() {
            tracing::info!(events = published, "Published events");
        } else {
            tracing::warn!(
                published,
                rejected = report.len(),
                failed_entry_count = outcome.failed_entry_count,
                "Bus rejected some entries"
            );
            metrics::record_publish_failure("rejected_entries");
        }
        report
    }
}

/// Map a publish outcome back to the records whose entries were rejected.
///
/// When the per-entry results cannot be lined up with the request (wrong
/// length, or a failure count with no rejected entry), every record that
/// produced an event is reported.
fn rejected_records(events: &[PendingEvent], outcome: &PublishOutcome) -> BatchFailureReport {
    if outcome.is_complete() {
        return BatchFailureReport::default();
    }

    let aligned = outcome.entries.len() == events.len();
    let report: BatchFailureReport = if aligned {
        events
            .iter()
            .zip(&outcome.entries)
            .filter(|(_, result)| result.is_rejected())
            .map(|(pending, _)| pending.record_id.clone())
            .collect()
    } else {
        BatchFailureReport::default()
    };

    if report.is_empty() {
        tracing::warn!(
            entries = outcome.entries.len(),
            expected = events.len(),
            "Publish outcome does not identify rejected entries"
        );
        return events
            .iter()
            .map(|pending| pending.record_id.clone())
            .collect();
    }
    report
}
