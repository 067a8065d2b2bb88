//! Record collection for each lookback window.

use super::aggregator::build_aggregate;
use super::periods::Period;
use super::AnalysisError;
use crate::models::{PeriodAggregate, RecordKind};
use crate::store::{RecordStore, StoreError};
use futures::future::join_all;
use tracing::{debug, warn};

/// Replace a failed query with an empty list, remembering which kind failed.
fn or_empty<T>(
    result: Result<Vec<T>, StoreError>,
    period: &Period,
    kind: RecordKind,
    failed: &mut Vec<RecordKind>,
) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Failed to fetch {} for {}: {}", kind, period.name, e);
            failed.push(kind);
            Vec::new()
        }
    }
}

/// Fetch and reduce the records of a single window.
///
/// Query failures never fail the window; the affected list is left empty
/// and listed in `PeriodAggregate::failed`.
pub async fn collect_period(store: &dyn RecordStore, period: &Period) -> PeriodAggregate {
    let (sightings, hazards, tasks) = tokio::join!(
        store.sightings_since(period.start),
        store.hazards_since(period.start),
        store.tasks_since(period.start),
    );

    let mut failed = Vec::new();
    let sightings = or_empty(sightings, period, RecordKind::Sightings, &mut failed);
    let hazards = or_empty(hazards, period, RecordKind::Hazards, &mut failed);
    let tasks = or_empty(tasks, period, RecordKind::Tasks, &mut failed);

    debug!(
        "{} ({}d): {} sightings, {} hazards, {} tasks",
        period.name,
        period.span_days,
        sightings.len(),
        hazards.len(),
        tasks.len()
    );

    build_aggregate(period.name, sightings, hazards, tasks, failed)
}

/// Collect every window concurrently, keeping declaration order.
///
/// Fails only when not a single query succeeded, which means the store
/// cannot be reached at all.
pub async fn collect_all(
    store: &dyn RecordStore,
    periods: &[Period],
) -> Result<Vec<PeriodAggregate>, AnalysisError> {
    let aggregates = join_all(periods.iter().map(|p| collect_period(store, p))).await;

    let all_failed = !aggregates.is_empty() && aggregates.iter().all(|agg| agg.failed.len() == 3);
    if all_failed {
        return Err(AnalysisError::StoreUnavailable);
    }

    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::periods::generate_periods;
    use crate::models::{HazardReport, Severity, Sighting, Task};
    use crate::store::MemoryStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap()
    }

    fn sighting(species: &str, days_ago: i64) -> Sighting {
        Sighting {
            species: species.to_string(),
            severity: Severity::Medium,
            created_at: now() - Duration::days(days_ago),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![
                sighting("galeb", 1),
                sighting("lastavica", 5),
                sighting("vrana", 20),
                sighting("čaplja", 100),
                sighting("sokol", 400),
            ],
            vec![HazardReport {
                created_at: now() - Duration::days(10),
            }],
            vec![Task {
                created_at: now() - Duration::hours(3),
            }],
        )
    }

    #[tokio::test]
    async fn test_collect_all_counts_per_window() {
        let store = store();
        let periods = generate_periods(now());
        let aggregates = collect_all(&store, &periods).await.unwrap();

        let counts: Vec<_> = aggregates.iter().map(|a| a.sightings.len()).collect();
        assert_eq!(counts, vec![1, 1, 2, 3, 3, 4, 4]);

        let names: Vec<_> = aggregates.iter().map(|a| a.period_name.as_str()).collect();
        assert_eq!(names[3], "month");
        assert_eq!(aggregates[2].hazards.len(), 0);
        assert_eq!(aggregates[3].hazards.len(), 1);
        assert!(aggregates.iter().all(|a| a.tasks.len() == 1));
        assert!(aggregates.iter().all(|a| a.failed.is_empty()));
    }

    #[tokio::test]
    async fn test_longer_window_is_superset() {
        let store = store();
        let periods = generate_periods(now());
        let aggregates = collect_all(&store, &periods).await.unwrap();

        let week = &aggregates[2];
        let month = &aggregates[3];
        assert_eq!(week.period_name, "week");
        assert!(week.sightings.iter().all(|s| month.sightings.contains(s)));

        for pair in aggregates.windows(2) {
            assert!(pair[0]
                .sightings
                .iter()
                .all(|s| pair[1].sightings.contains(s)));
        }
    }

    #[tokio::test]
    async fn test_failed_kind_becomes_empty() {
        let store = store().fail_on(RecordKind::Sightings);
        let periods = generate_periods(now());
        let aggregates = collect_all(&store, &periods).await.unwrap();

        for agg in &aggregates {
            assert!(agg.sightings.is_empty());
            assert!(agg.species_frequency.is_empty());
            assert_eq!(agg.failed, vec![RecordKind::Sightings]);
            assert_eq!(agg.tasks.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_store_unavailable_when_everything_fails() {
        let store = MemoryStore::default()
            .fail_on(RecordKind::Sightings)
            .fail_on(RecordKind::Hazards)
            .fail_on(RecordKind::Tasks);
        let periods = generate_periods(now());

        let result = collect_all(&store, &periods).await;
        assert!(matches!(result, Err(AnalysisError::StoreUnavailable)));
    }
}
