//! Multi-period wildlife activity analysis.
//!
//! The pipeline runs one way: lookback windows are generated from an
//! injected "now", each window's records are collected and reduced, and
//! the aggregates are turned into a narrative (AI-written when possible,
//! templated otherwise).

pub mod aggregator;
pub mod collector;
pub mod fallback;
pub mod narrative;
pub mod periods;
pub mod prompt;

pub use narrative::NarrativeProducer;

use crate::models::Analysis;
use crate::store::RecordStore;
use chrono::{DateTime, Utc};
use tracing::info;

/// Failures that stop an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("record store is unavailable: every query failed")]
    StoreUnavailable,
}

/// Run the whole pipeline for the instant `now`.
pub async fn run_analysis(
    store: &dyn RecordStore,
    producer: &NarrativeProducer,
    now: DateTime<Utc>,
) -> Result<Analysis, AnalysisError> {
    let periods = periods::generate_periods(now);
    info!("Collecting records for {} periods", periods.len());

    let aggregates = collector::collect_all(store, &periods).await?;
    let narrative = producer.produce(&aggregates, now).await;

    Ok(Analysis {
        narrative,
        generated_at: now,
        aggregates,
    })
}
