//! Per-period statistics.
//!
//! This module reduces the sightings of a window to species and
//! severity frequency tables and assembles the window's aggregate.

use crate::models::{
    FrequencyTable, HazardReport, PeriodAggregate, RecordKind, Severity, Sighting, Task,
};

/// Number of species surfaced per period in the prompt and reports.
pub const TOP_SPECIES_LIMIT: usize = 3;

/// Count sightings per species, in encounter order.
pub fn species_frequency(sightings: &[Sighting]) -> FrequencyTable<String> {
    sightings.iter().map(|s| s.species.clone()).collect()
}

/// Count sightings per severity level, in encounter order.
pub fn severity_frequency(sightings: &[Sighting]) -> FrequencyTable<Severity> {
    sightings.iter().map(|s| s.severity).collect()
}

/// The `limit` most observed species. Ties keep encounter order.
pub fn top_species(frequency: &FrequencyTable<String>, limit: usize) -> Vec<(String, usize)> {
    frequency.top(limit)
}

/// Build the aggregate for one window from its fetched records.
pub fn build_aggregate(
    period_name: &str,
    sightings: Vec<Sighting>,
    hazards: Vec<HazardReport>,
    tasks: Vec<Task>,
    failed: Vec<RecordKind>,
) -> PeriodAggregate {
    let species = species_frequency(&sightings);
    let severity = severity_frequency(&sightings);

    PeriodAggregate {
        period_name: period_name.to_string(),
        sightings,
        hazards,
        tasks,
        species_frequency: species,
        severity_frequency: severity,
        failed,
    }
}
