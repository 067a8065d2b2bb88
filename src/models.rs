//! Data models for wildlife hazard analytics.
//!
//! This module contains the record types read from the store, the
//! per-period aggregates built from them, and the result shape handed
//! back to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Severity level of a wildlife sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low severity - birds far from runways, no action needed
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    /// Medium severity - activity near movement areas
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    /// High severity - flocks near active runways
    #[serde(alias = "High", alias = "HIGH")]
    High,
    /// Critical severity - immediate strike risk
    #[serde(alias = "Critical", alias = "CRITICAL")]
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A logged wildlife observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// Species name as entered by staff.
    pub species: String,
    /// Assessed hazard severity.
    pub severity: Severity,
    /// When the sighting was logged.
    pub created_at: DateTime<Utc>,
}

/// A logged safety concern not tied to a specific sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardReport {
    pub created_at: DateTime<Utc>,
}

/// A work item created by operations staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub created_at: DateTime<Utc>,
}

/// The three record collections read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Sightings,
    Hazards,
    Tasks,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Sightings => write!(f, "sightings"),
            RecordKind::Hazards => write!(f, "hazards"),
            RecordKind::Tasks => write!(f, "tasks"),
        }
    }
}

/// Occurrence counter that remembers the order keys were first seen.
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    entries: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> FrequencyTable<K> {
    /// Count one occurrence of `key`.
    pub fn record(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// Occurrence count for `key` (0 if never seen).
    #[cfg(test)]
    pub fn get(&self, key: &K) -> usize {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(k, c)| (k, *c))
    }

    /// Entries ranked by count, highest first. Ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(K, usize)> {
        let mut ranked = self.entries.clone();
        // sort_by_key is stable
        ranked.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        ranked
    }

    /// The `n` most frequent entries.
    pub fn top(&self, n: usize) -> Vec<(K, usize)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

impl<K: Clone + Eq + Hash> FromIterator<K> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut table = Self::default();
        for key in iter {
            table.record(key);
        }
        table
    }
}

/// A store query that failed and was replaced by an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub period: String,
    pub kind: RecordKind,
}

/// Everything gathered and computed for one lookback window.
#[derive(Debug, Clone)]
pub struct PeriodAggregate {
    pub period_name: String,
    pub sightings: Vec<Sighting>,
    pub hazards: Vec<HazardReport>,
    pub tasks: Vec<Task>,
    pub species_frequency: FrequencyTable<String>,
    pub severity_frequency: FrequencyTable<Severity>,
    /// Record kinds whose query failed for this window.
    pub failed: Vec<RecordKind>,
}

impl PeriodAggregate {
    /// An aggregate with no records, used when a window is missing.
    pub fn empty(period_name: &str) -> Self {
        Self {
            period_name: period_name.to_string(),
            sightings: Vec::new(),
            hazards: Vec::new(),
            tasks: Vec::new(),
            species_frequency: FrequencyTable::default(),
            severity_frequency: FrequencyTable::default(),
            failed: Vec::new(),
        }
    }
}

/// Where a narrative came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
    /// Produced by the completion service.
    Ai,
    /// Produced by the fixed template.
    Fallback,
}

/// Narrative text plus its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    pub text: String,
    pub source: NarrativeSource,
}

/// A finished analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub narrative: Narrative,
    pub generated_at: DateTime<Utc>,
    pub aggregates: Vec<PeriodAggregate>,
}

impl Analysis {
    /// All store queries that were substituted with empty lists.
    pub fn fetch_failures(&self) -> Vec<FetchFailure> {
        self.aggregates
            .iter()
            .flat_map(|agg| {
                agg.failed.iter().map(move |kind| FetchFailure {
                    period: agg.period_name.clone(),
                    kind: *kind,
                })
            })
            .collect()
    }

    /// Caller-facing result shape.
    pub fn response(&self) -> AnalysisResponse {
        AnalysisResponse {
            analysis: self.narrative.text.clone(),
            generated_at: self.generated_at,
            periods: self
                .aggregates
                .iter()
                .map(|agg| agg.period_name.clone())
                .collect(),
            ai_generated: self.narrative.source == NarrativeSource::Ai,
            fetch_failures: self.fetch_failures(),
        }
    }
}

/// Result returned to HTTP and JSON consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Narrative text, AI-generated or templated.
    pub analysis: String,
    pub generated_at: DateTime<Utc>,
    /// Period tags in declaration order.
    pub periods: Vec<String>,
    /// False when the deterministic summary was used.
    pub ai_generated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fetch_failures: Vec<FetchFailure>,
}
