//! Markdown and JSON report generation.
//!
//! This module renders a finished analysis for the one-shot CLI mode.

use crate::analysis::aggregator::{top_species, TOP_SPECIES_LIMIT};
use crate::models::{Analysis, FetchFailure, NarrativeSource, PeriodAggregate};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(analysis: &Analysis, model: Option<&str>) -> String {
    let mut output = String::new();

    output.push_str("# Wildlife Hazard Analysis\n\n");
    output.push_str(&generate_metadata_section(analysis, model));
    output.push_str(&generate_periods_section(&analysis.aggregates));
    output.push_str(&generate_failures_section(&analysis.fetch_failures()));
    output.push_str(&generate_narrative_section(&analysis.narrative.text));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(analysis: &Analysis, model: Option<&str>) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        analysis.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let source = match (analysis.narrative.source, model) {
        (NarrativeSource::Ai, Some(model)) => format!("AI (`{}`)", model),
        (NarrativeSource::Ai, None) => "AI".to_string(),
        (NarrativeSource::Fallback, _) => "Automated summary (AI unavailable)".to_string(),
    };
    section.push_str(&format!("- **Analysis Source:** {}\n", source));
    section.push_str(&format!("- **Periods:** {}\n", analysis.aggregates.len()));
    section.push('\n');

    section
}

/// Generate the per-period overview table.
fn generate_periods_section(aggregates: &[PeriodAggregate]) -> String {
    let mut section = String::new();

    section.push_str("## Activity by Period\n\n");
    section.push_str("| Period | Sightings | Species | Hazards | Tasks | Top Species |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---|\n");

    for agg in aggregates {
        let top = top_species(&agg.species_frequency, TOP_SPECIES_LIMIT);
        let top = if top.is_empty() {
            "-".to_string()
        } else {
            top.iter()
                .map(|(species, count)| format!("{} ({})", species, count))
                .collect::<Vec<_>>()
                .join(", ")
        };

        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            agg.period_name,
            agg.sightings.len(),
            agg.species_frequency.len(),
            agg.hazards.len(),
            agg.tasks.len(),
            top
        ));
    }
    section.push('\n');

    section
}

/// Generate the warning block for queries that returned no data.
fn generate_failures_section(failures: &[FetchFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Data Warnings\n\n");
    section.push_str("The following queries failed and were counted as empty:\n\n");
    for failure in failures {
        section.push_str(&format!("- `{}` / {}\n", failure.period, failure.kind));
    }
    section.push('\n');

    section
}

/// Generate the narrative section.
fn generate_narrative_section(narrative: &str) -> String {
    let mut section = String::new();

    section.push_str("## Analysis\n\n");
    section.push_str(narrative.trim_end());
    section.push_str("\n\n");

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by HazardWatch*\n".to_string()
}

/// Generate a JSON report in the API result shape.
pub fn generate_json_report(analysis: &Analysis) -> Result<String> {
    serde_json::to_string_pretty(&analysis.response()).map_err(Into::into)
}
