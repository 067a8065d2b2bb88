//! Prompt assembly for the completion service.

use super::aggregator::{top_species, TOP_SPECIES_LIMIT};
use crate::models::PeriodAggregate;

/// System-role instruction sent with every analysis request.
pub const SYSTEM_PROMPT: &str = "You are an expert in airport wildlife hazard management and \
ornithology. You analyze bird and wildlife activity data for an airport on the Mediterranean \
coast and write clear, actionable reports for operations staff. Be specific, reference the \
numbers you are given, and keep recommendations practical.";

const INSTRUCTIONS: &str = "\
Based on the data above, provide:
1. TREND ANALYSIS: How is wildlife activity changing across the periods? Compare short-term and long-term figures.
2. SEASONAL PATTERNS: Which seasonal or migratory patterns are visible for the recorded species?
3. RISK ASSESSMENT: What is the current bird strike risk level and which species drive it?
4. RECOMMENDATIONS: Concrete actions for the wildlife control team for the coming days.
5. PREDICTIONS: What activity should be expected over the next 7 to 30 days?

Take into account the airport's coastal Mediterranean setting: gulls and other seabirds, \
migratory passage in spring and autumn, and the dry summer and wet winter climate.";

/// Render one labeled block for a period.
fn period_block(aggregate: &PeriodAggregate) -> String {
    let mut block = String::new();

    block.push_str(&format!("=== {} ===\n", aggregate.period_name.to_uppercase()));
    block.push_str(&format!("Sightings: {}\n", aggregate.sightings.len()));
    block.push_str(&format!("Hazard reports: {}\n", aggregate.hazards.len()));
    block.push_str(&format!("Tasks: {}\n", aggregate.tasks.len()));

    let top = top_species(&aggregate.species_frequency, TOP_SPECIES_LIMIT);
    let top_line = if top.is_empty() {
        "none".to_string()
    } else {
        top.iter()
            .map(|(species, count)| format!("{} ({})", species, count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    block.push_str(&format!("Top species: {}\n", top_line));

    let severity_line = if aggregate.severity_frequency.is_empty() {
        "none".to_string()
    } else {
        aggregate
            .severity_frequency
            .iter()
            .map(|(severity, count)| format!("{}: {}", severity, count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    block.push_str(&format!("Severity: {}\n", severity_line));

    block
}

/// Serialize every period, in order, followed by the analysis instructions.
pub fn build_prompt(aggregates: &[PeriodAggregate]) -> String {
    let mut prompt = String::new();

    prompt.push_str("Analyze the following airport wildlife hazard data across multiple time periods.\n\n");

    for aggregate in aggregates {
        prompt.push_str(&period_block(aggregate));
        prompt.push('\n');
    }

    prompt.push_str(INSTRUCTIONS);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::build_aggregate;
    use crate::models::{Severity, Sighting, Task};
    use chrono::Utc;

    fn sighting(species: &str, severity: Severity) -> Sighting {
        Sighting {
            species: species.to_string(),
            severity,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_period_block_layout() {
        let aggregate = build_aggregate(
            "week",
            vec![
                sighting("galeb", Severity::High),
                sighting("galeb", Severity::High),
                sighting("lastavica", Severity::Low),
            ],
            vec![],
            vec![Task {
                created_at: Utc::now(),
            }],
            vec![],
        );

        assert_eq!(
            period_block(&aggregate),
            "=== WEEK ===\n\
             Sightings: 3\n\
             Hazard reports: 0\n\
             Tasks: 1\n\
             Top species: galeb (2), lastavica (1)\n\
             Severity: high: 2, low: 1\n"
        );
    }

    #[test]
    fn test_empty_period_block() {
        let block = period_block(&PeriodAggregate::empty("half_year"));
        assert!(block.starts_with("=== HALF_YEAR ===\n"));
        assert!(block.contains("Top species: none\n"));
        assert!(block.contains("Severity: none\n"));
    }

    #[test]
    fn test_only_three_species_surfaced() {
        let sightings = ["a", "b", "c", "d", "d"]
            .iter()
            .map(|s| sighting(s, Severity::Low))
            .collect();
        let aggregate = build_aggregate("month", sightings, vec![], vec![], vec![]);

        let block = period_block(&aggregate);
        assert!(block.contains("Top species: d (2), a (1), b (1)\n"));
        assert!(!block.contains("c (1)"));
    }

    #[test]
    fn test_prompt_order_and_instructions() {
        let aggregates = vec![
            PeriodAggregate::empty("two_days"),
            PeriodAggregate::empty("week"),
            PeriodAggregate::empty("year"),
        ];
        let prompt = build_prompt(&aggregates);

        let two_days = prompt.find("=== TWO_DAYS ===").unwrap();
        let week = prompt.find("=== WEEK ===").unwrap();
        let year = prompt.find("=== YEAR ===").unwrap();
        assert!(two_days < week && week < year);

        for heading in [
            "TREND ANALYSIS",
            "SEASONAL PATTERNS",
            "RISK ASSESSMENT",
            "RECOMMENDATIONS",
            "PREDICTIONS",
        ] {
            assert!(prompt.find(heading).unwrap() > year);
        }
        assert!(prompt.contains("Mediterranean"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let aggregates = vec![build_aggregate(
            "month",
            vec![sighting("vrana", Severity::Medium)],
            vec![],
            vec![],
            vec![],
        )];
        assert_eq!(build_prompt(&aggregates), build_prompt(&aggregates));
    }
}
