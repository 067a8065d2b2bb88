//! Templated analysis used when the completion service is unavailable.
//!
//! Everything here is pure: the summary depends only on the aggregates,
//! the calendar month and the trend threshold.

use super::aggregator::{top_species, TOP_SPECIES_LIMIT};
use crate::models::PeriodAggregate;
use std::fmt;

/// Meteorological season of the northern hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Map a calendar month (1-12) to its season. Out-of-range values count as winter.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    /// Closing note for operations staff.
    pub fn note(&self) -> &'static str {
        match self {
            Season::Spring => {
                "Spring migration is under way. Expect heavier passage of swallows, raptors \
                 and waders, especially after southerly winds."
            }
            Season::Summer => {
                "Summer heat draws gulls to warm runway surfaces and nearby water. Watch for \
                 recently fledged birds that are inexperienced around aircraft."
            }
            Season::Autumn => {
                "Autumn migration brings large flocks moving south along the coast. Starlings \
                 and gulls gather in numbers on open grassland."
            }
            Season::Winter => {
                "Winter rains attract gulls and waders to waterlogged ground. Check drainage \
                 and standing water near the runways."
            }
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Autumn => write!(f, "autumn"),
            Season::Winter => write!(f, "winter"),
        }
    }
}

/// Actions listed in every templated summary.
const RECOMMENDED_ACTIONS: [&str; 3] = [
    "Keep regular runway and approach inspections, with extra patrols at dawn and dusk.",
    "Keep dispersal equipment (pyrotechnics, distress calls, lasers) checked and ready.",
    "Log every sighting promptly so that trends stay accurate.",
];

fn find<'a>(aggregates: &'a [PeriodAggregate], name: &str) -> Option<&'a PeriodAggregate> {
    aggregates.iter().find(|agg| agg.period_name == name)
}

/// Render the templated summary from the week and month aggregates.
///
/// Missing windows are treated as empty.
pub fn deterministic_summary(aggregates: &[PeriodAggregate], month: u32, threshold: usize) -> String {
    let empty_week = PeriodAggregate::empty("week");
    let empty_month = PeriodAggregate::empty("month");
    let week = find(aggregates, "week").unwrap_or(&empty_week);
    let last_month = find(aggregates, "month").unwrap_or(&empty_month);

    let month_sightings = last_month.sightings.len();
    let season = Season::from_month(month);

    let mut text = String::new();

    text.push_str("WILDLIFE HAZARD ANALYSIS (automated summary)\n\n");

    text.push_str("Current status:\n");
    text.push_str(&format!(
        "- Sightings in the last 7 days: {}\n",
        week.sightings.len()
    ));
    text.push_str(&format!(
        "- Sightings in the last 30 days: {}\n",
        month_sightings
    ));
    text.push_str(&format!(
        "- Hazard reports in the last 30 days: {}\n",
        last_month.hazards.len()
    ));
    text.push_str(&format!(
        "- Tasks created in the last 30 days: {}\n",
        last_month.tasks.len()
    ));

    let top = top_species(&last_month.species_frequency, TOP_SPECIES_LIMIT);
    let top_line = if top.is_empty() {
        "none recorded".to_string()
    } else {
        top.iter()
            .map(|(species, count)| format!("{} ({})", species, count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    text.push_str(&format!(
        "- Most observed species in the last 30 days: {}\n\n",
        top_line
    ));

    if month_sightings > threshold {
        text.push_str(&format!(
            "Trend: increased activity. {} sightings in the last 30 days is above the \
             threshold of {}.\n\n",
            month_sightings, threshold
        ));
    } else {
        text.push_str(&format!(
            "Trend: stable activity. {} sightings in the last 30 days is within the \
             threshold of {}.\n\n",
            month_sightings, threshold
        ));
    }

    text.push_str("Recommended actions:\n");
    for (i, action) in RECOMMENDED_ACTIONS.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, action));
    }
    text.push('\n');

    text.push_str(&format!("Seasonal note ({}): {}\n", season, season.note()));

    text
}
