use std::collections::HashSet;

use crate::analysis::reducer::StrokeCategory;
use crate::domain::{NormalizedResult, PerformanceInsights};

const PODIUM_PLACE: u32 = 3;
const WEAK_PLACE: u32 = 8;
const MIN_HISTORY: usize = 5;

/// Rule-based feedback derived from places and event mix.
///
/// A swimmer with no results gets no feedback at all.
pub fn generate(results: &[NormalizedResult]) -> PerformanceInsights {
    let mut insights = PerformanceInsights::default();
    if results.is_empty() {
        return insights;
    }

    let freestyle = results
        .iter()
        .filter(|r| StrokeCategory::classify(&r.event) == Some(StrokeCategory::Freestyle))
        .count();
    if freestyle * 2 > results.len() {
        push_unique(&mut insights.strengths, "Strong performance in freestyle events".to_string());
    }

    for result in results {
        match result.place {
            Some(place) if place <= PODIUM_PLACE => push_unique(
                &mut insights.strengths,
                format!("Excellent performance in {}", result.event),
            ),
            Some(place) if place >= WEAK_PLACE => push_unique(
                &mut insights.improvements,
                format!("Room for improvement in {}", result.event),
            ),
            _ => {}
        }
    }

    let swum: HashSet<StrokeCategory> = results
        .iter()
        .filter_map(|r| StrokeCategory::classify(&r.event))
        .collect();
    for category in StrokeCategory::ALL {
        if !swum.contains(&category) {
            insights
                .recommendations
                .push(format!("Add {} events to round out your program", category.label()));
        }
    }

    if results.len() < MIN_HISTORY {
        insights
            .recommendations
            .push("Keep racing to build a longer performance history".to_string());
    }

    insights
}

fn push_unique(list: &mut Vec<String>, entry: String) {
    if !list.contains(&entry) {
        list.push(entry);
    }
}
