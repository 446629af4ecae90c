use log::debug;

use crate::analysis::{age_group, clubs, insights, meets, personal_bests, reducer};
use crate::config::AnalysisSettings;
use crate::domain::{
    AnalysisResult, MeetBreakdown, NormalizedResult, PerformanceData, PerformanceSummary,
    PersonalBests, RaceResult, SwimmerIdentity, SwimmerPerformance,
};

/// Highest place that still earns points
const SCORING_PLACES: u32 = 10;

/// Run the full analysis pipeline over one swimmer's results.
///
/// Every row is kept: rows with unparsable times drop out of the
/// time-ordered views but still count towards meets and totals.
pub fn analyze(
    raw_results: &[RaceResult],
    swimmer: &SwimmerIdentity,
    settings: &AnalysisSettings,
) -> AnalysisResult {
    let results: Vec<NormalizedResult> = raw_results.iter().map(NormalizedResult::from_raw).collect();
    let unparsable = results.iter().filter(|r| !r.has_valid_time()).count();
    debug!(
        "Analyzing {} results for {} ({} without a valid time)",
        results.len(),
        swimmer.name,
        unparsable
    );

    let age_group_of = |result: &NormalizedResult| swim_age_group(result, swimmer);
    let baseline = reducer::ImprovementBaseline::new(&results);

    let meets = meets::group_by_meet(&results, &baseline, age_group_of);
    let current_meet = meets::current_meet(&meets);

    AnalysisResult {
        swimmer: SwimmerPerformance {
            name: swimmer.name.clone(),
            age: swimmer_age(&results, swimmer),
            total_meets: meets.len(),
            total_events: results.len(),
        },
        performance: PerformanceData {
            best_times: reducer::best_times(&results),
            recent_times: reducer::recent_times(&results, settings.recent_per_event),
        },
        meet_breakdown: MeetBreakdown {
            all_time_improvements: reducer::all_time_improvements(
                &results,
                &baseline,
                settings.improvements_limit,
            ),
            age_group_improvements: reducer::age_group_improvements(
                &results,
                &baseline,
                age_group_of,
                settings.age_group_improvements_limit,
            ),
            meets,
            current_meet,
        },
        personal_bests: PersonalBests {
            all_time: personal_bests::all_time(&results),
            by_age_group: personal_bests::by_age_group(&results, age_group_of),
        },
        clubs: clubs::summarize(&results),
        summary: summarize(&results),
        insights: insights::generate(&results),
        event_distribution: reducer::event_distribution(&results),
    }
}

/// Age group active when the race was swum
fn swim_age_group(result: &NormalizedResult, swimmer: &SwimmerIdentity) -> String {
    if let Some(group) = &result.age_group {
        return group.clone();
    }

    match result.age.or(swimmer.age) {
        Some(age) => age_group::resolve(age),
        None => age_group::UNKNOWN_GROUP.to_string(),
    }
}

fn swimmer_age(results: &[NormalizedResult], swimmer: &SwimmerIdentity) -> u32 {
    swimmer
        .age
        .or_else(|| results.iter().filter_map(|r| r.age).max())
        .unwrap_or(0)
}

fn summarize(results: &[NormalizedResult]) -> PerformanceSummary {
    let places: Vec<u32> = results.iter().filter_map(|r| r.place).collect();

    let total_points = places
        .iter()
        .filter(|place| **place <= SCORING_PLACES)
        .map(|place| SCORING_PLACES - place)
        .sum();

    let average_place = if places.is_empty() {
        0.0
    } else {
        places.iter().map(|p| f64::from(*p)).sum::<f64>() / places.len() as f64
    };

    PerformanceSummary {
        total_events: results.len(),
        total_points,
        average_place,
    }
}
