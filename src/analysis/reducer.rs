use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::analysis::timing::{format_from_seconds, format_improvement};
use crate::domain::{AgeGroupImprovement, BestTime, Improvement, NormalizedResult, PerformanceTrend};

pub const NO_IMPROVEMENT: &str = "0.0s";

/// Stroke buckets used for the event distribution chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeCategory {
    Freestyle,
    Backstroke,
    Breaststroke,
    Butterfly,
    IndividualMedley,
}

impl StrokeCategory {
    pub const ALL: [StrokeCategory; 5] = [
        StrokeCategory::Freestyle,
        StrokeCategory::Backstroke,
        StrokeCategory::Breaststroke,
        StrokeCategory::Butterfly,
        StrokeCategory::IndividualMedley,
    ];

    /// Classify an event name; the first matching stroke wins
    pub fn classify(event: &str) -> Option<Self> {
        let lower = event.to_lowercase();

        if lower.contains("free") {
            Some(StrokeCategory::Freestyle)
        } else if lower.contains("back") {
            Some(StrokeCategory::Backstroke)
        } else if lower.contains("breast") {
            Some(StrokeCategory::Breaststroke)
        } else if lower.contains("fly") || lower.contains("butterfly") {
            Some(StrokeCategory::Butterfly)
        } else if lower.contains("im") || lower.contains("medley") {
            Some(StrokeCategory::IndividualMedley)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrokeCategory::Freestyle => "Freestyle",
            StrokeCategory::Backstroke => "Backstroke",
            StrokeCategory::Breaststroke => "Breaststroke",
            StrokeCategory::Butterfly => "Butterfly",
            StrokeCategory::IndividualMedley => "Individual Medley",
        }
    }
}

/// Fastest valid swim per event, in order of first appearance.
///
/// Ties keep the earlier entry. Swims without a parsable time never win.
pub fn best_times<'a, I>(results: I) -> Vec<BestTime>
where
    I: IntoIterator<Item = &'a NormalizedResult>,
{
    let mut winners: Vec<&NormalizedResult> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for result in results {
        if !result.has_valid_time() {
            continue;
        }

        match slots.get(result.event.as_str()) {
            Some(&slot) => {
                if result.seconds < winners[slot].seconds {
                    winners[slot] = result;
                }
            }
            None => {
                slots.insert(result.event.as_str(), winners.len());
                winners.push(result);
            }
        }
    }

    winners.into_iter().map(to_best_time).collect()
}

fn to_best_time(result: &NormalizedResult) -> BestTime {
    BestTime {
        event: result.event.clone(),
        time: format_from_seconds(result.seconds),
        date: result.date.clone(),
        meet: result.meet_name().to_string(),
        course_type: result.course_type,
        seconds: result.seconds,
    }
}

/// Sort key for "most recent first"; unparsable dates count as now
pub(crate) fn recency_key(result: &NormalizedResult) -> NaiveDate {
    result.swum_on.unwrap_or(NaiveDate::MAX)
}

/// The newest `max_per_event` valid times of every event, newest first
pub fn recent_times(results: &[NormalizedResult], max_per_event: usize) -> Vec<PerformanceTrend> {
    if max_per_event == 0 {
        return Vec::new();
    }

    let mut newest_first: Vec<&NormalizedResult> = results.iter().collect();
    newest_first.sort_by(|a, b| recency_key(b).cmp(&recency_key(a)));

    let mut trends: Vec<PerformanceTrend> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for result in newest_first {
        if !result.has_valid_time() {
            continue;
        }

        let slot = *slots.entry(result.event.as_str()).or_insert_with(|| {
            trends.push(PerformanceTrend {
                event: result.event.clone(),
                times: Vec::new(),
            });
            trends.len() - 1
        });

        let times = &mut trends[slot].times;
        if times.len() < max_per_event {
            times.push(result.seconds);
        }
    }

    trends
}

/// Count swims per stroke, leaving out strokes never swum
pub fn event_distribution(results: &[NormalizedResult]) -> BTreeMap<String, u32> {
    let mut distribution = BTreeMap::new();

    for category in results.iter().filter_map(|r| StrokeCategory::classify(&r.event)) {
        *distribution.entry(category.label().to_string()).or_insert(0) += 1;
    }

    distribution
}

/// Previous-best lookup used to express each swim as a time delta.
///
/// The baseline of a swim is the fastest valid time in the same event on a
/// strictly earlier date. Delta is `baseline - current`, so a positive value
/// means the swimmer got faster.
pub struct ImprovementBaseline<'a> {
    by_event: HashMap<&'a str, Vec<(NaiveDate, f64)>>,
}

impl<'a> ImprovementBaseline<'a> {
    pub fn new(results: &'a [NormalizedResult]) -> Self {
        let mut by_event: HashMap<&'a str, Vec<(NaiveDate, f64)>> = HashMap::new();

        for result in results.iter().filter(|r| r.has_valid_time()) {
            by_event
                .entry(result.event.as_str())
                .or_default()
                .push((recency_key(result), result.seconds));
        }

        Self { by_event }
    }

    pub fn delta(&self, result: &NormalizedResult) -> Option<f64> {
        if !result.has_valid_time() {
            return None;
        }

        let swum_on = recency_key(result);
        let previous_best = self
            .by_event
            .get(result.event.as_str())?
            .iter()
            .filter(|(date, _)| *date < swum_on)
            .map(|(_, seconds)| *seconds)
            .reduce(f64::min)?;

        Some(previous_best - result.seconds)
    }

    pub fn improvement(&self, result: &NormalizedResult) -> String {
        self.delta(result)
            .map(format_improvement)
            .unwrap_or_else(|| NO_IMPROVEMENT.to_string())
    }
}

/// Improvements of the first `limit` swims in supplier order
pub fn all_time_improvements(
    results: &[NormalizedResult],
    baseline: &ImprovementBaseline,
    limit: usize,
) -> Vec<Improvement> {
    results
        .iter()
        .take(limit)
        .map(|result| Improvement {
            event: result.event.clone(),
            improvement: baseline.improvement(result),
            date: result.date.clone(),
        })
        .collect()
}

/// Improvements of the first `limit` swims within each age group
pub fn age_group_improvements<F>(
    results: &[NormalizedResult],
    baseline: &ImprovementBaseline,
    age_group_of: F,
    limit: usize,
) -> BTreeMap<String, Vec<AgeGroupImprovement>>
where
    F: Fn(&NormalizedResult) -> String,
{
    let mut groups: BTreeMap<String, Vec<AgeGroupImprovement>> = BTreeMap::new();

    for result in results {
        let entries = groups.entry(age_group_of(result)).or_default();
        if entries.len() < limit {
            entries.push(AgeGroupImprovement {
                event: result.event.clone(),
                improvement: baseline.improvement(result),
                rank: result.place,
            });
        }
    }

    groups
}
