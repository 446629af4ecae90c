use chrono::NaiveDate;
use std::collections::HashMap;

use crate::analysis::reducer::ImprovementBaseline;
use crate::analysis::timing::parse_date;
use crate::domain::{MeetResult, MeetSummary, NormalizedResult};

/// Group swims by meet name, preserving the order meets first appear in.
///
/// Every input row lands in exactly one group, including rows whose time
/// could not be parsed; a blank meet name falls into the "Unknown Meet" group.
pub fn group_by_meet<F>(
    results: &[NormalizedResult],
    baseline: &ImprovementBaseline,
    age_group_of: F,
) -> Vec<MeetSummary>
where
    F: Fn(&NormalizedResult) -> String,
{
    let mut groups: Vec<MeetGroup> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for result in results {
        let slot = *slots.entry(result.meet_name()).or_insert_with(|| {
            groups.push(MeetGroup::open(result));
            groups.len() - 1
        });

        groups[slot].add(result, MeetResult {
            event: result.event.clone(),
            place: result.place,
            time: result.time.clone(),
            improvement: baseline.improvement(result),
            age_group: age_group_of(result),
            course_type: result.course_type,
        });
    }

    groups.into_iter().map(MeetGroup::close).collect()
}

struct MeetGroup {
    name: String,
    date: String,
    location: String,
    results: Vec<MeetResult>,
    place_total: u64,
    placed: u32,
}

impl MeetGroup {
    fn open(first: &NormalizedResult) -> Self {
        Self {
            name: first.meet_name().to_string(),
            date: first.date.clone(),
            location: first.location.clone().unwrap_or_default(),
            results: Vec::new(),
            place_total: 0,
            placed: 0,
        }
    }

    fn add(&mut self, result: &NormalizedResult, entry: MeetResult) {
        if let Some(place) = result.place {
            self.place_total += u64::from(place);
            self.placed += 1;
        }
        self.results.push(entry);
    }

    fn close(self) -> MeetSummary {
        let average_place = if self.placed == 0 {
            0.0
        } else {
            self.place_total as f64 / f64::from(self.placed)
        };

        MeetSummary {
            name: self.name,
            date: self.date,
            location: self.location,
            total_events: self.results.len(),
            results: self.results,
            average_place,
        }
    }
}

/// The meet with the latest parsable date; earlier listing wins ties
pub fn current_meet(meets: &[MeetSummary]) -> Option<MeetSummary> {
    let mut latest: Option<(&MeetSummary, NaiveDate)> = None;

    for meet in meets {
        let Some(date) = parse_date(&meet.date) else {
            continue;
        };
        if latest.is_none_or(|(_, best)| date > best) {
            latest = Some((meet, date));
        }
    }

    latest.map(|(meet, _)| meet.clone())
}
