use chrono::Datelike;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::{ClubInfo, NormalizedResult};

#[derive(Default)]
struct ClubTally<'a> {
    events: usize,
    meets: HashSet<&'a str>,
    distinct_events: HashSet<&'a str>,
    years: BTreeSet<i32>,
}

/// Per-club activity counts, in the order clubs first appear
pub fn summarize(results: &[NormalizedResult]) -> Vec<ClubInfo> {
    let mut names: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, ClubTally> = HashMap::new();

    for result in results {
        let Some(club) = result.club.as_deref() else {
            continue;
        };

        let tally = tallies.entry(club).or_insert_with(|| {
            names.push(club);
            ClubTally::default()
        });
        tally.events += 1;
        tally.meets.insert(result.meet_name());
        tally.distinct_events.insert(result.event.as_str());
        if let Some(date) = result.swum_on {
            tally.years.insert(date.year());
        }
    }

    names
        .into_iter()
        .filter_map(|name| {
            let tally = tallies.remove(name)?;
            Some(ClubInfo {
                name: name.to_string(),
                years: year_span(&tally.years),
                meets: tally.meets.len(),
                events: tally.events,
                best_times: tally.distinct_events.len(),
            })
        })
        .collect()
}

fn year_span(years: &BTreeSet<i32>) -> String {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => String::new(),
    }
}
