use std::collections::BTreeMap;

use crate::analysis::reducer::best_times;
use crate::domain::{BestTime, NormalizedResult};

/// Fastest swim per event across every course type
pub fn all_time(results: &[NormalizedResult]) -> Vec<BestTime> {
    best_times(results)
}

/// Fastest swim per event within each age group.
///
/// Results are partitioned by the age group active when the race was swum
/// before reducing, so a best from one bracket never shows up in another.
pub fn by_age_group<F>(results: &[NormalizedResult], age_group_of: F) -> BTreeMap<String, Vec<BestTime>>
where
    F: Fn(&NormalizedResult) -> String,
{
    let mut partitions: BTreeMap<String, Vec<&NormalizedResult>> = BTreeMap::new();
    for result in results {
        partitions.entry(age_group_of(result)).or_default().push(result);
    }

    partitions
        .into_iter()
        .map(|(group, swims)| (group, best_times(swims)))
        .filter(|(_, bests)| !bests.is_empty())
        .collect()
}
