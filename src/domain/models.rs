use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::timing;

/// Group name for swims whose meet was not reported
pub const UNKNOWN_MEET: &str = "Unknown Meet";

/// Pool length / unit classification of a swim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum CourseType {
    #[serde(rename = "SCY")]
    Scy,
    #[serde(rename = "SCM")]
    Scm,
    #[serde(rename = "LCM")]
    Lcm,
    #[default]
    Unknown,
}

impl CourseType {
    pub fn as_str(&self) -> &str {
        match self {
            CourseType::Scy => "SCY",
            CourseType::Scm => "SCM",
            CourseType::Lcm => "LCM",
            CourseType::Unknown => "Unknown",
        }
    }
}

impl From<String> for CourseType {
    fn from(value: String) -> Self {
        match value.trim().to_uppercase().as_str() {
            "SCY" => CourseType::Scy,
            "SCM" => CourseType::Scm,
            "LCM" => CourseType::Lcm,
            _ => CourseType::Unknown,
        }
    }
}

/// Swimmer identity as supplied alongside the results list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwimmerIdentity {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub team: Option<String>,
}

/// One race as produced by a results supplier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub event: String,
    pub time: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub meet: String,
    #[serde(default)]
    pub course_type: CourseType,
    #[serde(default)]
    pub place: Option<u32>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Supplier output: who swam, and what they swam
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedResults {
    pub swimmer: SwimmerIdentity,
    #[serde(default)]
    pub results: Vec<RaceResult>,
}

/// A race result after time and date normalization.
///
/// This is the only shape the pipeline works with downstream of ingestion;
/// `seconds` is NaN and `swum_on` is `None` when the raw values could not be
/// parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    pub event: String,
    pub time: String,
    pub date: String,
    pub meet: String,
    pub course_type: CourseType,
    pub place: Option<u32>,
    pub age: Option<u32>,
    pub age_group: Option<String>,
    pub club: Option<String>,
    pub location: Option<String>,
    pub seconds: f64,
    pub swum_on: Option<NaiveDate>,
}

impl NormalizedResult {
    pub fn from_raw(raw: &RaceResult) -> Self {
        Self {
            event: raw.event.trim().to_string(),
            time: raw.time.trim().to_string(),
            date: raw.date.trim().to_string(),
            meet: raw.meet.trim().to_string(),
            course_type: raw.course_type,
            place: raw.place.filter(|p| *p > 0),
            age: raw.age,
            age_group: non_blank(raw.age_group.as_deref()),
            club: non_blank(raw.club.as_deref()),
            location: non_blank(raw.location.as_deref()),
            seconds: timing::parse_to_seconds(&raw.time),
            swum_on: timing::parse_date(&raw.date),
        }
    }

    pub fn has_valid_time(&self) -> bool {
        self.seconds.is_finite()
    }

    pub fn meet_name(&self) -> &str {
        if self.meet.is_empty() {
            UNKNOWN_MEET
        } else {
            &self.meet
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// --- Analysis Output Structures ---

/// Fastest swim of an event within some partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestTime {
    pub event: String,
    pub time: String,
    pub date: String,
    pub meet: String,
    pub course_type: CourseType,
    pub seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceTrend {
    pub event: String,
    pub times: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetResult {
    pub event: String,
    pub place: Option<u32>,
    pub time: String,
    pub improvement: String,
    pub age_group: String,
    pub course_type: CourseType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetSummary {
    pub name: String,
    pub date: String,
    pub location: String,
    pub results: Vec<MeetResult>,
    pub total_events: usize,
    pub average_place: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub event: String,
    pub improvement: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGroupImprovement {
    pub event: String,
    pub improvement: String,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubInfo {
    pub name: String,
    pub years: String,
    pub meets: usize,
    pub events: usize,
    pub best_times: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInsights {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub total_events: usize,
    pub total_points: u32,
    pub average_place: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwimmerPerformance {
    pub name: String,
    pub age: u32,
    pub total_meets: usize,
    pub total_events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceData {
    pub best_times: Vec<BestTime>,
    pub recent_times: Vec<PerformanceTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetBreakdown {
    pub meets: Vec<MeetSummary>,
    pub current_meet: Option<MeetSummary>,
    pub all_time_improvements: Vec<Improvement>,
    pub age_group_improvements: BTreeMap<String, Vec<AgeGroupImprovement>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBests {
    pub all_time: Vec<BestTime>,
    pub by_age_group: BTreeMap<String, Vec<BestTime>>,
}

/// Everything the presentation layer needs about one swimmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub swimmer: SwimmerPerformance,
    pub performance: PerformanceData,
    pub meet_breakdown: MeetBreakdown,
    pub personal_bests: PersonalBests,
    pub clubs: Vec<ClubInfo>,
    pub summary: PerformanceSummary,
    pub insights: PerformanceInsights,
    pub event_distribution: BTreeMap<String, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_type_deserializes_unknown_values() {
        let course: CourseType = serde_json::from_str("\"scm\"").unwrap();
        assert_eq!(course, CourseType::Scm);

        let course: CourseType = serde_json::from_str("\"Mixed\"").unwrap();
        assert_eq!(course, CourseType::Unknown);

        assert_eq!(serde_json::to_string(&CourseType::Lcm).unwrap(), "\"LCM\"");
    }

    #[test]
    fn test_race_result_defaults_missing_fields() {
        let json = r#"{"event": "50 Free", "time": "23.45"}"#;
        let result: RaceResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.meet, "");
        assert_eq!(result.course_type, CourseType::Unknown);
        assert_eq!(result.place, None);
    }

    #[test]
    fn test_normalization_trims_and_parses() {
        let raw = RaceResult {
            event: " 100 Free ".to_string(),
            time: "1:05.30".to_string(),
            date: "2023-06-01".to_string(),
            meet: "  ".to_string(),
            club: Some(" ".to_string()),
            place: Some(0),
            ..Default::default()
        };

        let normalized = NormalizedResult::from_raw(&raw);

        assert_eq!(normalized.event, "100 Free");
        assert_eq!(normalized.meet, "");
        assert_eq!(normalized.club, None);
        assert_eq!(normalized.place, None);
        assert!((normalized.seconds - 65.30).abs() < 1e-9);
        assert_eq!(normalized.swum_on, NaiveDate::from_ymd_opt(2023, 6, 1));
    }

    #[test]
    fn test_normalization_keeps_unparsable_rows() {
        let raw = RaceResult {
            event: "50 Fly".to_string(),
            time: "DQ".to_string(),
            date: "someday".to_string(),
            ..Default::default()
        };

        let normalized = NormalizedResult::from_raw(&raw);

        assert!(!normalized.has_valid_time());
        assert_eq!(normalized.swum_on, None);
    }
}
