// ABOUTME: Serde data models for Tasks Collector API responses
// ABOUTME: Tolerant parsing with optional fields and tagged event variants

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Paginated list envelope returned by every collection endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub id: u64,
    #[serde(default)]
    pub url: Option<String>,
    pub pub_date: NaiveDate,
    #[serde(default)]
    pub thread: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub situation: String,
    #[serde(default)]
    pub interpretation: Option<String>,
    #[serde(default)]
    pub approach: Option<String>,
    #[serde(default)]
    pub event_stream_id: Option<String>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub updates: Vec<ObservationUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationUpdate {
    #[serde(default)]
    pub id: Option<u64>,
    pub published: DateTime<FixedOffset>,
    #[serde(default)]
    pub comment: String,
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: String,
    pub tagname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalAdded {
    pub id: u64,
    pub published: DateTime<FixedOffset>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitTracked {
    pub id: u64,
    pub published: DateTime<FixedOffset>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "occured")]
    pub occurred: bool,
    pub habit: Habit,
}

/// Shared shape of every observation lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationEvent {
    pub id: u64,
    pub published: DateTime<FixedOffset>,
    pub event_stream_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub situation_at_creation: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ObservationEvent {
    /// Situation text as known when the event was recorded.
    pub fn situation_text(&self) -> &str {
        self.situation
            .as_deref()
            .or(self.situation_at_creation.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedOutcome {
    pub id: u64,
    pub published: DateTime<FixedOffset>,
    pub event_stream_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub old_name: Option<String>,
    #[serde(default)]
    pub resolved_by: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub old_resolved_by: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub new_resolved_by: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "resourcetype")]
pub enum Event {
    JournalAdded(JournalAdded),
    HabitTracked(HabitTracked),
    ObservationMade(ObservationEvent),
    ObservationUpdated(ObservationEvent),
    ObservationRecontextualized(ObservationEvent),
    ObservationReinterpreted(ObservationEvent),
    ObservationReflectedUpon(ObservationEvent),
    ObservationClosed(ObservationEvent),
    ProjectedOutcomeMade(ProjectedOutcome),
    ProjectedOutcomeRedefined(ProjectedOutcome),
    ProjectedOutcomeRescheduled(ProjectedOutcome),
    ProjectedOutcomeClosed(ProjectedOutcome),
    #[serde(other)]
    Unknown,
}

impl Event {
    pub fn as_observation(&self) -> Option<&ObservationEvent> {
        match self {
            Event::ObservationMade(e)
            | Event::ObservationUpdated(e)
            | Event::ObservationRecontextualized(e)
            | Event::ObservationReinterpreted(e)
            | Event::ObservationReflectedUpon(e)
            | Event::ObservationClosed(e) => Some(e),
            _ => None,
        }
    }
}

pub(crate) fn not_empty(text: Option<&str>) -> bool {
    matches!(text.map(str::trim), Some(t) if !t.is_empty() && t != "?")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: u64,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub want: Option<String>,
    pub pub_date: NaiveDate,
}

impl Plan {
    pub fn has_focus(&self) -> bool {
        not_empty(self.focus.as_deref())
    }

    pub fn has_want(&self) -> bool {
        not_empty(self.want.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        !self.has_focus() && !self.has_want()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    pub id: u64,
    #[serde(default)]
    pub good: Option<String>,
    #[serde(default)]
    pub better: Option<String>,
    #[serde(default)]
    pub best: Option<String>,
    pub pub_date: NaiveDate,
}

impl Reflection {
    pub fn has_good(&self) -> bool {
        not_empty(self.good.as_deref())
    }

    pub fn has_better(&self) -> bool {
        not_empty(self.better.as_deref())
    }

    pub fn has_best(&self) -> bool {
        not_empty(self.best.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        !self.has_good() && !self.has_better() && !self.has_best()
    }
}

/// One day of activity on a thread, as served by the daily events endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyResult {
    pub date: NaiveDate,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub reflection: Option<Reflection>,
}

impl DailyResult {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.plan.as_ref().map_or(true, Plan::is_empty)
            && self.reflection.as_ref().map_or(true, Reflection::is_empty)
    }
}

#[cfg(test)]
mod daily_tests {
    use super::*;

    #[test]
    fn test_daily_result_tagged_events() {
        let json = r#"{
            "date": "2024-01-05",
            "events": [
                {"resourcetype": "JournalAdded", "id": 1,
                 "published": "2024-01-05T08:00:00+01:00",
                 "comment": "Morning pages", "tags": ["writing"]},
                {"resourcetype": "HabitTracked", "id": 2,
                 "published": "2024-01-05T00:00:00+01:00",
                 "note": "", "occured": true,
                 "habit": {"id": 9, "name": "Running", "description": null,
                           "slug": "running", "tagname": "running"}},
                {"resourcetype": "ObservationMade", "id": 3,
                 "published": "2024-01-05T09:00:00+01:00",
                 "event_stream_id": "s1", "url": "/observations/3/", "type": "mistake",
                 "situation": "Overslept", "interpretation": null, "approach": null},
                {"resourcetype": "ObservationAttached", "id": 4,
                 "published": "2024-01-05T09:00:00+01:00",
                 "other_event_stream_id": "s2", "observation": null}
            ],
            "plan": null,
            "reflection": {"id": 5, "good": "- walked", "better": "?", "best": "",
                           "pub_date": "2024-01-05"}
        }"#;
        let day: DailyResult = serde_json::from_str(json).unwrap();
        assert_eq!(day.events.len(), 4);
        assert!(matches!(day.events[0], Event::JournalAdded(ref j) if j.tags == ["writing"]));
        assert!(matches!(day.events[1], Event::HabitTracked(ref h) if h.occurred));
        assert_eq!(day.events[2].as_observation().unwrap().situation_text(), "Overslept");
        assert!(matches!(day.events[3], Event::Unknown));
        assert!(!day.is_empty());
    }

    #[test]
    fn test_question_mark_counts_as_empty() {
        let reflection = Reflection {
            id: 1,
            good: Some(" ? ".into()),
            better: None,
            best: Some("   ".into()),
            pub_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert!(reflection.is_empty());
    }

    #[test]
    fn test_daily_result_empty() {
        let json = r#"{
            "date": "2024-01-05",
            "events": [],
            "plan": {"id": 1, "focus": "", "want": null, "pub_date": "2024-01-05"},
            "reflection": null
        }"#;
        let day: DailyResult = serde_json::from_str(json).unwrap();
        assert!(day.is_empty());
    }
}
