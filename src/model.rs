use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle stage of an anxiety.
///
/// Stored data written by either status scheme must keep parsing, so values
/// outside the known set are carried as [`Status::Other`] and written back
/// unchanged.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Thinking,
    Acting,
    Solved,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Thinking => "thinking",
            Self::Acting => "acting",
            Self::Solved => "solved",
            Self::Other(value) => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Thinking => "Thinking",
            Self::Acting => "Acting",
            Self::Solved => "Solved",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        match value {
            "open" => Self::Open,
            "in-progress" => Self::InProgress,
            "resolved" => Self::Resolved,
            "thinking" => Self::Thinking,
            "acting" => Self::Acting,
            "solved" => Self::Solved,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Other(_) => Self::Other(value),
            known => known,
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of statuses one running instance works with.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StatusScheme {
    #[default]
    Classic,
    Brainstorm,
}

impl StatusScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Brainstorm => "brainstorm",
        }
    }

    /// Statuses in lifecycle order; the first one is assigned to new entries.
    pub fn statuses(&self) -> [Status; 3] {
        match self {
            Self::Classic => [Status::Open, Status::InProgress, Status::Resolved],
            Self::Brainstorm => [Status::Thinking, Status::Acting, Status::Solved],
        }
    }

    pub fn initial(&self) -> Status {
        match self {
            Self::Classic => Status::Open,
            Self::Brainstorm => Status::Thinking,
        }
    }

    pub fn contains(&self, status: &Status) -> bool {
        self.statuses().contains(status)
    }
}

/// Stored records predate some fields and sometimes carry `null` where a
/// value is expected; both read as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ideas: Vec<Idea>,
}

impl Entry {
    pub fn idea(&self, idea_id: &str) -> Option<&Idea> {
        self.ideas.iter().find(|idea| idea.id == idea_id)
    }

    /// Progress as shown to the user; unset reads as zero.
    pub fn effective_progress(&self) -> u8 {
        self.progress.unwrap_or(0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
}

impl Idea {
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    pub fn done_count(&self) -> usize {
        self.steps.iter().filter(|step| step.done).count()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntryChanges {
    pub text: Option<String>,
    pub description: Option<String>,
}

impl EntryChanges {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.description.is_none()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryCounts {
    pub today: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub by_status: Vec<StatusCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_record_without_description_or_ideas_parses() {
        let raw = r#"{
            "id": "1717000000000",
            "text": "deadline stress",
            "createdAt": "2024-05-29T16:26:40.000Z",
            "status": "in-progress",
            "updates": ["talked to manager"],
            "progress": 40
        }"#;
        let entry: Entry = serde_json::from_str(raw).expect("parse entry");
        assert_eq!(entry.status, Status::InProgress);
        assert_eq!(entry.description, "");
        assert!(entry.ideas.is_empty());
        assert_eq!(entry.progress, Some(40));
        assert_eq!(entry.updates, vec!["talked to manager".to_string()]);
    }

    #[test]
    fn brainstorm_record_with_ideas_parses() {
        let raw = r#"{
            "id": "1",
            "text": "exam",
            "description": "finals in june",
            "createdAt": "2024-05-29T16:26:40Z",
            "status": "acting",
            "updates": [],
            "ideas": [
                {"id": "2", "title": "study plan", "steps": [{"id": "3", "text": "buy book", "done": true}]},
                {"id": "4", "title": "sleep more"}
            ]
        }"#;
        let entry: Entry = serde_json::from_str(raw).expect("parse entry");
        assert_eq!(entry.status, Status::Acting);
        assert_eq!(entry.description, "finals in june");
        assert_eq!(entry.ideas.len(), 2);
        assert!(entry.ideas[0].steps[0].done);
        assert!(entry.ideas[1].steps.is_empty());
    }

    #[test]
    fn unknown_status_passes_through() {
        let raw = r#"{"id":"1","text":"x","createdAt":"2024-01-01T00:00:00Z","status":"parked","updates":[]}"#;
        let entry: Entry = serde_json::from_str(raw).expect("parse entry");
        assert_eq!(entry.status, Status::Other("parked".to_string()));
        let written = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(written["status"], "parked");
    }

    #[test]
    fn missing_status_and_updates_default() {
        let raw = r#"{"id":"1","text":"x","createdAt":"2024-01-01T00:00:00Z"}"#;
        let entry: Entry = serde_json::from_str(raw).expect("parse entry");
        assert_eq!(entry.status, Status::Open);
        assert!(entry.updates.is_empty());
        assert_eq!(entry.progress, None);
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let raw = r#"{
            "id": "1",
            "text": "old worry",
            "description": null,
            "createdAt": "2024-01-01T00:00:00Z",
            "status": null,
            "updates": null,
            "progress": null,
            "ideas": [{"id": "2", "title": null, "steps": null}, {"id": "3", "title": "t", "steps": [{"id": "4", "text": null, "done": null}]}]
        }"#;
        let entry: Entry = serde_json::from_str(raw).expect("parse entry");
        assert_eq!(entry.description, "");
        assert_eq!(entry.status, Status::Open);
        assert!(entry.updates.is_empty());
        assert_eq!(entry.progress, None);
        assert_eq!(entry.ideas[0].title, "");
        assert!(entry.ideas[0].steps.is_empty());
        assert_eq!(entry.ideas[1].steps[0].text, "");
        assert!(!entry.ideas[1].steps[0].done);
    }

    #[test]
    fn unset_progress_is_not_written() {
        let raw = r#"{"id":"1","text":"x","createdAt":"2024-01-01T00:00:00Z","status":"open","updates":[]}"#;
        let entry: Entry = serde_json::from_str(raw).expect("parse entry");
        let written = serde_json::to_value(&entry).expect("serialize");
        assert!(written.get("progress").is_none());
        assert!(written.get("description").is_none());
        assert!(written.get("ideas").is_none());
        assert_eq!(written["createdAt"], "2024-01-01T00:00:00Z");
        assert_eq!(entry.effective_progress(), 0);
    }

    #[test]
    fn schemes_start_at_their_first_status() {
        assert_eq!(StatusScheme::Classic.initial(), Status::Open);
        assert_eq!(StatusScheme::Brainstorm.initial(), Status::Thinking);
        assert!(StatusScheme::Brainstorm.contains(&Status::Solved));
        assert!(!StatusScheme::Classic.contains(&Status::Solved));
    }

    #[test]
    fn status_labels() {
        assert_eq!(Status::InProgress.label(), "In Progress");
        assert_eq!(Status::from("resolved").label(), "Resolved");
        assert_eq!(Status::from("weird").label(), "weird");
    }
}
