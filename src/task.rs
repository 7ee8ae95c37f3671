//! Task data structure and the payloads used to create and edit it.
//!
//! A `Task` is a single unit of work with its classification metadata. New
//! tasks are described by a `TaskDraft`, edits by a `TaskPatch`; the store owns
//! identifiers, creator identity and timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::error::{Error, Result};
use crate::fields::*;

/// A unit of trackable work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    /// Free-text name of the responsible person. Not linked to any account.
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default, deserialize_with = "dates::lenient::deserialize")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "dates::lenient::deserialize")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub observation: Option<String>,
    pub creator_id: String,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// Set the status, keeping `completed_at` in step with it.
    ///
    /// Moving to `Completed` stamps `now` unless the task was already completed;
    /// moving to `Pending` clears the stamp. Returns whether the status changed.
    pub fn set_status(&mut self, status: Status, now: DateTime<Utc>) -> bool {
        let changed = self.status != status;
        self.status = status;
        match status {
            Status::Completed => {
                if self.completed_at.is_none() {
                    self.completed_at = Some(now);
                }
            }
            Status::Pending => self.completed_at = None,
        }
        changed
    }

    /// First eight characters of the id, enough to address a task by hand.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

/// Payload for creating a task. Identity and bookkeeping are filled in by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub client: Option<String>,
    pub sector: Option<String>,
    pub assignee_name: Option<String>,
    pub assignee_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub link: Option<String>,
    pub observation: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)
    }
}

/// Changes to apply to an existing task.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears an optional field.
/// There is deliberately no way to change the creator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub client: Option<Option<String>>,
    pub sector: Option<Option<String>>,
    pub assignee_name: Option<Option<String>>,
    pub assignee_id: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub link: Option<Option<String>>,
    pub observation: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Apply the patch in place. Status changes go through `Task::set_status`.
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) -> Result<()> {
        if let Some(title) = self.title {
            validate_title(&title)?;
            task.title = title;
        }
        set_if(&mut task.description, self.description);
        set_if(&mut task.client, self.client);
        set_if(&mut task.sector, self.sector);
        set_if(&mut task.assignee_name, self.assignee_name);
        set_if(&mut task.assignee_id, self.assignee_id);
        set_if(&mut task.start_date, self.start_date);
        set_if(&mut task.due_date, self.due_date);
        set_if(&mut task.link, self.link);
        set_if(&mut task.observation, self.observation);
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.set_status(status, now);
        }
        task.updated_at = now;
        Ok(())
    }
}

fn set_if<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title cannot be empty".into()));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_and_completed_at_move_together() {
        let mut t = task("a", "Write brief");
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap();

        assert!(t.set_status(Status::Completed, now));
        assert_eq!(t.completed_at, Some(now));

        // Completing again keeps the original stamp.
        assert!(!t.set_status(Status::Completed, later));
        assert_eq!(t.completed_at, Some(now));

        assert!(t.set_status(Status::Pending, later));
        assert_eq!(t.completed_at, None);
    }

    #[test]
    fn patch_clears_and_sets_fields() {
        let mut t = due("a", "2024-03-15");
        t.client = Some("Acme".into());
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap();
        let patch = TaskPatch {
            client: Some(None),
            sector: Some(Some("Design".into())),
            due_date: Some(None),
            status: Some(Status::Completed),
            ..Default::default()
        };
        patch.apply(&mut t, now).unwrap();
        assert_eq!(t.client, None);
        assert_eq!(t.sector.as_deref(), Some("Design"));
        assert_eq!(t.due_date, None);
        assert_eq!(t.completed_at, Some(now));
        assert_eq!(t.updated_at, now);
        assert_eq!(t.creator_id, "creator");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(TaskDraft::new("  ").validate().is_err());
        let mut t = task("a", "ok");
        let patch = TaskPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(patch.apply(&mut t, Utc::now()), Err(Error::Validation(_))));
        assert_eq!(t.title, "ok");
    }

    #[test]
    fn malformed_stored_due_date_reads_as_absent() {
        let json = r#"{
            "id": "x", "title": "t", "due_date": "31/02/2024",
            "creator_id": "u", "created_at": "2024-03-01T00:00:00Z",
            "updated_at": "2024-03-01T00:00:00Z"
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.due_date, None);
        assert_eq!(t.status, Status::Pending);
        assert_eq!(t.priority, Priority::Medium);
    }
}
