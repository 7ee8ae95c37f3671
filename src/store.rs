//! Task persistence.
//!
//! `TaskStore` is the boundary the rest of the crate talks to. `JsonStore` keeps
//! the whole collection in memory and, when backed by a file, rewrites the file
//! after every mutation (temp file + rename).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::fields::Status;
use crate::projection::cmp_due;
use crate::session::Session;
use crate::task::{Task, TaskDraft, TaskPatch};

/// Server-side listing constraints. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub assignee_id: Option<String>,
    pub client: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl TaskQuery {
    /// Tasks due from seven days before `today` onwards.
    pub fn recent(today: NaiveDate) -> Self {
        TaskQuery {
            date_from: today.checked_sub_days(Days::new(7)),
            ..Default::default()
        }
    }

    fn accepts(&self, task: &Task) -> bool {
        if let Some(id) = &self.assignee_id {
            if task.assignee_id.as_ref() != Some(id) {
                return false;
            }
        }
        if let Some(client) = &self.client {
            if task.client.as_ref() != Some(client) {
                return false;
            }
        }
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        match task.due_date {
            None => false,
            Some(due) => {
                self.date_from.map_or(true, |from| due >= from)
                    && self.date_to.map_or(true, |to| due <= to)
            }
        }
    }
}

/// Record storage for tasks.
pub trait TaskStore {
    /// Tasks accepted by `query`, by due date ascending with undated tasks last.
    fn list(&self, query: &TaskQuery) -> Result<Vec<Task>>;

    fn get(&self, id: &str) -> Result<Task>;

    /// Create a task owned by the session's user.
    fn create(&mut self, session: &Session, draft: TaskDraft) -> Result<Task>;

    /// Apply `patch`. The creator never changes.
    fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task>;

    fn set_status(&mut self, id: &str, status: Status) -> Result<Task>;

    /// Remove a task. Deleting an unknown id is an error.
    fn delete(&mut self, id: &str) -> Result<()>;

    fn toggle_status(&mut self, id: &str) -> Result<Task> {
        let current = self.get(id)?.status;
        self.set_status(id, current.toggled())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    tasks: Vec<Task>,
}

/// JSON-file task store.
#[derive(Debug, Default)]
pub struct JsonStore {
    path: Option<PathBuf>,
    tasks: Vec<Task>,
}

impl JsonStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let mut tasks = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            serde_json::from_str::<Document>(&raw)?.tasks
        } else {
            Vec::new()
        };
        for task in tasks.iter_mut() {
            normalise_completion(task);
        }
        tracing::debug!(path = %path.display(), count = tasks.len(), "opened task store");
        Ok(JsonStore {
            path: Some(path.to_path_buf()),
            tasks,
        })
    }

    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        JsonStore::default()
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Persist `next` and only then make it the current collection, so a
    /// failed write leaves memory matching the file.
    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        self.write(&next)?;
        self.tasks = next;
        Ok(())
    }

    fn write(&self, tasks: &[Task]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(&DocumentRef { tasks })?;
        let mut f = File::create(&tmp).map_err(|e| Error::io(&tmp, e))?;
        f.write_all(data.as_bytes()).map_err(|e| Error::io(&tmp, e))?;
        f.flush().map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    tasks: &'a [Task],
}

/// Repair records written by older clients that set status without a stamp.
fn normalise_completion(task: &mut Task) {
    match (task.status, task.completed_at) {
        (Status::Completed, None) => {
            tracing::warn!(id = %task.id, "completed task without completion time, using updated_at");
            task.completed_at = Some(task.updated_at);
        }
        (Status::Pending, Some(_)) => task.completed_at = None,
        _ => {}
    }
}

impl TaskStore for JsonStore {
    fn list(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let mut out: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| query.accepts(t))
            .cloned()
            .collect();
        out.sort_by(|a, b| cmp_due(a.due_date, b.due_date));
        Ok(out)
    }

    fn get(&self, id: &str) -> Result<Task> {
        let idx = self.position(id)?;
        Ok(self.tasks[idx].clone())
    }

    fn create(&mut self, session: &Session, draft: TaskDraft) -> Result<Task> {
        draft.validate()?;
        let now = Utc::now();
        let mut task = Task {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            client: draft.client,
            sector: draft.sector,
            assignee_name: draft.assignee_name,
            assignee_id: draft.assignee_id,
            start_date: draft.start_date,
            due_date: draft.due_date,
            priority: draft.priority.unwrap_or_default(),
            status: Status::Pending,
            completed_at: None,
            link: draft.link,
            observation: draft.observation,
            creator_id: session.user_id.clone(),
            created_by: Some(session.label().to_string()),
            created_at: now,
            updated_at: now,
        };
        task.set_status(draft.status.unwrap_or_default(), now);

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        tracing::info!(id = %task.id, creator = %task.creator_id, "created task");
        Ok(task)
    }

    fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let idx = self.position(id)?;
        let mut task = self.tasks[idx].clone();
        patch.apply(&mut task, Utc::now())?;
        let mut next = self.tasks.clone();
        next[idx] = task.clone();
        self.commit(next)?;
        tracing::debug!(id, "updated task");
        Ok(task)
    }

    fn set_status(&mut self, id: &str, status: Status) -> Result<Task> {
        let idx = self.position(id)?;
        let now = Utc::now();
        let mut task = self.tasks[idx].clone();
        if task.set_status(status, now) {
            task.updated_at = now;
        }
        let mut next = self.tasks.clone();
        next[idx] = task.clone();
        self.commit(next)?;
        tracing::debug!(id, ?status, "set task status");
        Ok(task)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let idx = self.position(id)?;
        let mut next = self.tasks.clone();
        next.remove(idx);
        self.commit(next)?;
        tracing::info!(id, "deleted task");
        Ok(())
    }
}
