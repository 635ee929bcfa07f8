//! Task aggregate with its embedded, append-only comment log.
//!
//! Tasks belong to exactly one project; the `project` reference is fixed at
//! creation. Comments are owned by the task, ordered by append time, and are
//! never edited or deleted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ids::{ProjectId, TaskId, UserId};

/// Validation errors for task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyCommentText,
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyCommentText => write!(f, "comment text must not be empty"),
        }
    }
}

impl std::error::Error for TaskValidationError {}

/// Maximum allowed length for a task title.
pub const TASK_TITLE_MAX: usize = 200;

/// Task title, trimmed and length-checked at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Validate and construct a title; surrounding whitespace is trimmed.
    pub fn new(title: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TASK_TITLE_MAX {
            return Err(TaskValidationError::TitleTooLong { max: TASK_TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<TaskTitle> for String {
    fn from(value: TaskTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for TaskTitle {
    type Error = TaskValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Stable wire name for the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Priority label of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Stable wire name for the priority.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown task priority: {other}")),
        }
    }
}

/// One entry in a task's comment log. Mentions are stored verbatim; no
/// validation that mentioned users are project members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    author: UserId,
    text: String,
    mentions: Vec<UserId>,
    created_at: DateTime<Utc>,
}

impl Comment {
    /// Validate and construct a comment.
    pub fn new(
        author: UserId,
        text: impl AsRef<str>,
        mentions: Vec<UserId>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskValidationError::EmptyCommentText);
        }
        Ok(Self {
            author,
            text: trimmed.to_owned(),
            mentions,
            created_at,
        })
    }

    /// The commenting user.
    pub fn author(&self) -> &UserId {
        &self.author
    }

    /// Comment body.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Users mentioned in the comment, as supplied.
    pub fn mentions(&self) -> &[UserId] {
        &self.mentions
    }

    /// When the comment was appended.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Unvalidated input for assembling a [`Task`].
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub id: TaskId,
    pub title: TaskTitle,
    pub description: String,
    pub project: ProjectId,
    pub assigned_to: Option<UserId>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields the project creator may change on an existing task. Absent fields
/// keep their current values. The owning project is immutable, and status
/// moves only through the assignee's dedicated channel, so neither is
/// patchable here.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<TaskTitle>,
    pub description: Option<String>,
    pub assigned_to: Option<Option<UserId>>,
    pub priority: Option<TaskPriority>,
    pub tags: Option<Vec<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: String,
    project: ProjectId,
    assigned_to: Option<UserId>,
    status: TaskStatus,
    priority: TaskPriority,
    tags: Vec<String>,
    start_date: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    comments: Vec<Comment>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Assemble a task, normalising the tag set.
    #[must_use]
    pub fn new(draft: TaskDraft) -> Self {
        let TaskDraft {
            id,
            title,
            description,
            project,
            assigned_to,
            status,
            priority,
            tags,
            start_date,
            due_date,
            comments,
            created_at,
            updated_at,
        } = draft;

        Self {
            id,
            title,
            description,
            project,
            assigned_to,
            status,
            priority,
            tags: crate::domain::project::normalise_tags(tags),
            start_date,
            due_date,
            comments,
            created_at,
            updated_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Task title.
    pub fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Owning project; immutable after creation.
    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Current assignee, if any. Unassigned tasks have no self-service
    /// status channel.
    pub fn assigned_to(&self) -> Option<&UserId> {
        self.assigned_to.as_ref()
    }

    /// Workflow status.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Priority label.
    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Tag set (deduplicated, insertion-ordered).
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Optional start date.
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Optional due date.
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Ordered comment log, oldest first.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `user` is the current assignee.
    #[must_use]
    pub fn is_assignee(&self, user: &UserId) -> bool {
        self.assigned_to.as_ref() == Some(user)
    }

    /// Single-field status change used by the assignee-only channel.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// Apply a partial patch; absent fields retain their current values.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        let TaskPatch {
            title,
            description,
            assigned_to,
            priority,
            tags,
            start_date,
            due_date,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(assigned_to) = assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(tags) = tags {
            self.tags = crate::domain::project::normalise_tags(tags);
        }
        if let Some(start_date) = start_date {
            self.start_date = Some(start_date);
        }
        if let Some(due_date) = due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = now;
    }

    /// Append a comment to the end of the log. Comments are never edited or
    /// removed afterwards.
    pub fn append_comment(&mut self, comment: Comment, now: DateTime<Utc>) {
        self.comments.push(comment);
        self.updated_at = now;
    }
}
