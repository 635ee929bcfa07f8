//! Project aggregate.
//!
//! A project is owned by its creator and shared with a set of members. The
//! creator is deliberately *not* stored in `members`; membership checks treat
//! the creator as an implicit member, and `member_count` is always
//! `members.len() + 1`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ids::{ProjectId, UserId};

/// Validation errors for project fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    TitleTooShort { min: usize },
    TitleTooLong { max: usize },
    DescriptionTooLong { max: usize },
    EmptyMilestone,
    MilestoneDueDateNotInFuture,
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TitleTooShort { min } => {
                write!(f, "title must be at least {min} characters")
            }
            Self::TitleTooLong { max } => {
                write!(f, "title must be at most {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::EmptyMilestone => write!(f, "milestone must not be empty"),
            Self::MilestoneDueDateNotInFuture => {
                write!(f, "milestone due date must be in the future")
            }
        }
    }
}

impl std::error::Error for ProjectValidationError {}

/// Minimum allowed length for a project title.
pub const PROJECT_TITLE_MIN: usize = 3;
/// Maximum allowed length for a project title.
pub const PROJECT_TITLE_MAX: usize = 100;
/// Maximum allowed length for a project description.
pub const PROJECT_DESCRIPTION_MAX: usize = 500;

/// Project title, trimmed and length-checked at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectTitle(String);

impl ProjectTitle {
    /// Validate and construct a title; surrounding whitespace is trimmed.
    pub fn new(title: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        let trimmed = title.as_ref().trim();
        let len = trimmed.chars().count();
        if len < PROJECT_TITLE_MIN {
            return Err(ProjectValidationError::TitleTooShort {
                min: PROJECT_TITLE_MIN,
            });
        }
        if len > PROJECT_TITLE_MAX {
            return Err(ProjectValidationError::TitleTooLong {
                max: PROJECT_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ProjectTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProjectTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ProjectTitle> for String {
    fn from(value: ProjectTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProjectTitle {
    type Error = ProjectValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Project description, bounded but optional content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectDescription(String);

impl ProjectDescription {
    /// Validate and construct a description.
    pub fn new(description: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        let trimmed = description.as_ref().trim();
        if trimmed.chars().count() > PROJECT_DESCRIPTION_MAX {
            return Err(ProjectValidationError::DescriptionTooLong {
                max: PROJECT_DESCRIPTION_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ProjectDescription {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ProjectDescription> for String {
    fn from(value: ProjectDescription) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProjectDescription {
    type Error = ProjectValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Completed,
    Pending,
}

impl ProjectStatus {
    /// Stable wire name for the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            other => Err(format!("unknown project status: {other}")),
        }
    }
}

/// One milestone on the project roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapEntry {
    milestone: String,
    due_date: DateTime<Utc>,
}

impl RoadmapEntry {
    /// Validate a milestone at write time. The due date must be strictly in
    /// the future *now*; entries are never re-validated later, so a milestone
    /// naturally ages into the past without error.
    pub fn new(
        milestone: impl AsRef<str>,
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, ProjectValidationError> {
        let trimmed = milestone.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProjectValidationError::EmptyMilestone);
        }
        if due_date <= now {
            return Err(ProjectValidationError::MilestoneDueDateNotInFuture);
        }
        Ok(Self {
            milestone: trimmed.to_owned(),
            due_date,
        })
    }

    /// Milestone label.
    pub fn milestone(&self) -> &str {
        self.milestone.as_str()
    }

    /// When the milestone is due.
    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }
}

/// Normalise a tag list: trim entries, drop empties, deduplicate
/// (exact match), preserving first-occurrence order.
#[must_use]
pub fn normalise_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen.iter().any(|existing| existing == trimmed) {
            seen.push(trimmed.to_owned());
        }
    }
    seen
}

/// Unvalidated input for assembling a [`Project`].
#[derive(Debug, Clone)]
pub struct ProjectDraft {
    pub id: ProjectId,
    pub title: ProjectTitle,
    pub description: ProjectDescription,
    pub created_by: UserId,
    pub members: Vec<UserId>,
    pub status: ProjectStatus,
    pub tags: Vec<String>,
    pub roadmap: Vec<RoadmapEntry>,
    pub start_date: Option<DateTime<Utc>>,
    pub target_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a creator may change on an existing project. Absent fields keep
/// their current values (partial patch semantics).
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<ProjectTitle>,
    pub description: Option<ProjectDescription>,
    pub status: Option<ProjectStatus>,
    pub tags: Option<Vec<String>>,
    pub roadmap: Option<Vec<RoadmapEntry>>,
    pub start_date: Option<DateTime<Utc>>,
    pub target_date: Option<DateTime<Utc>>,
}

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    title: ProjectTitle,
    description: ProjectDescription,
    created_by: UserId,
    members: Vec<UserId>,
    status: ProjectStatus,
    tags: Vec<String>,
    roadmap: Vec<RoadmapEntry>,
    start_date: Option<DateTime<Utc>>,
    target_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    /// Assemble a project, normalising the membership and tag sets.
    ///
    /// The creator is removed from `members` if present, duplicate member ids
    /// collapse to one entry, and tags are trimmed and deduplicated.
    #[must_use]
    pub fn new(draft: ProjectDraft) -> Self {
        let ProjectDraft {
            id,
            title,
            description,
            created_by,
            members,
            status,
            tags,
            roadmap,
            start_date,
            target_date,
            created_at,
            updated_at,
        } = draft;

        let mut unique: Vec<UserId> = Vec::with_capacity(members.len());
        for member in members {
            if member != created_by && !unique.contains(&member) {
                unique.push(member);
            }
        }

        Self {
            id,
            title,
            description,
            created_by,
            members: unique,
            status,
            tags: normalise_tags(tags),
            roadmap,
            start_date,
            target_date,
            created_at,
            updated_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    /// Project title.
    pub fn title(&self) -> &ProjectTitle {
        &self.title
    }

    /// Project description.
    pub fn description(&self) -> &ProjectDescription {
        &self.description
    }

    /// The creator, holder of exclusive update/delete rights.
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    /// Explicit members (never includes the creator).
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Lifecycle status.
    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Tag set (deduplicated, insertion-ordered).
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Ordered roadmap milestones.
    pub fn roadmap(&self) -> &[RoadmapEntry] {
        &self.roadmap
    }

    /// Optional start date.
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Optional target date.
    pub fn target_date(&self) -> Option<DateTime<Utc>> {
        self.target_date
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Total collaborators including the implicit creator.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len() + 1
    }

    /// Whether `user` created this project.
    #[must_use]
    pub fn is_creator(&self, user: &UserId) -> bool {
        &self.created_by == user
    }

    /// Whether `user` is an explicit member.
    #[must_use]
    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    /// Whether `user` may see this project at all.
    #[must_use]
    pub fn is_collaborator(&self, user: &UserId) -> bool {
        self.is_creator(user) || self.is_member(user)
    }

    /// Add a member, keeping the set free of duplicates and of the creator.
    /// Returns whether the membership set changed.
    pub fn add_member(&mut self, user: UserId, now: DateTime<Utc>) -> bool {
        if user == self.created_by || self.members.contains(&user) {
            return false;
        }
        self.members.push(user);
        self.updated_at = now;
        true
    }

    /// Apply a partial patch; absent fields retain their current values.
    pub fn apply_patch(&mut self, patch: ProjectPatch, now: DateTime<Utc>) {
        let ProjectPatch {
            title,
            description,
            status,
            tags,
            roadmap,
            start_date,
            target_date,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(tags) = tags {
            self.tags = normalise_tags(tags);
        }
        if let Some(roadmap) = roadmap {
            self.roadmap = roadmap;
        }
        if let Some(start_date) = start_date {
            self.start_date = Some(start_date);
        }
        if let Some(target_date) = target_date {
            self.target_date = Some(target_date);
        }
        self.updated_at = now;
    }
}
