use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::datetime;
use crate::filter::{Page, TaskFilter};

/// Separator used when a tag set is persisted as a single column.
pub const TAG_SEPARATOR: char = ',';
/// Upper bound on the persisted tag column.
pub const MAX_TAGS_LEN: usize = 500;

/// Trims every tag, drops empty ones and duplicates, keeping first-seen order.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !normalized.iter().any(|seen| seen == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

/// Joins a tag list into its stored form. An empty list is stored as `NULL`.
pub fn tags_to_column<S: AsRef<str>>(tags: &[S]) -> Option<String> {
    let tags = normalize_tags(tags);
    if tags.is_empty() {
        None
    } else {
        Some(tags.join(&TAG_SEPARATOR.to_string()))
    }
}

/// Splits a stored tag column back into a list.
pub fn tags_from_column(column: Option<&str>) -> Vec<String> {
    match column {
        Some(raw) => normalize_tags(&raw.split(TAG_SEPARATOR).collect::<Vec<_>>()),
        None => Vec::new(),
    }
}

/// Represents a task as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,
    /// The user who created the task and holds delete/share rights.
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Users the owner shared this task with.
    pub shared_with_user_ids: Vec<i64>,
}

/// A task as read from the database: tags still joined, sharees as a `group_concat` list.
#[derive(Debug, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub shared_with: Option<String>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let mut shared_with_user_ids: Vec<i64> = row
            .shared_with
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect();
        shared_with_user_ids.sort_unstable();

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            category: row.category,
            tags: tags_from_column(row.tags.as_deref()),
            due_date: row.due_date,
            reminder_date: row.reminder_date,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            shared_with_user_ids,
        }
    }
}

impl Task {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    /// Applies a partial update. Fields absent from `update` are left untouched and
    /// `updated_at` is refreshed. The sharee set is not part of this; see
    /// [`TaskUpdate::shared_with_user_ids`].
    pub fn apply_update(&mut self, update: &TaskUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(category) = &update.category {
            self.category = category.clone();
        }
        if let Some(tags) = &update.tags {
            self.tags = normalize_tags(tags.as_deref().unwrap_or_default());
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(reminder_date) = update.reminder_date {
            self.reminder_date = reminder_date;
        }
        self.updated_at = Utc::now();
    }
}

/// Payload for `POST /tasks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_task_create"))]
pub struct TaskCreate {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "datetime::option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime::option")]
    pub reminder_date: Option<DateTime<Utc>>,
    /// Users to share the new task with right away.
    pub shared_with_user_ids: Option<Vec<i64>>,
}

/// Payload for `PUT /tasks/{id}`.
///
/// Nullable fields are double options: an absent key leaves the field unchanged, an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_task_update"))]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    /// `[]` and `null` both clear the stored tags.
    #[serde(default, deserialize_with = "double_option")]
    pub tags: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "datetime::double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "datetime::double_option")]
    pub reminder_date: Option<Option<DateTime<Utc>>>,
    /// Replaces the sharee set. Only honored when the caller owns the task.
    pub shared_with_user_ids: Option<Vec<i64>>,
}

/// Payload for `POST /tasks/{id}/share`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareTaskRequest {
    pub user_ids: Vec<i64>,
}

/// Query string accepted by `GET /tasks`.
///
/// `tags` is comma-separated; a task matches when it carries any of them.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskListQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "datetime::option")]
    pub due_date_from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "datetime::option")]
    pub due_date_to: Option<DateTime<Utc>>,
    #[serde(default = "default_include_shared")]
    pub include_shared: bool,
}

fn default_limit() -> u32 {
    100
}

fn default_include_shared() -> bool {
    true
}

impl TaskListQuery {
    pub fn into_parts(self) -> (TaskFilter, Page) {
        let tags = self
            .tags
            .map(|raw| normalize_tags(&raw.split(TAG_SEPARATOR).collect::<Vec<_>>()))
            .filter(|tags| !tags.is_empty());

        let filter = TaskFilter {
            search: self.search.filter(|s| !s.is_empty()),
            category: self.category.filter(|c| !c.is_empty()),
            tags,
            completed: self.completed,
            due_date_from: self.due_date_from,
            due_date_to: self.due_date_to,
            include_shared: self.include_shared,
        };
        let page = Page {
            skip: self.skip,
            limit: self.limit,
        };
        (filter, page)
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn check_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|tag| tag.contains(TAG_SEPARATOR)) {
        return Err(validation_error("tags", "tags must not contain commas"));
    }
    if tags_to_column(tags).map_or(0, |joined| joined.chars().count()) > MAX_TAGS_LEN {
        return Err(validation_error("tags", "tags are too long"));
    }
    Ok(())
}

fn validate_task_create(task: &TaskCreate) -> Result<(), ValidationError> {
    match &task.tags {
        Some(tags) => check_tags(tags),
        None => Ok(()),
    }
}

fn validate_task_update(update: &TaskUpdate) -> Result<(), ValidationError> {
    if let Some(Some(description)) = &update.description {
        if description.chars().count() > 1000 {
            return Err(validation_error("description", "description is too long"));
        }
    }
    if let Some(Some(category)) = &update.category {
        if category.chars().count() > 100 {
            return Err(validation_error("category", "category is too long"));
        }
    }
    match &update.tags {
        Some(Some(tags)) => check_tags(tags),
        _ => Ok(()),
    }
}
