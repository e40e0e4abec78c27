//! Ownership-aware task queries.
//!
//! Every statement built here starts from the same projection and is restricted by a
//! visibility predicate: the caller owns the task, or (when shared tasks are included)
//! the task has been shared with the caller. Optional filters are ANDed on top.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

const SELECT_TASKS: &str = "SELECT t.id, t.title, t.description, t.completed, t.category, t.tags, \
     t.due_date, t.reminder_date, t.owner_id, t.created_at, t.updated_at, \
     (SELECT group_concat(s.user_id) FROM task_shared_with s WHERE s.task_id = t.id) AS shared_with \
     FROM tasks t WHERE ";

/// Optional restrictions for a task listing. All supplied filters must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFilter {
    /// Substring matched against title or description.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Matches tasks carrying at least one of these tags.
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
    /// Inclusive lower bound on the due date.
    pub due_date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the due date.
    pub due_date_to: Option<DateTime<Utc>>,
    /// Also return tasks other users shared with the caller.
    pub include_shared: bool,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            tags: None,
            completed: None,
            due_date_from: None,
            due_date_to: None,
            include_shared: true,
        }
    }
}

impl TaskFilter {
    /// Only the caller's own tasks, no further restriction.
    pub fn owned_only() -> Self {
        Self {
            include_shared: false,
            ..Self::default()
        }
    }
}

/// Offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

/// Escapes `LIKE` wildcards so user text is matched literally (with `ESCAPE '\'`).
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_visibility(qb: &mut QueryBuilder<'static, Sqlite>, user_id: i64, include_shared: bool) {
    if include_shared {
        qb.push("(t.owner_id = ")
            .push_bind(user_id)
            .push(" OR EXISTS (SELECT 1 FROM task_shared_with sw WHERE sw.task_id = t.id AND sw.user_id = ")
            .push_bind(user_id)
            .push("))");
    } else {
        qb.push("t.owner_id = ").push_bind(user_id);
    }
}

fn push_filters(qb: &mut QueryBuilder<'static, Sqlite>, filter: &TaskFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (t.title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR t.description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if let Some(category) = &filter.category {
        qb.push(" AND t.category = ").push_bind(category.clone());
    }

    if let Some(tags) = filter.tags.as_ref().filter(|tags| !tags.is_empty()) {
        // Stored tags are comma-joined; wrapping both sides in commas gives exact, case-sensitive matches.
        qb.push(" AND (");
        for (i, tag) in tags.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push("instr(',' || t.tags || ',', ")
                .push_bind(format!(",{},", tag))
                .push(") > 0");
        }
        qb.push(")");
    }

    if let Some(completed) = filter.completed {
        qb.push(" AND t.completed = ").push_bind(completed);
    }

    if let Some(from) = filter.due_date_from {
        qb.push(" AND t.due_date >= ").push_bind(from);
    }

    if let Some(to) = filter.due_date_to {
        qb.push(" AND t.due_date <= ").push_bind(to);
    }
}

/// Builds the listing query for `user_id`: visibility, then filters, then the page window.
pub fn list_query(user_id: i64, filter: &TaskFilter, page: Page) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_TASKS);
    push_visibility(&mut qb, user_id, filter.include_shared);
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY t.id LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(i64::from(page.skip));
    qb
}

/// A single task the user owns or has been shared.
pub fn visible_task_query(task_id: i64, user_id: i64) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_TASKS);
    qb.push("t.id = ").push_bind(task_id).push(" AND ");
    push_visibility(&mut qb, user_id, true);
    qb
}

/// A single task, only if `owner_id` owns it.
pub fn owned_task_query(task_id: i64, owner_id: i64) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_TASKS);
    qb.push("t.id = ").push_bind(task_id).push(" AND ");
    push_visibility(&mut qb, owner_id, false);
    qb
}
