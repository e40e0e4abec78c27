use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db::DbPool;
use crate::error::AppError;
use crate::filter::{self, Page, TaskFilter};
use crate::models::task::{tags_from_column, tags_to_column};
use crate::models::{Task, TaskCreate, TaskRow};

/// Adds sharees to a task. The owner, unknown user ids and existing sharees are skipped.
async fn insert_sharees(
    conn: &mut SqliteConnection,
    task_id: i64,
    owner_id: i64,
    user_ids: &[i64],
) -> Result<(), AppError> {
    for &user_id in user_ids.iter().filter(|&&id| id != owner_id) {
        sqlx::query(
            "INSERT OR IGNORE INTO task_shared_with (task_id, user_id) \
             SELECT ?, id FROM users WHERE id = ?",
        )
        .bind(task_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn create_task(pool: &DbPool, owner_id: i64, input: &TaskCreate) -> Result<Task, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO tasks (title, description, completed, category, tags, due_date, reminder_date, \
         owner_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(input.description.as_deref())
    .bind(input.completed)
    .bind(input.category.as_deref())
    .bind(tags_to_column(input.tags.as_deref().unwrap_or_default()))
    .bind(input.due_date)
    .bind(input.reminder_date)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let task_id = result.last_insert_rowid();

    if let Some(user_ids) = &input.shared_with_user_ids {
        insert_sharees(&mut tx, task_id, owner_id, user_ids).await?;
    }
    tx.commit().await?;

    find_visible(pool, task_id, owner_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Created task could not be read back".into()))
}

pub async fn list_tasks(
    pool: &DbPool,
    user_id: i64,
    filter: &TaskFilter,
    page: Page,
) -> Result<Vec<Task>, AppError> {
    let mut qb = filter::list_query(user_id, filter, page);
    let rows = qb.build_query_as::<TaskRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Task::from).collect())
}

/// A task `user_id` owns or has been shared.
pub async fn find_visible(pool: &DbPool, task_id: i64, user_id: i64) -> Result<Option<Task>, AppError> {
    let mut qb = filter::visible_task_query(task_id, user_id);
    let row = qb.build_query_as::<TaskRow>().fetch_optional(pool).await?;
    Ok(row.map(Task::from))
}

pub async fn find_owned(pool: &DbPool, task_id: i64, owner_id: i64) -> Result<Option<Task>, AppError> {
    let mut qb = filter::owned_task_query(task_id, owner_id);
    let row = qb.build_query_as::<TaskRow>().fetch_optional(pool).await?;
    Ok(row.map(Task::from))
}

/// Writes every field of `task` back and, if given, replaces its sharee set.
pub async fn update_task(
    pool: &DbPool,
    task: &Task,
    sharees: Option<&[i64]>,
) -> Result<Task, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, completed = ?, category = ?, tags = ?, \
         due_date = ?, reminder_date = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&task.title)
    .bind(task.description.as_deref())
    .bind(task.completed)
    .bind(task.category.as_deref())
    .bind(tags_to_column(&task.tags))
    .bind(task.due_date)
    .bind(task.reminder_date)
    .bind(task.updated_at)
    .bind(task.id)
    .execute(&mut *tx)
    .await?;

    if let Some(user_ids) = sharees {
        sqlx::query("DELETE FROM task_shared_with WHERE task_id = ?")
            .bind(task.id)
            .execute(&mut *tx)
            .await?;
        insert_sharees(&mut tx, task.id, task.owner_id, user_ids).await?;
    }
    tx.commit().await?;

    find_visible(pool, task.id, task.owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

/// Deletes a task owned by `owner_id`. Returns `false` when there was nothing to delete.
pub async fn delete_task(pool: &DbPool, task_id: i64, owner_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND owner_id = ?")
        .bind(task_id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Extends the sharee set of a task owned by `owner_id`. `None` if the caller doesn't own it.
pub async fn share_task(
    pool: &DbPool,
    task_id: i64,
    owner_id: i64,
    user_ids: &[i64],
) -> Result<Option<Task>, AppError> {
    if find_owned(pool, task_id, owner_id).await?.is_none() {
        return Ok(None);
    }

    let mut tx = pool.begin().await?;
    insert_sharees(&mut tx, task_id, owner_id, user_ids).await?;
    tx.commit().await?;

    find_owned(pool, task_id, owner_id).await
}

/// Distinct categories across the caller's own tasks.
pub async fn categories(pool: &DbPool, owner_id: i64) -> Result<Vec<String>, AppError> {
    let categories = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM tasks \
         WHERE owner_id = ? AND category IS NOT NULL AND category != '' ORDER BY category",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

/// Distinct tags across the caller's own tasks, sorted.
pub async fn tags(pool: &DbPool, owner_id: i64) -> Result<Vec<String>, AppError> {
    let columns = sqlx::query_scalar::<_, String>(
        "SELECT tags FROM tasks WHERE owner_id = ? AND tags IS NOT NULL",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let tags: BTreeSet<String> = columns
        .iter()
        .flat_map(|column| tags_from_column(Some(column)))
        .collect();
    Ok(tags.into_iter().collect())
}
