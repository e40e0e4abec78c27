use crate::{
    auth::CurrentUser,
    db::DbPool,
    error::AppError,
    export::{self, EXPORT_LIMIT},
    filter::{Page, TaskFilter},
    models::{ShareTaskRequest, Task, TaskCreate, TaskListQuery, TaskUpdate},
    store,
};
use actix_web::{delete, get, http::header, post, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Retrieves the tasks visible to the authenticated user.
///
/// Visible means owned by the user or, unless `include_shared=false`, shared with them.
/// All supplied filters must match; results are windowed by `skip`/`limit`.
///
/// ## Query Parameters:
/// - `search` (optional): substring looked up in titles and descriptions (case-insensitive).
/// - `category` (optional): exact category.
/// - `tags` (optional): comma-separated; a task matches if it has any of them.
/// - `completed` (optional): `true` or `false`.
/// - `due_date_from`, `due_date_to` (optional): inclusive RFC 3339 bounds on the due date.
/// - `include_shared` (default `true`): also list tasks shared with the user.
/// - `skip` (default `0`), `limit` (default `100`).
///
/// ## Responses:
/// - `200 OK`: a JSON array of tasks.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: malformed query string.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<DbPool>,
    query: web::Query<TaskListQuery>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let (filter, page) = query.into_inner().into_parts();
    let tasks = store::tasks::list_tasks(&pool, user.id, &filter, page).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// `shared_with_user_ids` may be supplied to share the task right away; unknown ids are
/// skipped.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: the payload failed validation.
#[post("")]
pub async fn create_task(
    pool: web::Data<DbPool>,
    task_data: web::Json<TaskCreate>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = store::tasks::create_task(&pool, user.id, &task_data).await?;
    log::info!("user {} created task {}", user.id, task.id);
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a task the user owns or that was shared with them.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `404 Not Found`: no such task, or it is not visible to the user.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = store::tasks::find_visible(&pool, task_id.into_inner(), user.id)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// Owners and sharees may both edit the task's fields. Only fields present in the body
/// change; `null` clears a nullable field and `"tags": []` clears the tags.
/// `shared_with_user_ids` replaces the sharee set and is ignored unless the caller owns
/// the task.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: no such task, or it is not visible to the user.
/// - `422 Unprocessable Entity`: the payload failed validation.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskUpdate>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let update = task_data.into_inner();

    let mut task = store::tasks::find_visible(&pool, task_id.into_inner(), user.id)
        .await?
        .ok_or_else(task_not_found)?;
    task.apply_update(&update);

    let sharees = match update.shared_with_user_ids.as_deref() {
        Some(ids) if task.is_owned_by(user.id) => Some(ids),
        Some(_) => {
            log::debug!(
                "user {} is not the owner of task {}; sharee change ignored",
                user.id,
                task.id
            );
            None
        }
        None => None,
    };

    let updated = store::tasks::update_task(&pool, &task, sharees).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task. Only the owner may do so; anyone else gets `404 Not Found`.
///
/// ## Responses:
/// - `204 No Content`: the task and its sharing entries are gone.
/// - `404 Not Found`: no such task, or the user is not its owner.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    if !store::tasks::delete_task(&pool, task_id, user.id).await? {
        return Err(task_not_found());
    }
    log::info!("user {} deleted task {}", user.id, task_id);
    Ok(HttpResponse::NoContent().finish())
}

/// Shares a task with more users. Owner only; existing sharees are kept.
#[post("/{id}/share")]
pub async fn share_task(
    pool: web::Data<DbPool>,
    task_id: web::Path<i64>,
    share: web::Json<ShareTaskRequest>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = store::tasks::share_task(&pool, task_id.into_inner(), user.id, &share.user_ids)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

#[get("/categories/list")]
pub async fn get_categories(
    pool: web::Data<DbPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let categories = store::tasks::categories(&pool, user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "categories": categories })))
}

#[get("/tags/list")]
pub async fn get_tags(
    pool: web::Data<DbPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tags = store::tasks::tags(&pool, user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "tags": tags })))
}

fn attachment(content_type: &str, filename: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", filename),
        ))
        .body(body)
}

async fn owned_tasks_for_export(
    pool: &DbPool,
    user: &CurrentUser,
) -> Result<Vec<Task>, AppError> {
    let page = Page {
        skip: 0,
        limit: EXPORT_LIMIT,
    };
    store::tasks::list_tasks(pool, user.id, &TaskFilter::owned_only(), page).await
}

/// Downloads the user's own tasks as pretty-printed JSON.
#[get("/export/json")]
pub async fn export_json(
    pool: web::Data<DbPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = owned_tasks_for_export(&pool, &user).await?;
    Ok(attachment("application/json", "tasks.json", export::to_json(&tasks)?))
}

/// Downloads the user's own tasks as CSV.
#[get("/export/csv")]
pub async fn export_csv(
    pool: web::Data<DbPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = owned_tasks_for_export(&pool, &user).await?;
    Ok(attachment("text/csv; charset=utf-8", "tasks.csv", export::to_csv(&tasks)?))
}
