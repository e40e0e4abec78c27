use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{User, UserResponse};

/// Inserts a new user. A duplicate email is reported as `400 Email already registered`.
pub async fn create_user(pool: &DbPool, email: &str, hashed_password: &str) -> Result<User, AppError> {
    let result = sqlx::query("INSERT INTO users (email, hashed_password) VALUES (?, ?)")
        .bind(email)
        .bind(hashed_password)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::BadRequest("Email already registered".into())
            }
            other => other.into(),
        })?;

    Ok(User {
        id: result.last_insert_rowid(),
        email: email.to_string(),
        hashed_password: hashed_password.to_string(),
    })
}

pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, hashed_password FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Every user except `user_id`, i.e. the people a task can be shared with.
pub async fn list_except(pool: &DbPool, user_id: i64) -> Result<Vec<UserResponse>, AppError> {
    let users = sqlx::query_as::<_, UserResponse>(
        "SELECT id, email FROM users WHERE id != ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(users)
}
