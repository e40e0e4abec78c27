use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user row. The password hash never leaves the server; see [`UserResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
}

/// Public view of a user, as returned by registration and the user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}
