use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::token::Claims;
use crate::db::DbPool;
use crate::error::AppError;
use crate::store;

/// The user behind the bearer token of the current request.
///
/// Relies on `AuthMiddleware` having verified the token and stored its [`Claims`] in the
/// request extensions. The token only carries an email, so the user row is looked up on
/// every extraction; a token for a user that no longer exists is rejected with `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move {
            let claims = claims.ok_or_else(|| {
                AppError::Unauthorized(
                    "Token claims not found in request. Ensure AuthMiddleware is active.".into(),
                )
            })?;
            let pool = pool.ok_or_else(|| {
                AppError::InternalServerError("Database pool not configured".into())
            })?;

            let user = store::users::find_by_email(&pool, &claims.sub)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".into()))?;

            Ok::<_, ActixError>(CurrentUser {
                id: user.id,
                email: user.email,
            })
        })
    }
}
