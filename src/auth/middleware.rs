use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{verify_token, TokenSettings};
use crate::error::AppError;

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: &[&str] = &["/", "/health", "/auth/login", "/auth/register"];

/// Verifies the `Authorization: Bearer <token>` header on every non-public route and
/// stores the decoded [`Claims`](crate::auth::Claims) in the request extensions.
///
/// Rejections are rendered as `401` responses directly instead of being returned as
/// service errors. Requires `web::Data<TokenSettings>` in the app data.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S> AuthMiddlewareService<S> {
    fn authenticate(req: &ServiceRequest) -> Result<(), AppError> {
        let settings = req
            .app_data::<web::Data<TokenSettings>>()
            .ok_or_else(|| AppError::InternalServerError("Token settings not configured".into()))?;

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

        let claims = verify_token(token.trim(), settings)?;
        req.extensions_mut().insert(claims);
        Ok(())
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_public = req.method() == Method::OPTIONS || PUBLIC_PATHS.contains(&req.path());

        if !is_public {
            if let Err(err) = Self::authenticate(&req) {
                log::warn!("rejected {} {}: {}", req.method(), req.path(), err);
                let response = req.into_response(err.error_response()).map_into_right_body();
                return Box::pin(async move { Ok(response) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
