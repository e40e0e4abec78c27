#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use taskshare::auth::{AuthMiddleware, TokenResponse, TokenSettings};
use taskshare::db::{self, DbPool};
use taskshare::models::{Task, UserResponse};
use taskshare::routes;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "Password123!";
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub fn token_settings() -> TokenSettings {
    TokenSettings::new(TEST_SECRET, chrono::Duration::minutes(30))
}

pub async fn test_pool() -> DbPool {
    db::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database")
}

/// The application as `main` assembles it, backed by `pool`.
pub async fn init_app(
    pool: &DbPool,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(token_settings()))
            .wrap(AuthMiddleware)
            .wrap(routes::cors(&[ALLOWED_ORIGIN.to_string()]))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

pub async fn register<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

pub async fn register_and_login<S, B>(app: &S, email: &str) -> TestUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    let user: UserResponse = serde_json::from_value(body).expect("Failed to parse user");

    let (status, body) = login(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    let token: TokenResponse = serde_json::from_value(body).expect("Failed to parse token");

    TestUser {
        id: user.id,
        token: token.access_token,
    }
}

pub async fn create_task<S, B>(app: &S, user: &TestUser, payload: Value) -> Task
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(user.bearer())
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "create task failed");
    test::read_body_json(resp).await
}

pub async fn list_tasks<S, B>(app: &S, user: &TestUser, query: &str) -> Vec<Task>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::get()
        .uri(&format!("/tasks{}", query))
        .append_header(user.bearer())
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "list tasks failed");
    test::read_body_json(resp).await
}

pub fn ids(tasks: &[Task]) -> Vec<i64> {
    tasks.iter().map(|t| t.id).collect()
}
