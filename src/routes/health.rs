use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// API root: a short greeting with pointers to the main resources.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the taskshare API",
        "auth": "/auth",
        "tasks": "/tasks"
    }))
}

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(actix_web::App::new().service(health)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn test_index_endpoint() {
        let app = test::init_service(actix_web::App::new().service(index)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(json["tasks"], "/tasks");
    }
}
