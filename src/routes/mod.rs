pub mod auth;
pub mod health;
pub mod tasks;

use actix_cors::Cors;
use actix_web::web;

use crate::error::AppError;

/// Registers every route plus the extractor configs that turn malformed JSON bodies and
/// query strings into `422` responses.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(health::index)
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register)
                .service(auth::list_users),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_categories)
                .service(tasks::get_tags)
                .service(tasks::export_json)
                .service(tasks::export_csv)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::share_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// CORS policy limited to `allowed_origins`, with credentials.
pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .expose_any_header()
        .supports_credentials()
        .max_age(3600)
}
