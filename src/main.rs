use actix_web::{middleware::Logger, web, App, HttpServer};
use taskshare::{auth::AuthMiddleware, db, routes, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let pool = db::connect(&config.database_url).await.map_err(|e| {
        log::error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let token_settings = config.token_settings();
    let allowed_origins = config.allowed_origins.clone();

    log::info!("Starting taskshare server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(token_settings.clone()))
            .wrap(AuthMiddleware)
            .wrap(routes::cors(&allowed_origins))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
