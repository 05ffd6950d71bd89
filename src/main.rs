use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer};

use examgate_server::{
    app_state::AppState,
    auth::{AuthMiddleware, JwtService},
    config::Config,
    errors::AppError,
    handlers::{attempt_handler, eligibility_handler},
    services::TicketCleanupJob,
};

#[get("/health")]
async fn health(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.db.health_check().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        config.validate_for_production();
    }

    let state = AppState::new(config.clone())
        .await
        .map_err(|err| std::io::Error::other(format!("failed to initialize app state: {err}")))?;

    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

    TicketCleanupJob::new(state.ticket_repository.clone(), config.cleanup_interval_secs).spawn();

    log::info!(
        "Starting HTTP server on {}:{}",
        config.web_server_host,
        config.web_server_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .wrap(Logger::default())
            .service(health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .service(eligibility_handler::check_eligibility)
                    .service(attempt_handler::start_attempt)
                    .service(attempt_handler::submit_quiz),
            )
    })
    .bind((config.web_server_host.as_str(), config.web_server_port))?
    .run()
    .await
}
