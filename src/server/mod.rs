pub mod multipart;
pub mod routes;

use crate::{config::ServerConfig, logger::ACCESS_LOG_TARGET, openrouter::ImageEditService};
use actix_web::{middleware::Logger, web, App, HttpServer};

pub struct AppState {
    pub service: ImageEditService,
    pub server: ServerConfig,
}

impl AppState {
    pub fn new(service: ImageEditService, server: ServerConfig) -> Self {
        Self { service, server }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::generate)
        .service(routes::list_models)
        .service(routes::health_check);
}

/// Request log routed through the crate's own target so the console logger keeps it.
pub fn access_log() -> Logger {
    Logger::new("%r -> %s in %Dms").log_target(ACCESS_LOG_TARGET)
}

pub async fn run(service: ImageEditService, server: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(service, server.clone()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(access_log())
            .configure(configure_routes)
    })
    .bind(server.bind_address())?
    .run()
    .await
}
