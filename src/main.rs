use nanobanana::{
    logger::{self, LogLevel, LoggerConfig},
    HttpGateway, ImageEditService, OpenRouterConfig, ServerConfig,
};
use std::env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut logger_config = match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => LoggerConfig::production(),
        _ => LoggerConfig::development().with_level(LogLevel::Info),
    };
    if let Some(level) = env::var("LOG_LEVEL").ok().as_deref().and_then(LogLevel::parse) {
        logger_config = logger_config.with_level(level);
    }
    logger::init_with_config(logger_config)?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let server_config = ServerConfig::from_env();
    let openrouter_config = OpenRouterConfig::from_env();

    let mut gateway = HttpGateway::new();
    if let Ok(base_url) = env::var("OPENROUTER_BASE_URL") {
        if !base_url.trim().is_empty() {
            gateway = gateway.with_base_url(base_url);
        }
    }

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &server_config);
    logger::log_config_info(&openrouter_config, gateway.base_url());

    let service = ImageEditService::with_gateway(openrouter_config, Arc::new(gateway));
    nanobanana::server::run(service, server_config).await?;

    Ok(())
}
