pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod openrouter;
pub mod server;

pub use config::{OpenRouterConfig, ServerConfig};
pub use error::{GenerationError, Result};
pub use models::*;
pub use openrouter::{HttpGateway, ImageEditService, UpstreamGateway};
