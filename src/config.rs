use std::env;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 60;

/// Server-held OpenRouter settings. These are the only options the generate
/// handler recognizes.
#[derive(Debug, Clone, Default)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub referer_override: Option<String>,
    pub title_override: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// `None` for anything unparseable or too large to express in bytes.
fn megabytes_to_bytes(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_mul(1024 * 1024)
}

impl OpenRouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        OpenRouterConfig {
            api_key: non_empty_var("OPENROUTER_API_KEY"),
            referer_override: non_empty_var("OPENROUTER_HTTP_REFERER"),
            title_override: non_empty_var("OPENROUTER_X_TITLE"),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_empty(api_key);
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer_override = non_empty(referer);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_override = non_empty(title);
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = non_empty_var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);
        let max_upload_bytes = env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|mb| megabytes_to_bytes(&mb))
            .unwrap_or(defaults.max_upload_bytes);

        ServerConfig {
            host,
            port,
            max_upload_bytes,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
