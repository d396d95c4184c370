mod telemetry;

pub use telemetry::*;

use envconfig::Envconfig;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" => Ok(Environment::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone, Envconfig, Debug)]
pub struct ServerConfig {
    #[envconfig(from = "ENVIRONMENT", default = "test")]
    environment: Environment,
    #[envconfig(from = "HOST", default = "localhost")]
    host: String,
    #[envconfig(from = "PORT", default = "3007")]
    port: u16,
    #[envconfig(from = "APP_URL", default = "http://localhost:3007")]
    app_url: String,
    /// Outbound request timeout in milliseconds.
    #[envconfig(from = "TIMEOUT", default = "30000")]
    timeout: u64,
    #[envconfig(from = "BURST_RATE_LIMIT", default = "10")]
    burst_rate_limit: u64,
    #[envconfig(from = "BURST_SIZE_LIMIT", default = "15")]
    burst_size_limit: u32,
    #[envconfig(from = "CACHE_SIZE", default = "10000")]
    cache_size: u64,
}

impl ServerConfig {
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn burst_rate_limit(&self) -> u64 {
        self.burst_rate_limit
    }

    pub fn burst_size_limit(&self) -> u32 {
        self.burst_size_limit
    }

    pub fn cache_size(&self) -> u64 {
        self.cache_size
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development || self.environment == Environment::Test
    }
}

#[derive(Clone, Envconfig, Debug)]
pub struct RegistryConfig {
    #[envconfig(from = "VCS_API_URL", default = "https://api.github.com")]
    vcs_api_url: String,
    #[envconfig(from = "DEFAULT_PAGE_LIMIT", default = "30")]
    default_page_limit: u64,
    #[envconfig(from = "MAX_PAGE_LIMIT", default = "100")]
    max_page_limit: u64,
}

impl RegistryConfig {
    pub fn vcs_api_url(&self) -> &str {
        &self.vcs_api_url
    }

    pub fn default_page_limit(&self) -> u64 {
        self.default_page_limit
    }

    pub fn max_page_limit(&self) -> u64 {
        self.max_page_limit
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    server: ServerConfig,
    registry: RegistryConfig,
}

impl Config {
    pub fn new(server: ServerConfig, registry: RegistryConfig) -> Self {
        Self { server, registry }
    }

    pub fn load() -> Result<Self, envconfig::Error> {
        // dotenv().ok() is already called in the main.rs
        Ok(Self {
            server: ServerConfig::init_from_env()?,
            registry: RegistryConfig::init_from_env()?,
        })
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn registry(&self) -> &RegistryConfig {
        &self.registry
    }
}

impl From<HashMap<&str, &str>> for ServerConfig {
    fn from(value: HashMap<&str, &str>) -> Self {
        let environment = value
            .get("ENVIRONMENT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(Environment::Test);
        let host = value.get("HOST").unwrap_or(&"localhost").to_string();
        let port = value
            .get("PORT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(3007);
        let app_url = value
            .get("APP_URL")
            .unwrap_or(&"http://localhost:3007")
            .to_string();
        let timeout = value
            .get("TIMEOUT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(30000);
        let burst_rate_limit = value
            .get("BURST_RATE_LIMIT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(10);
        let burst_size_limit = value
            .get("BURST_SIZE_LIMIT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(15);
        let cache_size = value
            .get("CACHE_SIZE")
            .and_then(|value| value.parse().ok())
            .unwrap_or(10000);

        Self {
            environment,
            host,
            port,
            app_url,
            timeout,
            burst_rate_limit,
            burst_size_limit,
            cache_size,
        }
    }
}

impl From<HashMap<&str, &str>> for RegistryConfig {
    fn from(value: HashMap<&str, &str>) -> Self {
        let vcs_api_url = value
            .get("VCS_API_URL")
            .unwrap_or(&"https://api.github.com")
            .to_string();
        let default_page_limit = value
            .get("DEFAULT_PAGE_LIMIT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(30);
        let max_page_limit = value
            .get("MAX_PAGE_LIMIT")
            .and_then(|value| value.parse().ok())
            .unwrap_or(100);

        Self {
            vcs_api_url,
            default_page_limit,
            max_page_limit,
        }
    }
}

impl From<HashMap<&str, &str>> for Config {
    fn from(value: HashMap<&str, &str>) -> Self {
        let server = ServerConfig::from(value.clone());
        let registry = RegistryConfig::from(value);
        Self { server, registry }
    }
}
