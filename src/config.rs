use anyhow::{bail, Context, Result};
use secrecy::SecretBox;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

/// Development-only fallback; production refuses to start without `JWT_SECRET`.
const DEV_JWT_SECRET: &str = "hostelmate-dev-secret-change-me";

/// `DATABASE_URL` value that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

#[derive(Debug)]
pub struct AuthConfig {
    pub jwt_secret: SecretBox<String>,
    pub token_expiry_hours: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
    pub seed_demo_data: bool,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Server configuration
        let host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Failed to parse SERVER_HOST")?;

        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("Failed to parse SERVER_PORT")?;

        // Database configuration
        let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let db_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(val) => Some(val.parse().context("Failed to parse DATABASE_MAX_CONNECTIONS")?),
            Err(_) => Some(10),
        };
        let db_min_connections = match env::var("DATABASE_MIN_CONNECTIONS") {
            Ok(val) => Some(val.parse().context("Failed to parse DATABASE_MIN_CONNECTIONS")?),
            Err(_) => Some(1),
        };

        // App configuration
        let environment = env::var("APP_ENVIRONMENT")
            .ok()
            .and_then(|val| val.parse::<Environment>().ok())
            .unwrap_or_default();

        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "HostelMate".to_string());

        let seed_demo_data = match env::var("SEED_DEMO_DATA") {
            Ok(val) => parse_bool(&val).context("Failed to parse SEED_DEMO_DATA")?,
            Err(_) => false,
        };

        let log_format = match env::var("LOG_FORMAT") {
            Ok(val) => val.parse().map_err(anyhow::Error::msg)?,
            Err(_) if environment == Environment::Production => LogFormat::Json,
            Err(_) => LogFormat::Pretty,
        };

        // Auth configuration
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == Environment::Production => {
                bail!("JWT_SECRET must be set in production")
            }
            _ => DEV_JWT_SECRET.to_string(),
        };

        let token_expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(val) => val.parse().context("Failed to parse JWT_EXPIRY_HOURS")?,
            Err(_) => 24 * 7,
        };

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: db_url,
                max_connections: db_max_connections,
                min_connections: db_min_connections,
            },
            auth: AuthConfig {
                jwt_secret: SecretBox::new(Box::new(jwt_secret)),
                token_expiry_hours,
            },
            app: AppConfig {
                name: app_name,
                environment,
                seed_demo_data,
                log_format,
            },
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

// Use once_cell for a global config instance that's initialized once
use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Arc<Config>> = OnceCell::new();

/// Loads the process-wide configuration on first call.
pub fn init() -> Result<Arc<Config>> {
    CONFIG
        .get_or_try_init(|| Config::from_env().map(Arc::new))
        .cloned()
}

#[cfg(test)]
impl Config {
    /// Configuration used by in-process tests.
    pub fn for_tests() -> Self {
        Config {
            server: ServerConfig {
                host: IpAddr::from([127, 0, 0, 1]),
                port: 0,
            },
            database: DatabaseConfig {
                url: MEMORY_DATABASE_URL.to_string(),
                max_connections: None,
                min_connections: None,
            },
            auth: AuthConfig {
                jwt_secret: SecretBox::new(Box::new("test-secret".to_string())),
                token_expiry_hours: 1,
            },
            app: AppConfig {
                name: "HostelMate".to_string(),
                environment: Environment::Development,
                seed_demo_data: false,
                log_format: LogFormat::Pretty,
            },
        }
    }
}
