use crate::directory::DirectoryLayout;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_LDAP_URL: &str = "ldap://127.0.0.1:389";
const DEFAULT_BASE_PATH: &str = "o=c_plusplus_project";
const DEFAULT_CONNECT_TIMEOUT_SECS: &str = "10";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the provisioner.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub ldap: LdapConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            ldap: LdapConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection and bind settings for the directory server.
#[derive(Clone)]
pub struct LdapConfig {
    pub url: String,
    pub bind_dn: String,
    pub bind_password: String,
    pub base_path: String,
    pub connect_timeout: Duration,
    pub starttls: bool,
}

impl LdapConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("LDAP_URL").unwrap_or_else(|_| DEFAULT_LDAP_URL.to_string());
        if !(url.starts_with("ldap://") || url.starts_with("ldaps://") || url.starts_with("ldapi://"))
        {
            return Err(ConfigError::InvalidLdapUrl { value: url });
        }

        let base_path = env::var("LDAP_BASE_PATH")
            .unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string())
            .trim()
            .to_string();
        if base_path.is_empty() {
            return Err(ConfigError::EmptyBasePath);
        }

        let timeout_secs = env::var("LDAP_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_CONNECT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let starttls = match env::var("LDAP_STARTTLS") {
            Ok(value) => parse_flag("LDAP_STARTTLS", &value)?,
            Err(_) => false,
        };

        Ok(Self {
            url,
            bind_dn: env::var("LDAP_BIND_DN").unwrap_or_default(),
            bind_password: env::var("LDAP_BIND_PASSWORD").unwrap_or_default(),
            base_path,
            connect_timeout: Duration::from_secs(timeout_secs),
            starttls,
        })
    }

    pub fn layout(&self) -> DirectoryLayout {
        DirectoryLayout::new(self.base_path.clone())
    }
}

impl fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapConfig")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"<redacted>")
            .field("base_path", &self.base_path)
            .field("connect_timeout", &self.connect_timeout)
            .field("starttls", &self.starttls)
            .finish()
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLdapUrl { value: String },
    EmptyBasePath,
    InvalidTimeout,
    InvalidFlag { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLdapUrl { value } => write!(
                f,
                "LDAP_URL must use the ldap://, ldaps:// or ldapi:// scheme (got '{value}')"
            ),
            ConfigError::EmptyBasePath => write!(f, "LDAP_BASE_PATH must not be empty"),
            ConfigError::InvalidTimeout => {
                write!(f, "LDAP_CONNECT_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
