//! Configuration module for loading and parsing TOML configuration files.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Wildcard entry accepted by the CORS lists.
pub const WILDCARD: &str = "*";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Frontend build location.
    pub frontend: FrontendConfig,
    /// Cross-origin policy.
    pub cors: CorsConfig,
    /// API documentation settings.
    pub docs: DocsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Frontend build configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Build output directory. Relative paths resolve against the application directory.
    pub dist_dir: PathBuf,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            dist_dir: PathBuf::from("web").join("dist"),
        }
    }
}

impl FrontendConfig {
    /// Resolves the build directory against `base` unless it is already absolute.
    #[must_use]
    pub fn resolve_dist_dir(&self, base: &Path) -> PathBuf {
        if self.dist_dir.is_absolute() {
            self.dist_dir.clone()
        } else {
            base.join(&self.dist_dir)
        }
    }
}

/// Cross-origin resource sharing policy.
///
/// Each list accepts either explicit values or the single entry `"*"`.
/// The defaults are fully permissive and must be narrowed before the
/// server is exposed publicly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins, e.g. `https://grid.example.com`.
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods.
    pub allowed_methods: Vec<String>,
    /// Allowed request headers.
    pub allowed_headers: Vec<String>,
    /// Whether credentials (cookies, authorization headers) are allowed.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![WILDCARD.to_string()],
            allowed_methods: vec![WILDCARD.to_string()],
            allowed_headers: vec![WILDCARD.to_string()],
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    /// Returns true if the list contains the wildcard entry.
    #[must_use]
    pub fn is_wildcard(values: &[String]) -> bool {
        values.iter().any(|v| v == WILDCARD)
    }
}

/// API documentation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Whether Swagger UI and the OpenAPI document are served.
    pub enabled: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads configuration from `path` if the file exists, otherwise returns defaults.
    ///
    /// # Errors
    /// Returns error if an existing file cannot be read or parsed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "server host cannot be empty".to_string(),
            ));
        }
        if self.frontend.dist_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "frontend dist_dir cannot be empty".to_string(),
            ));
        }

        let lists = [
            ("allowed_origins", &self.cors.allowed_origins),
            ("allowed_methods", &self.cors.allowed_methods),
            ("allowed_headers", &self.cors.allowed_headers),
        ];
        for (name, values) in lists {
            if values.is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "cors {} cannot be empty",
                    name
                )));
            }
            if CorsConfig::is_wildcard(values) && values.len() > 1 {
                return Err(ConfigError::InvalidValue(format!(
                    "cors {} cannot mix \"*\" with explicit values",
                    name
                )));
            }
        }

        Ok(())
    }
}
