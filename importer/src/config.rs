//! Client configuration.
//!
//! Credentials and the service location are carried in an explicit
//! [`ClientConfig`] value handed to the client, never read from globals
//! at call time.
//!
//! # Environment variables
//!
//! | Variable          | Required | Default | Meaning                          |
//! |-------------------|----------|---------|----------------------------------|
//! | `PM_USERNAME`     | yes      |         | Portfolio Manager username       |
//! | `PM_PASSWORD`     | yes      |         | Portfolio Manager password       |
//! | `PM_ENVIRONMENT`  | no       | `test`  | `test` or `production`           |
//! | `PM_BASE_URL`     | no       |         | Overrides the environment URL    |
//! | `PM_TIMEOUT_SECS` | no       | `30`    | Per-request timeout              |

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::encoder::EncodeOptions;
use crate::error::{ConfigError, ConfigResult};

const TEST_BASE_URL: &str = "https://portfoliomanager.energystar.gov/wstest";
const PRODUCTION_BASE_URL: &str = "https://portfoliomanager.energystar.gov/ws";

/// Default per-request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default pause between two property submissions
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Portfolio Manager deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Test,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Test => TEST_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Test => write!(f, "TEST"),
            Environment::Production => write!(f, "PRODUCTION"),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "test" | "wstest" => Ok(Environment::Test),
            "production" | "prod" | "ws" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                var: "PM_ENVIRONMENT".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Connection settings for [`crate::client::PortfolioManagerClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub environment: Environment,
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given environment
    pub fn new(username: impl Into<String>, password: impl Into<String>, environment: Environment) -> Self {
        Self {
            environment,
            base_url: environment.base_url().to_string(),
            username: username.into(),
            password: password.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a configuration from `PM_*` environment variables
    pub fn from_env() -> ConfigResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let username = required_var("PM_USERNAME")?;
        let password = required_var("PM_PASSWORD")?;

        let environment = match env::var("PM_ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::default(),
        };

        let mut config = Self::new(username, password, environment);

        if let Ok(url) = env::var("PM_BASE_URL") {
            config = config.with_base_url(&url);
        }

        if let Ok(secs) = env::var("PM_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "PM_TIMEOUT_SECS".to_string(),
                value: secs.clone(),
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Switch environment, resetting the base URL to that environment's
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self.base_url = environment.base_url().to_string();
        self
    }

    /// Point the client at a custom base URL
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for a service path such as `/account`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn required_var(name: &str) -> ConfigResult<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

/// Options for a batch import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Pause between two consecutive submissions (rate limit)
    pub delay: Duration,
    /// Encoder options used for every row
    pub encode: EncodeOptions,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            encode: EncodeOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_urls() {
        let config = ClientConfig::new("user", "pass", Environment::Test);
        assert_eq!(config.base_url, "https://portfoliomanager.energystar.gov/wstest");

        let config = config.with_environment(Environment::Production);
        assert_eq!(config.base_url, "https://portfoliomanager.energystar.gov/ws");
        assert_eq!(config.environment.to_string(), "PRODUCTION");
    }

    #[test]
    fn test_url_joining() {
        let config = ClientConfig::new("user", "pass", Environment::Test)
            .with_base_url("http://localhost:8080/ws/");
        assert_eq!(config.url("/account"), "http://localhost:8080/ws/account");
        assert_eq!(config.url("property/7"), "http://localhost:8080/ws/property/7");
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_with_timeout() {
        let config = ClientConfig::new("user", "pass", Environment::Test).with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_hides_password() {
        let config = ClientConfig::new("user", "s3cret", Environment::Test);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("user"));
    }

    #[test]
    fn test_default_import_options() {
        let opts = ImportOptions::default();
        assert_eq!(opts.delay, Duration::from_secs(1));
    }
}
