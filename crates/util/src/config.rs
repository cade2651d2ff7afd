use std::{env, fmt};

use chrono_tz::Tz;

use super::DEFAULT_INVOICE_PREFIX;

/// Application runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }

    /// Returns the canonical name used for logging labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "plain" => Ok(Self::Text),
            _ => Err(ConfigError::InvalidOutput(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

/// Runtime configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    /// Zone used to decide which calendar day and month "now" falls in.
    pub timezone: Tz,
    pub invoice_prefix: String,
    pub output: OutputFormat,
}

impl AppConfig {
    /// Constructs the configuration by reading and validating environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_value = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let environment = Environment::from_str(&env_value)?;

        let tz_value = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let timezone = tz_value
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(tz_value.clone()))?;

        let invoice_prefix =
            env::var("APP_INVOICE_PREFIX").unwrap_or_else(|_| DEFAULT_INVOICE_PREFIX.to_string());
        validate_prefix(&invoice_prefix)?;

        let output = match env::var("APP_OUTPUT") {
            Ok(value) => OutputFormat::parse(&value)?,
            Err(_) => OutputFormat::Json,
        };

        Ok(Self {
            environment,
            timezone,
            invoice_prefix,
            output,
        })
    }
}

fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    let valid = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidInvoicePrefix(prefix.to_string()))
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    InvalidEnvironment(String),
    InvalidTimezone(String),
    InvalidInvoicePrefix(String),
    InvalidOutput(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironment(value) => write!(
                f,
                "APP_ENV must be one of 'development', 'production', or 'test' (got {value})"
            ),
            Self::InvalidTimezone(value) => {
                write!(f, "APP_TIMEZONE is not a known IANA timezone (got {value})")
            }
            Self::InvalidInvoicePrefix(value) => write!(
                f,
                "APP_INVOICE_PREFIX must be non-empty ASCII letters, digits or '-' (got {value:?})"
            ),
            Self::InvalidOutput(value) => {
                write!(f, "APP_OUTPUT must be 'json' or 'text' (got {value})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
