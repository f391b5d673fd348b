//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS (comma-separated)
    pub client_origin: String,
    /// Race sessions idle for longer than this are evicted
    pub session_ttl: Duration,
    /// How often the eviction sweep runs
    pub session_sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            client_origin: env::var("CLIENT_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            session_ttl: Duration::from_secs(parse_or("SESSION_TTL_SECS", 900)?),
            session_sweep_interval: Duration::from_secs(parse_or("SESSION_SWEEP_SECS", 60)?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            client_origin: "http://localhost:5173".to_string(),
            session_ttl: Duration::from_secs(900),
            session_sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Read an optional numeric variable
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Environment variable {0} must be a number")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_variables_fall_back_and_validate() {
        env::remove_var("NIGHTWATCH_TEST_UNSET");
        assert_eq!(parse_or("NIGHTWATCH_TEST_UNSET", 42u64).unwrap(), 42);

        env::set_var("NIGHTWATCH_TEST_BAD", "soon");
        assert!(matches!(
            parse_or::<u64>("NIGHTWATCH_TEST_BAD", 1),
            Err(ConfigError::InvalidNumber("NIGHTWATCH_TEST_BAD"))
        ));

        env::set_var("NIGHTWATCH_TEST_GOOD", " 30 ");
        assert_eq!(parse_or("NIGHTWATCH_TEST_GOOD", 1u64).unwrap(), 30);
    }
}
