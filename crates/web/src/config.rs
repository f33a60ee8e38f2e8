//! Web application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PURBEURRE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PURBEURRE_BASE_URL` - Public URL of the site (decides the `Secure` cookie flag)
//! - `PURBEURRE_SESSION_SECRET` - Cookie signing key (min 64 chars, high entropy)
//!
//! ## Optional
//! - `PURBEURRE_HOST` - Bind address (default: 127.0.0.1)
//! - `PURBEURRE_PORT` - Listen port (default: 8000)
//! - `PURBEURRE_RUN_MIGRATIONS` - Apply pending migrations at startup (default: true)
//! - `PURBEURRE_TRUSTED_PROXIES` - Comma-separated reverse proxy IPs whose
//!   `X-Forwarded-For`/`X-Real-IP` headers are believed (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Cookie signing keys must be at least 512 bits.
const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "purbeurre",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Session cookie signing key
    pub session_secret: SecretString,
    /// Whether to apply pending migrations on startup
    pub run_migrations: bool,
    /// Reverse proxies allowed to report the client address in forwarding headers
    pub trusted_proxies: Vec<IpAddr>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("PURBEURRE_DATABASE_URL")?;
        let host = get_env_or_default("PURBEURRE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PURBEURRE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PURBEURRE_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PURBEURRE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("PURBEURRE_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PURBEURRE_BASE_URL".to_string(), e.to_string())
        })?;
        let session_secret = get_validated_secret("PURBEURRE_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "PURBEURRE_SESSION_SECRET")?;
        let run_migrations = parse_bool(
            "PURBEURRE_RUN_MIGRATIONS",
            &get_env_or_default("PURBEURRE_RUN_MIGRATIONS", "true"),
        )?;
        let trusted_proxies = parse_ip_list(
            "PURBEURRE_TRUSTED_PROXIES",
            &get_env_or_default("PURBEURRE_TRUSTED_PROXIES", ""),
        )?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            run_migrations,
            trusted_proxies,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (session cookies get `Secure`).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Parse a comma-separated list of IP addresses. Blank entries are skipped.
fn parse_ip_list(key: &str, value: &str) -> Result<Vec<IpAddr>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), format!("'{s}': {e}")))
        })
        .collect()
}

/// Validate that a session secret is long enough to be a cookie signing key.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> WebConfig {
        WebConfig {
            database_url: SecretString::from("postgres://localhost/purbeurre_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: base_url.to_string(),
            session_secret: SecretString::from("x".repeat(64)),
            run_migrations: false,
            trusted_proxies: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("changeme-changeme-changeme", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(40), "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        let short = SecretString::from("k".repeat(63));
        assert!(validate_session_secret(&short, "TEST_SESSION").is_err());

        let long_enough = SecretString::from("k".repeat(64));
        assert!(validate_session_secret(&long_enough, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("FLAG", "TRUE").unwrap());
        assert!(parse_bool("FLAG", "1").unwrap());
        assert!(!parse_bool("FLAG", "off").unwrap());
        assert!(parse_bool("FLAG", "maybe").is_err());
    }

    #[test]
    fn test_parse_ip_list() {
        assert!(parse_ip_list("PROXIES", "").unwrap().is_empty());
        assert_eq!(
            parse_ip_list("PROXIES", " 10.0.0.1, ::1 ,").unwrap(),
            vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse().unwrap()]
        );
        assert!(matches!(
            parse_ip_list("PROXIES", "10.0.0.1, nginx").unwrap_err(),
            ConfigError::InvalidEnvVar(key, _) if key == "PROXIES"
        ));
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config("http://localhost:8000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!test_config("http://localhost:8000").is_secure());
        assert!(test_config("https://purbeurre.fr").is_secure());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = test_config("http://localhost:8000");
        config.session_secret = SecretString::from("very-private-signing-key-value".repeat(3));
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("very-private-signing-key-value"));
        assert!(!debug_output.contains("purbeurre_test"));
    }
}
