//! Application settings loaded from environment variables.

use std::env;
use std::net::IpAddr;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_PASSWORD_RESET_TTL_MINUTES,
    DEFAULT_PORTAL_URL, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub password_reset_ttl_minutes: i64,
    pub portal_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Reverse proxies whose `X-Forwarded-For` / `X-Real-IP` headers are honoured.
    pub trusted_proxies: Vec<IpAddr>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("password_reset_ttl_minutes", &self.password_reset_ttl_minutes)
            .field("portal_url", &self.portal_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("trusted_proxies", &self.trusted_proxies)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            password_reset_ttl_minutes: parse_var("PASSWORD_RESET_TTL_MINUTES")
                .unwrap_or(DEFAULT_PASSWORD_RESET_TTL_MINUTES),
            portal_url: env::var("PORTAL_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_PORTAL_URL.to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            trusted_proxies: env::var("TRUSTED_PROXIES")
                .map(|list| parse_ip_list(&list))
                .unwrap_or_default(),
        }
    }

    /// Build a configuration with an explicit secret and development defaults.
    ///
    /// Used by the test suite and by tooling that never reads the environment.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            password_reset_ttl_minutes: DEFAULT_PASSWORD_RESET_TTL_MINUTES,
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            trusted_proxies: Vec::new(),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Student portal sign-in page.
    pub fn login_url(&self) -> String {
        format!("{}/login", self.portal_url)
    }

    /// Link a user follows to choose a new password.
    pub fn password_reset_url(&self, token: &str) -> String {
        format!("{}/password-reset/confirm?token={}", self.portal_url, token)
    }
}

/// Comma-separated addresses; unparsable entries are skipped with a warning.
fn parse_ip_list(list: &str) -> Vec<IpAddr> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!(entry, "Ignoring invalid TRUSTED_PROXIES entry");
                None
            }
        })
        .collect()
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let config = Config::with_secret("test-secret-key-for-testing-only-32chars");
        let rendered = format!("{:?}", config);

        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("test-secret-key"));
        assert!(!rendered.contains("postgres://"));
    }

    #[test]
    fn trusted_proxies_parse_and_skip_garbage() {
        let proxies = parse_ip_list(" 10.0.0.1, ::1,not-an-ip,, ");
        assert_eq!(proxies, vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse().unwrap()]);
    }

    #[test]
    fn password_reset_url_embeds_token() {
        let mut config = Config::with_secret("test-secret-key-for-testing-only-32chars");
        config.portal_url = "https://portal.example.org".to_string();

        assert_eq!(
            config.password_reset_url("abc.def"),
            "https://portal.example.org/password-reset/confirm?token=abc.def"
        );
    }
}
