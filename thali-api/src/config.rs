/// Configuration management for the API server
///
/// Configuration comes from environment variables (a `.env` file is loaded
/// first when present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGINS`: Comma-separated origins, `*` for any (default: *)
/// - `PRODUCTION`: Send HSTS headers (default: false)
/// - `PROTECT_CATALOG_WRITES`: Require an owner token for catalog writes (default: false)
/// - `OWNER_EMAIL` / `OWNER_PASSWORD`: Owner bootstrap credentials
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use thali_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fmt, str::FromStr};

const DEFAULT_PORT: u16 = 5000;
const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    pub owner: OwnerConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins (`*` = permissive)
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,

    /// Attach the token gate + owner role check to catalog writes
    pub protect_catalog_writes: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig").field("secret", &"<redacted>").finish()
    }
}

/// The single email/password pair accepted by owner login
#[derive(Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    pub email: String,

    pub password: String,
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            email: "am@gmail.com".to_string(),
            password: "12345".to_string(),
        }
    }
}

impl fmt::Debug for OwnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl OwnerConfig {
    /// Whether `email`/`password` is exactly the configured pair
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

fn parse_or<T>(value: Option<String>, default: T, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value fails to
    /// parse, or the JWT secret is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(lookup("PORT"), DEFAULT_PORT, "PORT")?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = parse_or(lookup("PRODUCTION"), false, "PRODUCTION")?;
        let protect_catalog_writes =
            parse_or(lookup("PROTECT_CATALOG_WRITES"), false, "PROTECT_CATALOG_WRITES")?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_or(lookup("DATABASE_MAX_CONNECTIONS"), 10u32, "DATABASE_MAX_CONNECTIONS")?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let defaults = OwnerConfig::default();
        let owner = OwnerConfig {
            email: lookup("OWNER_EMAIL").unwrap_or(defaults.email),
            password: lookup("OWNER_PASSWORD").unwrap_or(defaults.password),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
                protect_catalog_writes,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            owner,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Pool settings for `thali_shared::db::pool`
    pub fn pool_config(&self) -> thali_shared::db::pool::DatabaseConfig {
        thali_shared::db::pool::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/thali"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.api.port, 5000);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.api.cors_origins, vec!["*".to_string()]);
        assert!(!config.api.production);
        assert!(!config.api.protect_catalog_writes);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.owner.matches("am@gmail.com", "12345"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/thali"),
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("PROTECT_CATALOG_WRITES", "true"),
            ("OWNER_EMAIL", "boss@example.com"),
            ("OWNER_PASSWORD", "hunter2"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.api.cors_origins.len(), 2);
        assert!(config.api.protect_catalog_writes);
        assert!(config.owner.matches("boss@example.com", "hunter2"));
        assert!(!config.owner.matches("am@gmail.com", "12345"));
    }

    #[test]
    fn test_missing_required_values() {
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).is_err());
        assert!(Config::from_lookup(lookup(&[("DATABASE_URL", "postgresql://localhost/thali")])).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/thali"),
            ("JWT_SECRET", "short"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/thali"),
            ("JWT_SECRET", SECRET),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_owner_match_is_exact() {
        let owner = OwnerConfig::default();
        assert!(!owner.matches("AM@gmail.com", "12345"));
        assert!(!owner.matches("am@gmail.com", "12345 "));
        assert!(!owner.matches("", ""));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?} {:?}", JwtConfig { secret: SECRET.to_string() }, OwnerConfig::default());
        assert!(!debug.contains(SECRET));
        assert!(!debug.contains("12345"));
    }
}
