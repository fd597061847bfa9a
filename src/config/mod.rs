//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (informational, used when logging the listen URL)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// SQLite database URL, e.g. `sqlite:./data/linkfeed.db`
    pub database_url: String,

    /// Connection pool size
    pub database_max_connections: u32,

    /// HS256 secret for token verification
    pub jwt_secret: String,

    /// True when `JWT_SECRET` was unset and a development secret was generated
    pub jwt_secret_generated: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let (jwt_secret, jwt_secret_generated) = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => (secret, false),
            _ => (dev_secret(), true),
        };

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./data/linkfeed.db".to_string()),

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            jwt_secret,
            jwt_secret_generated,
        })
    }
}

// Tokens signed with this secret stop verifying once the process restarts.
fn dev_secret() -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    std::time::SystemTime::now().hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    format!("dev-secret-{}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_secret_is_prefixed() {
        assert!(dev_secret().starts_with("dev-secret-"));
    }
}
