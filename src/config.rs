//! Chat server configuration
//!
//! Everything is environment-sourced. The Mongo connection string is the
//! only hard requirement; startup fails without it.

use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    /// MongoDB connection string (MONGO_URI, required)
    pub mongo_uri: String,
    /// Database name (MONGO_DB)
    pub mongo_db: String,
    /// Shared secret for bearer-token verification (JWT_SECRET)
    pub jwt_secret: String,
    /// Base URL of the external user service (USER_SERVICE)
    pub user_service: String,
    /// Listen port (PORT)
    pub port: u16,
    /// Directory for uploaded image files (MEDIA_DIR)
    pub media_dir: PathBuf,
    /// Base URL used when building media links (PUBLIC_BASE_URL)
    pub public_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mongo_uri =
            std::env::var("MONGO_URI").context("MONGO_URI must be set (mongodb://...)")?;
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a number")?,
            Err(_) => 5002,
        };
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        Ok(Self {
            mongo_uri,
            mongo_db: std::env::var("MONGO_DB").unwrap_or_else(|_| "chat-service".to_string()),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            user_service: std::env::var("USER_SERVICE")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            port,
            media_dir: std::env::var("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            public_base_url,
        })
    }

    /// Ensure the media directory exists
    pub async fn ensure_dirs(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.media_dir).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so everything lives in one test.
    #[test]
    fn from_env_requires_mongo_uri_and_defaults_the_rest() {
        std::env::remove_var("MONGO_URI");
        assert!(Config::from_env().is_err());

        std::env::set_var("MONGO_URI", "mongodb://localhost:27017");
        std::env::remove_var("MONGO_DB");
        std::env::remove_var("PORT");
        std::env::remove_var("PUBLIC_BASE_URL");
        let config = Config::from_env().unwrap();
        assert_eq!(config.mongo_db, "chat-service");
        assert_eq!(config.port, 5002);
        assert_eq!(config.public_base_url, "http://localhost:5002");

        std::env::set_var("PORT", "not-a-port");
        assert!(Config::from_env().is_err());
        std::env::remove_var("PORT");
        std::env::remove_var("MONGO_URI");
    }
}
