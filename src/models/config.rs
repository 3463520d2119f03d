use std::env;

/// Runtime settings shared with handlers and extractors.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// HMAC secret used to sign bearer tokens.
    pub secret_key: String,
    /// Passphrase hashed into the PIN encryption key.
    pub pin_encryption_key: String,
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

    /// Read the configuration from the environment.
    ///
    /// Returns `None` when `SECRET_KEY` is missing or empty.
    pub fn from_env() -> Option<Self> {
        let secret_key = env::var("SECRET_KEY").ok().filter(|key| !key.is_empty())?;
        let database_url = env::var("DATABASE_URL").unwrap_or("app.db".to_string());
        let address = env::var("ADDRESS").unwrap_or("127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(8080);
        let pin_encryption_key = env::var("PIN_ENCRYPTION_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| secret_key.clone());
        let token_ttl_hours = env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|hours| hours.parse::<i64>().ok())
            .filter(|hours| *hours > 0)
            .unwrap_or(Self::DEFAULT_TOKEN_TTL_HOURS);

        Some(Self {
            database_url,
            address,
            port,
            secret_key,
            pin_encryption_key,
            token_ttl_hours,
        })
    }

    /// Configuration with a fixed secret, for tests.
    pub fn with_secret(secret_key: impl Into<String>) -> Self {
        let secret_key = secret_key.into();
        Self {
            database_url: "app.db".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            pin_encryption_key: secret_key.clone(),
            secret_key,
            token_ttl_hours: Self::DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}
