use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

/// Minimum length of the session signing secret, in bytes.
pub const MIN_SESSION_SECRET_BYTES: usize = 64;

/// Value of `DATABASE_URL` that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database, or `memory`.
    pub database_url: String,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The duration of a session in days.
    pub session_duration_days: i64,
    /// The key used to sign session cookies.
    pub session_secret: Zeroizing<Vec<u8>>,
    /// Whether cookies carry the `Secure` flag.
    pub secure_cookies: bool,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Whether the auth guard re-checks that the session's user still exists.
    pub verify_session_user: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let mut secret_hex = env::var("SESSION_SECRET")
            .context("SESSION_SECRET must be set (generate with: openssl rand -hex 64)")?;

        let secret_bytes = hex::decode(&secret_hex)
            .context("SESSION_SECRET must be valid hexadecimal")?;

        secret_hex.zeroize();

        if secret_bytes.len() < MIN_SESSION_SECRET_BYTES {
            anyhow::bail!("SESSION_SECRET must be at least 64 bytes (128 hex characters)");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set (or \"memory\" for an in-process store)")?,
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8001".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            session_duration_days: env::var("SESSION_DURATION_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Invalid SESSION_DURATION_DAYS")?,
            session_secret: Zeroizing::new(secret_bytes),
            secure_cookies: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string()) == "production",
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "static".to_string())
                .into(),
            verify_session_user: env::var("SESSION_VERIFY_USER")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Whether the in-process store was requested instead of Postgres.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}
