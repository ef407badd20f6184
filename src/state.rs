use std::sync::Arc;
use tower_cookies::Key;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::repositories::{
    memory::{MemoryProductRepository, MemoryUserRepository},
    product::{PgProductRepository, ProductRepository},
    user::{PgUserRepository, UserRepository},
};

/// The application's state, built once at startup and cloned into every
/// request.
#[derive(Clone)]
pub struct AppState {
    /// The user store.
    pub users: Arc<dyn UserRepository>,
    /// The product store.
    pub products: Arc<dyn ProductRepository>,
    /// The application's configuration.
    pub config: Config,
    /// The key that signs session cookies.
    pub session_key: Key,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// Connects to PostgreSQL and creates missing tables, or builds the
    /// in-process store when `DATABASE_URL` is `memory`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        if config.uses_memory_store() {
            tracing::warn!("⚠️ DATABASE_URL=memory: data lives only as long as this process");
            return Self::in_memory(config);
        }

        let pool = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        crate::db::ensure_schema(&pool).await?;

        Self::with_repositories(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgProductRepository::new(pool)),
        )
    }

    /// Creates an `AppState` over fresh in-process repositories.
    pub fn in_memory(config: &Config) -> Result<Self> {
        Self::with_repositories(
            config,
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryProductRepository::new()),
        )
    }

    /// Creates an `AppState` over the given repositories.
    pub fn with_repositories(
        config: &Config,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Result<Self> {
        let session_key = Key::try_from(config.session_secret.as_slice())
            .map_err(|e| AppError::Internal(format!("Invalid session secret: {}", e)))?;

        Ok(AppState {
            users,
            products,
            config: config.clone(),
            session_key,
        })
    }
}
