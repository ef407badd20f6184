use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::{
    error::{AppError, Result},
    models::user::User,
};

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by their exact email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Stores a new user. Fails with `EmailTaken` when the email exists.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User>;
}

/// `UserRepository` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached("SELECT id, email, password FROM users WHERE email = $1")
            .await?;
        let row = client.query_opt(&stmt, &[&email]).await?;
        Ok(row.as_ref().map(User::try_from).transpose()?)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        let stmt = tx
            .prepare_cached(
                r#"
                INSERT INTO users (email, password)
                VALUES ($1, $2)
                RETURNING id, email, password
                "#,
            )
            .await?;

        let row = match tx.query_one(&stmt, &[&email, &password_hash]).await {
            Ok(row) => row,
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                return Err(AppError::EmailTaken);
            }
            Err(e) => return Err(e.into()),
        };
        let user = User::try_from(&row)?;
        tx.commit().await?;
        Ok(user)
    }
}
