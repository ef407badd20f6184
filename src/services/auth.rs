use std::sync::OnceLock;
use zeroize::Zeroizing;

use crate::crypto::password::{hash_password, verify_password, CredentialError};
use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::repositories::user::UserRepository;
use crate::validation::auth::validate_registration;

/// Hash verified when the email is unknown, so both failure paths cost the
/// same Argon2 work.
static DECOY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Runs CPU-bound credential work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Credential task failed: {}", e)))
}

async fn verify(password: &str, hash: String) -> Result<std::result::Result<bool, CredentialError>> {
    let password = Zeroizing::new(password.to_string());
    run_blocking(move || verify_password(&password, &hash)).await
}

async fn burn_decoy_verification(password: &str) {
    let password = Zeroizing::new(password.to_string());
    let _ = run_blocking(move || {
        let decoy = DECOY_HASH.get_or_init(|| hash_password("decoy-password").ok());
        if let Some(hash) = decoy {
            let _ = verify_password(&password, hash);
        }
    })
    .await;
}

/// Registers a new user.
///
/// # Arguments
///
/// * `users` - The user repository.
/// * `email` - The identity of the new account.
/// * `password` - The plaintext password; only its hash is stored.
///
/// # Returns
///
/// The created `User`, `EmailTaken` when the email already has an account,
/// or `Validation` for unusable input.
pub async fn register(users: &dyn UserRepository, email: &str, password: &str) -> Result<User> {
    validate_registration(email, password)?;

    if users.find_by_email(email).await?.is_some() {
        tracing::warn!("Registration attempt for existing email: {}", email);
        return Err(AppError::EmailTaken);
    }

    let plain = Zeroizing::new(password.to_string());
    let hash = run_blocking(move || hash_password(&plain))
        .await?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::debug!("🔐 Creating user: {}", email);
    let user = users.create(email, &hash).await.inspect_err(|e| {
        if !matches!(e, AppError::EmailTaken) {
            tracing::error!("❌ Error creating user {}: {}", email, e);
        }
    })?;

    tracing::info!("✅ User created successfully: {}", user.email);
    Ok(user)
}

/// Authenticates a user by email and password.
///
/// An unknown email and a wrong password both yield `InvalidCredentials`.
/// A missing or malformed stored hash yields `AccountError`, whose detail is
/// only logged.
pub async fn login(users: &dyn UserRepository, email: &str, password: &str) -> Result<User> {
    let Some(user) = users.find_by_email(email).await? else {
        burn_decoy_verification(password).await;
        tracing::warn!("Login attempt for non-existent user: {}", email);
        return Err(AppError::InvalidCredentials);
    };

    let hash = match user.password_hash.clone() {
        Some(hash) if !hash.is_empty() => hash,
        _ => {
            tracing::error!("User {} has no password stored", email);
            return Err(AppError::AccountError(format!(
                "user {} has no password stored",
                email
            )));
        }
    };

    match verify(password, hash).await? {
        Ok(true) => {
            tracing::info!("✅ Successful login for user: {}", email);
            Ok(user)
        }
        Ok(false) => {
            tracing::warn!("Invalid password for user: {}", email);
            Err(AppError::InvalidCredentials)
        }
        Err(e @ (CredentialError::UnknownHashFormat | CredentialError::InvalidHashFormat(_))) => {
            tracing::error!("Unusable password hash for user {}: {}", email, e);
            Err(AppError::AccountError(format!("user {}: {}", email, e)))
        }
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}
