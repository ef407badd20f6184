use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use zeroize::Zeroize;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 2;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;
/// Salt length in bytes.
const SALT_BYTES: usize = 16;

/// Failures of the credential service.
///
/// The two format variants mean the stored credential is corrupt; they are
/// never reported to a caller as a wrong password.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    /// The stored hash is empty.
    #[error("stored password hash is empty")]
    UnknownHashFormat,

    /// The stored hash is present but not a parseable PHC string.
    #[error("stored password hash is malformed: {0}")]
    InvalidHashFormat(String),

    /// Hashing itself failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

fn argon2() -> Result<Argon2<'static>, CredentialError> {
    let params = ParamsBuilder::new()
        .m_cost(ARGON2_MEMORY_MB * 1024)
        .t_cost(ARGON2_ITERATIONS)
        .p_cost(ARGON2_PARALLELISM)
        .build()
        .map_err(|e| CredentialError::Hashing(format!("Argon2 params: {}", e)))?;

    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hashes a password using Argon2id with a fresh random salt.
///
/// Two calls with the same password yield different hashes.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the PHC-format hash.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| CredentialError::Hashing(format!("Salt encoding error: {}", e)))?;

    let password_hash = argon2()?
        .hash_password(&password_bytes, &salt)
        .map_err(|e| CredentialError::Hashing(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a stored hash.
///
/// Parameters are read from the hash itself, so hashes produced with older
/// cost settings keep verifying.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `hash` - The stored hash.
///
/// # Returns
///
/// `Ok(true)` on a match, `Ok(false)` on a mismatch, and a format error when
/// the hash cannot be used at all.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    if hash.is_empty() {
        return Err(CredentialError::UnknownHashFormat);
    }

    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| CredentialError::InvalidHashFormat(e.to_string()))?;

    let mut password_bytes = password.as_bytes().to_vec();
    let result = match Argon2::default().verify_password(&password_bytes, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::InvalidHashFormat(e.to_string())),
    };

    password_bytes.zeroize();
    tracing::debug!("Password verification completed");
    result
}
