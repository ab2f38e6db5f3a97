//! Argon2 password hashing.
//!
//! Stored hashes are PHC strings produced with Argon2id default parameters.
//! Verification runs on the blocking pool since a single check takes
//! tens of milliseconds.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AuthError;

/// Hash a password for storage using Argon2id.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
///
/// # Example
///
/// ```
/// use fittrack_auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("hunter2").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("hunter2", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// `Ok(false)` on mismatch; `Err` only if the hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// Verify on the blocking pool. A malformed stored hash counts as a mismatch.
pub(crate) async fn verify_password_blocking(
    password: String,
    hash: String,
) -> Result<bool, AuthError> {
    let outcome = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::internal(format!("password verification task failed: {e}")))?;

    match outcome {
        Ok(matched) => Ok(matched),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            Ok(false)
        }
    }
}

/// Stand-in hash checked for accounts that have no usable one.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| hash_password("fittrack-unknown-account").ok())
        .as_deref()
}

/// Run one full verification against the stand-in hash and discard the
/// result, so a rejected unknown account costs the same as a wrong password.
pub(crate) async fn verify_against_dummy(password: String) {
    let outcome = tokio::task::spawn_blocking(move || {
        if let Some(hash) = dummy_hash() {
            let _ = verify_password(&password, hash);
        }
    })
    .await;

    if let Err(e) = outcome {
        tracing::warn!(error = %e, "Dummy password verification task failed");
    }
}
