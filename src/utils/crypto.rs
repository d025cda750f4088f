use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::{Error, Result};

fn hash_blocking(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))
}

fn verify_blocking(plain: &str, hashed: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|e| Error::Internal(format!("stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Argon2 is CPU bound, so both directions run on the blocking pool.
pub async fn hash_password(plain: &str) -> Result<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&plain))
        .await
        .map_err(|e| Error::Internal(e.to_string()))?
}

pub async fn verify_password(plain: &str, hashed: &str) -> Result<bool> {
    let plain = plain.to_owned();
    let hashed = hashed.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&plain, &hashed))
        .await
        .map_err(|e| Error::Internal(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hashed = hash_password("rahasia123").await.unwrap();
        assert!(hashed.starts_with("$argon2"));
        assert!(verify_password("rahasia123", &hashed).await.unwrap());
        assert!(!verify_password("salah", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("x", "not-a-hash").await.is_err());
    }
}
