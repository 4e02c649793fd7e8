//! Merchant authentication service.
//!
//! Email and password accounts hashed with Argon2id. Sign-up creates the
//! merchant's shop in the same step.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;

use converty_core::{Email, MerchantUserId, Slug};

use crate::db::{NewMerchant, RepositoryError, UserRepository};
use crate::models::{MerchantUser, Shop};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Attempts at finding a free slug before giving up.
const SLUG_ATTEMPTS: usize = 5;

/// Sign-up details as submitted.
#[derive(Debug, Clone, Copy)]
pub struct Signup<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
    pub shop_name: &'a str,
}

pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a merchant and create their shop and free subscription.
    ///
    /// The shop slug is derived from the shop name; a short random suffix is
    /// appended when the plain slug is taken.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`, `AuthError::WeakPassword`,
    /// `AuthError::PasswordMismatch` or `AuthError::InvalidShopName` for bad
    /// input, and `AuthError::UserAlreadyExists` if the email is registered.
    pub async fn register(&self, signup: Signup<'_>) -> Result<(MerchantUser, Shop), AuthError> {
        let email = Email::parse(signup.email)?;
        validate_password(signup.password)?;
        if signup.password != signup.password_confirm {
            return Err(AuthError::PasswordMismatch);
        }
        let shop_name = signup.shop_name.trim();
        if shop_name.is_empty() {
            return Err(AuthError::InvalidShopName("Shop name is required".to_string()));
        }

        let slug = self.free_slug(shop_name).await?;
        let password_hash = hash_password(signup.password)?;

        self.users
            .create_with_shop(NewMerchant {
                email: &email,
                password_hash: &password_hash,
                shop_name,
                shop_slug: &slug,
                email_confirmed: false,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) if msg.starts_with("email") => {
                    AuthError::UserAlreadyExists
                }
                other => AuthError::Repository(other),
            })
    }

    /// Verify an email and password.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any mismatch.
    pub async fn login(&self, email: &str, password: &str) -> Result<MerchantUser, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Replace a merchant's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` or a repository error.
    pub async fn set_password(&self, id: MerchantUserId, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        self.users.update_password_hash(id, &password_hash).await?;
        Ok(())
    }

    async fn free_slug(&self, shop_name: &str) -> Result<Slug, AuthError> {
        let base = Slug::from_name(shop_name)
            .ok_or_else(|| AuthError::InvalidShopName("Shop name needs letters or digits".to_string()))?;

        if !self.users.slug_taken(&base).await? {
            return Ok(base);
        }

        for _ in 0..SLUG_ATTEMPTS {
            let candidate = base.with_suffix(&random_suffix());
            if !self.users.slug_taken(&candidate).await? {
                return Ok(candidate);
            }
        }

        tracing::warn!(slug = %base, "No free slug after retries");
        Err(AuthError::InvalidShopName(
            "That shop name is taken, try another".to_string(),
        ))
    }
}

/// Four lowercase alphanumerics.
fn random_suffix() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(4)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` for passwords shorter than
/// [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("TestPassword123!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("TestPassword123!", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("whatever", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_random_suffix_is_slug_safe() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));

        let slug = Slug::parse("tech-store").unwrap().with_suffix(&suffix);
        assert!(Slug::parse(slug.as_str()).is_ok());
    }

    #[test]
    fn test_user_facing_errors() {
        assert!(AuthError::InvalidCredentials.is_user_facing());
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert!(!AuthError::PasswordHash.is_user_facing());
    }
}
