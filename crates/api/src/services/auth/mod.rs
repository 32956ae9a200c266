//! Authentication service.
//!
//! Handles registration, password login, bearer credential issuance and
//! verification, profile updates and the admin user-management operations.
//! Passwords are hashed with Argon2id; bearer credentials are HS256 JWTs
//! with a configured lifetime.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use storefront_core::{Email, UserId};

use crate::models::User;
use crate::store::{StoreError, UserStore};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum display-name length.
const MIN_NAME_LENGTH: usize = 2;

/// Claims embedded in a bearer credential.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Owning user's id.
    sub: UserId,
    /// Display name at issuance time.
    name: String,
    /// Expiry, seconds since the epoch.
    exp: i64,
}

/// Fields a principal may change on their own profile. Absent fields are
/// left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    credential_lifetime: Duration,
}

impl AuthService {
    /// Create a new authentication service.
    ///
    /// `secret` signs bearer credentials; `credential_lifetime` bounds their
    /// validity.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        secret: &SecretString,
        credential_lifetime: Duration,
    ) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            users,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            credential_lifetime,
        }
    }

    // =========================================================================
    // Registration & Login
    // =========================================================================

    /// Register a new user and issue a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`/`InvalidName`/`WeakPassword` on
    /// validation failure and `AuthError::UserAlreadyExists` if the email is
    /// taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        validate_name(name)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            name: name.to_owned(),
            email,
            password_hash,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.insert(user).await.map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Store(other),
        })?;

        let token = self.issue_credential(&user)?;
        Ok((user, token))
    }

    /// Authenticate with email and password and issue a bearer credential.
    ///
    /// The two failure modes are logged distinctly but both map to the same
    /// generic unauthorized response.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` when either field is empty,
    /// `AuthError::UnknownEmail`/`WrongPassword` on mismatch.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let email = Email::parse(email)?;
        let Some(user) = self.users.get_by_email(&email).await? else {
            tracing::warn!(email = %email, "login attempt for unknown email");
            return Err(AuthError::UnknownEmail);
        };

        if verify_password(password, &user.password_hash).is_err() {
            tracing::warn!(user_id = %user.id, "login attempt with wrong password");
            return Err(AuthError::WrongPassword);
        }

        let token = self.issue_credential(&user)?;
        Ok((user, token))
    }

    // =========================================================================
    // Bearer Credentials
    // =========================================================================

    /// Issue a signed, time-limited bearer credential for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn issue_credential(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            exp: (Utc::now() + self.credential_lifetime).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenIssue)
    }

    /// Resolve a bearer credential to its principal.
    ///
    /// Verifies signature and expiry, then loads the user from the store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenInvalid` for any verification failure,
    /// including a token whose user no longer exists.
    pub async fn resolve_principal(&self, token: &str) -> Result<User, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "bearer credential rejected");
            AuthError::TokenInvalid
        })?;

        self.users
            .get(data.claims.sub)
            .await?
            .ok_or(AuthError::TokenInvalid)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Update a principal's own profile. Only supplied fields change; a new
    /// password is validated and rehashed.
    ///
    /// # Errors
    ///
    /// Returns validation errors as for [`register`](Self::register) and
    /// `AuthError::UserAlreadyExists` when changing to a taken email.
    pub async fn update_profile(
        &self,
        mut user: User,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        if let Some(name) = update.name {
            validate_name(&name)?;
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = Email::parse(&email)?;
        }
        if let Some(password) = update.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password)?;
        }
        user.updated_at = Utc::now();

        self.users.update(user).await.map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Store(other),
        })
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// All users in the system.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the store operation fails.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if there is no such user.
    pub async fn delete_user(&self, id: UserId) -> Result<(), AuthError> {
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    /// Overwrite a user's admin capability flag.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if there is no such user.
    pub async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User, AuthError> {
        let Some(mut user) = self.users.get(id).await? else {
            return Err(AuthError::UserNotFound);
        };

        user.is_admin = is_admin;
        user.updated_at = Utc::now();
        Ok(self.users.update(user).await?)
    }
}

/// Validate a display name.
fn validate_name(name: &str) -> Result<(), AuthError> {
    if name.trim().len() < MIN_NAME_LENGTH {
        return Err(AuthError::InvalidName(format!(
            "name must be at least {MIN_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::WrongPassword)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::WrongPassword)
}
