//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{Email, UserId};

/// A storefront user (domain type).
///
/// The password is stored only as an argon2 hash and is never serialized;
/// responses use [`UserProfile`] instead.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address (unique across the store).
    pub email: Email,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Admin capability flag.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The public profile view of this user.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
        }
    }

    /// The minimal owner summary used to annotate orders.
    #[must_use]
    pub fn owner_profile(&self) -> OwnerProfile {
        OwnerProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public profile of a user: no password hash, suitable for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
}

/// Minimal owner summary attached to order responses.
///
/// Deliberately excludes the admin flag and anything else private.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}
