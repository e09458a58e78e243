use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::session::AuthenticatedUser;

/// Database model for the users table.
///
/// Owned links are not stored here; they are a derived collection queried
/// from the link registry when a caller needs them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserModel {
    pub user_id: String, // UUID v4 as string, server-generated
    pub username: String,
    #[serde(skip_serializing)] // Credential, never leaves the server
    pub password_hash: String,
    pub is_pro: bool,
    pub is_admin: bool,
}

impl UserModel {
    /// Creates a new unprivileged account with a generated id
    pub fn new(username: &str, password_hash: &str) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_pro: false,
            is_admin: false,
        }
    }

    /// Pro and admin accounts are exempt from the link quota
    pub fn is_privileged(&self) -> bool {
        self.is_pro || self.is_admin
    }

    /// The authentication state a session stores for this account
    pub fn authenticated_user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            is_pro: self.is_pro,
            is_admin: self.is_admin,
        }
    }
}
