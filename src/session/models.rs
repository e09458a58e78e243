use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::types::AuthenticatedUser;

/// How long a session stays valid once established
pub const SESSION_LIFETIME_HOURS: i64 = 8;

/// Database model for the user_sessions table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionModel {
    pub id: String, // Opaque token, UUID v4 as string, carried by the cookie
    pub user_id: String,
    pub username: String,
    pub is_pro: bool,
    pub is_admin: bool,
    pub logged_in: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionModel {
    /// Creates a new session model with a generated token and timestamps
    pub fn new(user: AuthenticatedUser, lifetime_hours: i64) -> Self {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(lifetime_hours);

        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user.user_id,
            username: user.username,
            is_pro: user.is_pro,
            is_admin: user.is_admin,
            logged_in: true,
            created_at: now,
            expires_at,
        }
    }

    /// Checks if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// The authentication state this session vouches for
    pub fn authenticated_user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            is_pro: self.is_pro,
            is_admin: self.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "user-1".to_string(),
            username: "alice".to_string(),
            is_pro: true,
            is_admin: false,
        }
    }

    #[test]
    fn test_new_session_model() {
        let session = SessionModel::new(test_user(), SESSION_LIFETIME_HOURS);

        assert!(!session.id.is_empty());
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.username, "alice");
        assert!(session.is_pro);
        assert!(!session.is_admin);
        assert!(session.logged_in);
        assert!(session.expires_at > session.created_at);
        assert!(!session.is_expired());
    }

    #[test]
    fn test_session_expiration() {
        let session = SessionModel::new(test_user(), -1); // Expired
        assert!(session.is_expired());
    }

    #[test]
    fn test_authenticated_user_round_trip() {
        let user = test_user();
        let session = SessionModel::new(user.clone(), SESSION_LIFETIME_HOURS);

        assert_eq!(session.authenticated_user(), user);
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = SessionModel::new(test_user(), SESSION_LIFETIME_HOURS);
        let b = SessionModel::new(test_user(), SESSION_LIFETIME_HOURS);

        assert_ne!(a.id, b.id);
    }
}
