use serde::{Deserialize, Serialize};

/// Authentication state a session carries for its account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub is_pro: bool,
    pub is_admin: bool,
}

/// Per-request session context loaded by the middleware.
///
/// Routed as an explicit value through request extensions so the access
/// policy and handlers receive it as an injected input rather than reading
/// hidden global state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionContext {
    Anonymous,
    Authenticated {
        /// Opaque cookie token backing this session
        token: String,
        user: AuthenticatedUser,
    },
}

impl SessionContext {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionContext::Authenticated { .. })
    }

    pub fn authenticated_user(&self) -> Option<&AuthenticatedUser> {
        match self {
            SessionContext::Anonymous => None,
            SessionContext::Authenticated { user, .. } => Some(user),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionContext::Anonymous => None,
            SessionContext::Authenticated { token, .. } => Some(token),
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
            is_pro: false,
            is_admin: false,
        }
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = SessionContext::Anonymous;

        assert!(!ctx.is_logged_in());
        assert!(ctx.authenticated_user().is_none());
        assert!(ctx.token().is_none());
    }

    #[test]
    fn test_authenticated_context() {
        let ctx = SessionContext::Authenticated {
            token: "token-1".to_string(),
            user: test_user(),
        };

        assert!(ctx.is_logged_in());
        assert_eq!(ctx.authenticated_user().unwrap().username, "alice");
        assert_eq!(ctx.token(), Some("token-1"));
    }

    #[test]
    fn test_authenticated_user_serialization() {
        let user = test_user();

        // Should serialize to JSON and round-trip
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice"));

        let deserialized: AuthenticatedUser = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, user);
    }
}
