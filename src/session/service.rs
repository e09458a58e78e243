use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{SessionModel, SESSION_LIFETIME_HOURS},
    repository::SessionRepository,
    types::{AuthenticatedUser, SessionContext},
};
use crate::shared::AppError;

/// Service for handling session lifecycle: established at login, resolved
/// on every request, cleared at logout.
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Establishes a fresh session for the given account. Any session the
    /// caller already carried is invalidated first, so one cookie never
    /// vouches for two identities.
    #[instrument(skip(self, user))]
    pub async fn establish(
        &self,
        previous_token: Option<&str>,
        user: AuthenticatedUser,
    ) -> Result<SessionModel, AppError> {
        if let Some(token) = previous_token {
            debug!(session_id = %token, "Clearing previous session before login");
            self.repository.delete_session(token).await?;
        }

        let session = SessionModel::new(user, SESSION_LIFETIME_HOURS);
        self.repository.create_session(&session).await?;

        info!(
            session_id = %session.id,
            username = %session.username,
            "Session established"
        );

        Ok(session)
    }

    /// Resolves a cookie token to the session context for this request.
    /// Missing, expired, or logged-out sessions all resolve to Anonymous;
    /// expired records are removed on sight.
    #[instrument(skip(self, token))]
    pub async fn context_for_token(
        &self,
        token: Option<&str>,
    ) -> Result<SessionContext, AppError> {
        let token = match token {
            Some(token) => token,
            None => return Ok(SessionContext::Anonymous),
        };

        let session = match self.repository.get_session(token).await? {
            Some(session) => session,
            None => {
                debug!("Session token does not match a stored session");
                return Ok(SessionContext::Anonymous);
            }
        };

        if session.is_expired() {
            warn!(session_id = %session.id, "Session has expired, removing");
            self.repository.delete_session(&session.id).await?;
            return Ok(SessionContext::Anonymous);
        }

        if !session.logged_in {
            debug!(session_id = %session.id, "Session exists but is not logged in");
            return Ok(SessionContext::Anonymous);
        }

        Ok(SessionContext::Authenticated {
            token: session.id.clone(),
            user: session.authenticated_user(),
        })
    }

    /// Clears a session so its token no longer authenticates anyone.
    #[instrument(skip(self))]
    pub async fn clear(&self, token: &str) -> Result<(), AppError> {
        self.repository.delete_session(token).await?;
        info!(session_id = %token, "Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::repository::InMemorySessionRepository;

    fn test_user(username: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: format!("{}-id", username),
            username: username.to_string(),
            is_pro: false,
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_establish_and_resolve() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = SessionService::new(repo);

        let session = service.establish(None, test_user("alice")).await.unwrap();

        let ctx = service
            .context_for_token(Some(&session.id))
            .await
            .unwrap();
        assert!(ctx.is_logged_in());
        assert_eq!(ctx.authenticated_user().unwrap().username, "alice");
        assert_eq!(ctx.token(), Some(session.id.as_str()));
    }

    #[tokio::test]
    async fn test_no_token_resolves_to_anonymous() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = SessionService::new(repo);

        let ctx = service.context_for_token(None).await.unwrap();
        assert_eq!(ctx, SessionContext::Anonymous);
    }

    #[tokio::test]
    async fn test_unknown_token_resolves_to_anonymous() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = SessionService::new(repo);

        let ctx = service
            .context_for_token(Some("no-such-token"))
            .await
            .unwrap();
        assert_eq!(ctx, SessionContext::Anonymous);
    }

    #[tokio::test]
    async fn test_expired_session_is_removed_on_access() {
        let repo: Arc<dyn SessionRepository + Send + Sync> =
            Arc::new(InMemorySessionRepository::new());
        let service = SessionService::new(Arc::clone(&repo));

        // Store an already-expired session directly
        let expired = SessionModel::new(test_user("alice"), -1);
        repo.create_session(&expired).await.unwrap();

        let ctx = service
            .context_for_token(Some(&expired.id))
            .await
            .unwrap();
        assert_eq!(ctx, SessionContext::Anonymous);

        // The expired record was deleted, not just ignored
        assert!(repo.get_session(&expired.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_establish_replaces_previous_session() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service =
            SessionService::new(Arc::clone(&repo) as Arc<dyn SessionRepository + Send + Sync>);

        let first = service.establish(None, test_user("alice")).await.unwrap();
        let second = service
            .establish(Some(&first.id), test_user("bob"))
            .await
            .unwrap();

        // The old token no longer authenticates
        let old_ctx = service.context_for_token(Some(&first.id)).await.unwrap();
        assert_eq!(old_ctx, SessionContext::Anonymous);

        let new_ctx = service.context_for_token(Some(&second.id)).await.unwrap();
        assert_eq!(new_ctx.authenticated_user().unwrap().username, "bob");
        assert_eq!(repo.session_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_invalidates_session() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let service = SessionService::new(repo);

        let session = service.establish(None, test_user("alice")).await.unwrap();
        service.clear(&session.id).await.unwrap();

        let ctx = service
            .context_for_token(Some(&session.id))
            .await
            .unwrap();
        assert_eq!(ctx, SessionContext::Anonymous);
    }
}
