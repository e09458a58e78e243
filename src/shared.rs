use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::link::repository::LinkRepository;
use crate::session::repository::SessionRepository;
use crate::user::credentials::CredentialService;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub link_repository: Arc<dyn LinkRepository + Send + Sync>,
    pub session_repository: Arc<dyn SessionRepository + Send + Sync>,
    pub credentials: Arc<dyn CredentialService>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        link_repository: Arc<dyn LinkRepository + Send + Sync>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            user_repository,
            link_repository,
            session_repository,
            credentials,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Login required")]
    Unauthenticated,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Translates a storage-layer error into the application taxonomy.
    /// Unique-constraint violations become `Conflict`; anything else is an
    /// unexpected persistence failure.
    pub fn from_storage(err: sqlx::Error, conflict_message: &str) -> AppError {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::Conflict(conflict_message.to_string());
            }
        }
        AppError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unauthenticated => {
                // A missing session redirects to the login entry point
                // instead of answering 401
                return (StatusCode::FOUND, [(header::LOCATION, "/login")]).into_response();
            }
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::link::models::{LinkModel, LinkWithOwner};
    use crate::session::models::SessionModel;
    use crate::user::credentials::Argon2Credentials;
    use crate::user::models::UserModel;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    /// Dummy user repository that does nothing - for tests that don't care about users
    pub struct DummyUserRepository;

    #[async_trait]
    impl UserRepository for DummyUserRepository {
        async fn create_user(&self, _user: &UserModel) -> Result<(), AppError> {
            Ok(())
        }
        async fn find_by_id(&self, _user_id: &str) -> Result<Option<UserModel>, AppError> {
            Ok(None)
        }
        async fn find_by_username(&self, _username: &str) -> Result<Option<UserModel>, AppError> {
            Ok(None)
        }
        async fn rename_username(&self, _user_id: &str, _username: &str) -> Result<(), AppError> {
            Ok(())
        }
        async fn list_all(&self) -> Result<Vec<UserModel>, AppError> {
            Ok(Vec::new())
        }
    }

    /// Dummy link repository that does nothing - for tests that don't care about links
    pub struct DummyLinkRepository;

    #[async_trait]
    impl LinkRepository for DummyLinkRepository {
        async fn create_link(
            &self,
            original_url: &str,
            link_id: &str,
            owner: &UserModel,
        ) -> Result<LinkModel, AppError> {
            Ok(LinkModel::new(original_url, link_id, &owner.user_id))
        }
        async fn get_by_id(&self, _link_id: &str) -> Result<Option<LinkWithOwner>, AppError> {
            Ok(None)
        }
        async fn record_visit(
            &self,
            _link_id: &str,
            _accessed_at: DateTime<Utc>,
        ) -> Result<Option<LinkModel>, AppError> {
            Ok(None)
        }
        async fn list_for_owner(&self, _user_id: &str) -> Result<Vec<LinkModel>, AppError> {
            Ok(Vec::new())
        }
        async fn delete_by_id(&self, _link_id: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    /// Dummy session repository that does nothing - for tests that don't care about sessions
    pub struct DummySessionRepository;

    #[async_trait]
    impl SessionRepository for DummySessionRepository {
        async fn create_session(&self, _session: &SessionModel) -> Result<(), AppError> {
            Ok(())
        }
        async fn get_session(&self, _session_id: &str) -> Result<Option<SessionModel>, AppError> {
            Ok(None)
        }
        async fn delete_session(&self, _session_id: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        link_repository: Option<Arc<dyn LinkRepository + Send + Sync>>,
        session_repository: Option<Arc<dyn SessionRepository + Send + Sync>>,
        credentials: Option<Arc<dyn CredentialService>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                link_repository: None,
                session_repository: None,
                credentials: None,
            }
        }

        pub fn with_user_repository(
            mut self,
            repo: Arc<dyn UserRepository + Send + Sync>,
        ) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_link_repository(
            mut self,
            repo: Arc<dyn LinkRepository + Send + Sync>,
        ) -> Self {
            self.link_repository = Some(repo);
            self
        }

        pub fn with_session_repository(
            mut self,
            repo: Arc<dyn SessionRepository + Send + Sync>,
        ) -> Self {
            self.session_repository = Some(repo);
            self
        }

        pub fn with_credentials(mut self, credentials: Arc<dyn CredentialService>) -> Self {
            self.credentials = Some(credentials);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                user_repository: self
                    .user_repository
                    .unwrap_or_else(|| Arc::new(DummyUserRepository)),
                link_repository: self
                    .link_repository
                    .unwrap_or_else(|| Arc::new(DummyLinkRepository)),
                session_repository: self
                    .session_repository
                    .unwrap_or_else(|| Arc::new(DummySessionRepository)),
                credentials: self
                    .credentials
                    .unwrap_or_else(|| Arc::new(Argon2Credentials)),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
