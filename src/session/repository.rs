use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::SessionModel;
use crate::shared::AppError;

/// Trait for the session store. Sessions are an opaque bag of
/// authentication state keyed by the cookie token; callers never reach the
/// backing storage directly.
#[async_trait]
pub trait SessionRepository {
    async fn create_session(&self, session: &SessionModel) -> Result<(), AppError>;
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionModel>, AppError>;

    /// Removes a session. Deleting an absent session is not an error, so
    /// invalidation stays idempotent.
    async fn delete_session(&self, session_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of SessionRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts.
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<String, SessionModel>>,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of sessions in the repository
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &SessionModel) -> Result<(), AppError> {
        debug!(session_id = %session.id, username = %session.username, "Creating session in memory");

        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&session.id) {
            warn!(session_id = %session.id, "Session already exists in memory");
            return Err(AppError::DatabaseError(
                "Session already exists".to_string(),
            ));
        }
        sessions.insert(session.id.clone(), session.clone());

        debug!(session_id = %session.id, "Session created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionModel>, AppError> {
        debug!(session_id = %session_id, "Fetching session from memory");

        let sessions = self.sessions.lock().unwrap();
        let session = sessions.get(session_id).cloned();

        match &session {
            Some(s) => {
                debug!(session_id = %session_id, username = %s.username, "Session found in memory")
            }
            None => debug!(session_id = %session_id, "Session not found in memory"),
        }

        Ok(session)
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        debug!(session_id = %session_id, "Deleting session from memory");

        let mut sessions = self.sessions.lock().unwrap();
        if sessions.remove(session_id).is_none() {
            debug!(session_id = %session_id, "Session was already gone");
        }

        Ok(())
    }
}

/// PostgreSQL implementation of the session store
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &SessionModel) -> Result<(), AppError> {
        debug!(session_id = %session.id, username = %session.username, "Creating session in database");

        sqlx::query(
            "INSERT INTO user_sessions (id, user_id, username, is_pro, is_admin, logged_in, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.username)
        .bind(session.is_pro)
        .bind(session.is_admin)
        .bind(session.logged_in)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create session in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(session_id = %session.id, "Session created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionModel>, AppError> {
        debug!(session_id = %session_id, "Fetching session from database");

        let row = sqlx::query(
            "SELECT id, user_id, username, is_pro, is_admin, logged_in, created_at, expires_at \
             FROM user_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session_id, "Failed to fetch session from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let session = match row {
            Some(row) => {
                let session = SessionModel {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    username: row.get("username"),
                    is_pro: row.get("is_pro"),
                    is_admin: row.get("is_admin"),
                    logged_in: row.get("logged_in"),
                    created_at: row.get("created_at"),
                    expires_at: row.get("expires_at"),
                };
                debug!(session_id = %session_id, username = %session.username, "Session found in database");
                Some(session)
            }
            None => {
                debug!(session_id = %session_id, "Session not found in database");
                None
            }
        };

        Ok(session)
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        debug!(session_id = %session_id, "Deleting session from database");

        let result = sqlx::query("DELETE FROM user_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, session_id = %session_id, "Failed to delete session from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            debug!(session_id = %session_id, "Session was already gone");
        }

        Ok(())
    }
}
