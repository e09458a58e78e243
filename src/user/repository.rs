use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user directory operations
#[async_trait]
pub trait UserRepository {
    /// Persists a new account. A duplicate username surfaces as `Conflict`.
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    /// Changes an account's username. `NotFound` if the account does not
    /// exist, `Conflict` if the new name is taken.
    async fn rename_username(&self, user_id: &str, username: &str) -> Result<(), AppError>;
    async fn list_all(&self) -> Result<Vec<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts.
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated accounts
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let mut user_map = HashMap::new();
        for user in users {
            user_map.insert(user.user_id.clone(), user);
        }

        Self {
            users: Mutex::new(user_map),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.user_id, username = %user.username, "Creating user in memory");

        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == user.username) {
            warn!(username = %user.username, "Username already taken in memory");
            return Err(AppError::Conflict(format!(
                "username {} already taken",
                user.username
            )));
        }
        users.insert(user.user_id.clone(), user.clone());

        debug!(user_id = %user.user_id, "User created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %user_id, "Fetching user from memory");

        let users = self.users.lock().unwrap();
        let user = users.get(user_id).cloned();

        match &user {
            Some(u) => debug!(user_id = %user_id, username = %u.username, "User found in memory"),
            None => debug!(user_id = %user_id, "User not found in memory"),
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        debug!(username = %username, "Fetching user by username from memory");

        let users = self.users.lock().unwrap();
        // Usernames are matched case-sensitively
        let user = users.values().find(|u| u.username == username).cloned();

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn rename_username(&self, user_id: &str, username: &str) -> Result<(), AppError> {
        debug!(user_id = %user_id, new_username = %username, "Renaming user in memory");

        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.username == username && u.user_id != user_id)
        {
            warn!(username = %username, "Username already taken in memory");
            return Err(AppError::Conflict(format!(
                "username {} already taken",
                username
            )));
        }

        match users.get_mut(user_id) {
            Some(user) => {
                user.username = username.to_string();
                debug!(user_id = %user_id, "User renamed successfully in memory");
                Ok(())
            }
            None => {
                warn!(user_id = %user_id, "User not found for rename in memory");
                Err(AppError::NotFound(format!("user {} not found", user_id)))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<UserModel>, AppError> {
        debug!("Listing all users in memory");

        let users = self.users.lock().unwrap();
        let mut user_list: Vec<UserModel> = users.values().cloned().collect();
        user_list.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(user_list)
    }
}

/// PostgreSQL implementation of the user directory
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserModel {
    UserModel {
        user_id: row.get("user_id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        is_pro: row.get("is_pro"),
        is_admin: row.get("is_admin"),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.user_id, username = %user.username, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (user_id, username, password_hash, is_pro, is_admin) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_pro)
        .bind(user.is_admin)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, username = %user.username, "Failed to create user in database");
            AppError::from_storage(e, &format!("username {} already taken", user.username))
        })?;

        debug!(user_id = %user.user_id, "User created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        debug!(user_id = %user_id, "Fetching user from database");

        let row = sqlx::query(
            "SELECT user_id, username, password_hash, is_pro, is_admin \
             FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        debug!(username = %username, "Fetching user by username from database");

        let row = sqlx::query(
            "SELECT user_id, username, password_hash, is_pro, is_admin \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, username = %username, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self))]
    async fn rename_username(&self, user_id: &str, username: &str) -> Result<(), AppError> {
        debug!(user_id = %user_id, new_username = %username, "Renaming user in database");

        let result = sqlx::query("UPDATE users SET username = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, "Failed to rename user in database");
                AppError::from_storage(e, &format!("username {} already taken", username))
            })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user_id, "User not found for rename");
            return Err(AppError::NotFound(format!("user {} not found", user_id)));
        }

        debug!(user_id = %user_id, "User renamed successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<UserModel>, AppError> {
        debug!("Listing all users from database");

        let rows = sqlx::query(
            "SELECT user_id, username, password_hash, is_pro, is_admin \
             FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list users from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.iter().map(user_from_row).collect())
    }
}
