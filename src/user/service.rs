use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{credentials::CredentialService, models::UserModel, repository::UserRepository};
use crate::policy;
use crate::session::SessionContext;
use crate::shared::AppError;

/// Service for handling user directory business logic
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    credentials: Arc<dyn CredentialService>,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            repository,
            credentials,
        }
    }

    /// Registers a new account. The username is pre-checked for uniqueness;
    /// the storage unique constraint still backstops a concurrent duplicate
    /// registration between check and insert, and both paths surface the
    /// same conflict.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<UserModel, AppError> {
        info!(username = %username, "Registering new user");

        if self.repository.find_by_username(username).await?.is_some() {
            warn!(username = %username, "Username already taken");
            return Err(AppError::Conflict(format!(
                "username {} already taken",
                username
            )));
        }

        let password_hash = self.credentials.derive(password)?;
        let user = UserModel::new(username, &password_hash);
        self.repository.create_user(&user).await?;

        info!(user_id = %user.user_id, username = %username, "User registered successfully");
        Ok(user)
    }

    /// Verifies a login attempt. Unknown usernames and wrong passwords are
    /// reported identically so callers cannot probe which accounts exist.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<UserModel, AppError> {
        info!(username = %username, "Verifying login");

        let user = match self.repository.find_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username = %username, "Login failed: unknown username");
                return Err(AppError::NotFound("invalid username or password".to_string()));
            }
        };

        if !self.credentials.verify(password, &user.password_hash) {
            warn!(username = %username, "Login failed: password mismatch");
            return Err(AppError::NotFound("invalid username or password".to_string()));
        }

        info!(user_id = %user.user_id, username = %username, "Login verified");
        Ok(user)
    }

    /// Renames an account. Only the account itself or an admin may do this.
    #[instrument(skip(self, ctx))]
    pub async fn rename(
        &self,
        ctx: &SessionContext,
        target_user_id: &str,
        new_username: &str,
    ) -> Result<(), AppError> {
        policy::manage_account(ctx, target_user_id)
            .require("only the account owner or an admin may rename it")?;

        self.repository
            .rename_username(target_user_id, new_username)
            .await?;

        info!(user_id = %target_user_id, new_username = %new_username, "Account renamed");
        Ok(())
    }

    /// Lists every account in the directory. Admins only.
    #[instrument(skip(self, ctx))]
    pub async fn list_accounts(&self, ctx: &SessionContext) -> Result<Vec<UserModel>, AppError> {
        policy::directory_listing(ctx).require("only admins may list accounts")?;

        self.repository.list_all().await
    }
}
