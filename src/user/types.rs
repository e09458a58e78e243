use serde::{Deserialize, Serialize};

use super::models::UserModel;

/// Request body shared by registration and login
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Request body for renaming an account
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub username: String,
}

/// Public projection of a user account, safe to serialize to clients
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    pub is_pro: bool,
    pub is_admin: bool,
}

impl From<&UserModel> for UserResponse {
    fn from(user: &UserModel) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            is_pro: user.is_pro,
            is_admin: user.is_admin,
        }
    }
}
