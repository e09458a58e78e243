use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the links table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LinkModel {
    pub link_id: String, // Derived from (original_url, user_id), primary key
    pub original_url: String,
    pub num_hits: i64,
    pub last_accessed_on: DateTime<Utc>,
    pub user_id: String, // Owning account, exactly one
}

impl LinkModel {
    /// Creates a new link record for the given owner, with zero hits and
    /// the access timestamp set to creation time
    pub fn new(original_url: &str, link_id: &str, owner_id: &str) -> Self {
        Self {
            link_id: link_id.to_string(),
            original_url: original_url.to_string(),
            num_hits: 0,
            last_accessed_on: Utc::now(),
            user_id: owner_id.to_string(),
        }
    }
}

/// Owning account data resolved alongside a link, needed for ownership
/// checks and response projections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkOwner {
    pub user_id: String,
    pub username: String,
    pub is_pro: bool,
    pub is_admin: bool,
}

/// A link together with its eagerly resolved owner
#[derive(Debug, Clone)]
pub struct LinkWithOwner {
    pub link: LinkModel,
    pub owner: LinkOwner,
}
