use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::{LinkModel, LinkOwner, LinkWithOwner};
use crate::shared::AppError;
use crate::user::models::UserModel;

/// Trait for link registry operations
#[async_trait]
pub trait LinkRepository {
    /// Persists a new link with zero hits and the access timestamp set to
    /// now. A duplicate link id surfaces as `Conflict`, never silently.
    async fn create_link(
        &self,
        original_url: &str,
        link_id: &str,
        owner: &UserModel,
    ) -> Result<LinkModel, AppError>;

    /// Fetches a link with its owning account eagerly resolved
    async fn get_by_id(&self, link_id: &str) -> Result<Option<LinkWithOwner>, AppError>;

    /// Registers one visit: increments the hit counter by exactly 1 and
    /// stamps the access time, atomically against the stored record. This
    /// must be a targeted update by key so concurrent visits to the same
    /// link never lose an increment.
    async fn record_visit(
        &self,
        link_id: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<Option<LinkModel>, AppError>;

    async fn list_for_owner(&self, user_id: &str) -> Result<Vec<LinkModel>, AppError>;

    /// Removes a link. Idempotent; authorization and existence checks
    /// happen before this is called.
    async fn delete_by_id(&self, link_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of LinkRepository for development and testing
///
/// This provides a realistic implementation that can be used in development
/// without requiring a real database connection. Data is stored in memory
/// and will be lost when the application restarts.
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<String, StoredLink>>,
}

/// Stored record plus the owner snapshot taken at creation time
struct StoredLink {
    link: LinkModel,
    owner: LinkOwner,
}

impl Default for InMemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLinkRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            links: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of links in the repository
    pub fn link_count(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    #[instrument(skip(self, owner))]
    async fn create_link(
        &self,
        original_url: &str,
        link_id: &str,
        owner: &UserModel,
    ) -> Result<LinkModel, AppError> {
        debug!(link_id = %link_id, user_id = %owner.user_id, "Creating link in memory");

        let mut links = self.links.lock().unwrap();
        if links.contains_key(link_id) {
            warn!(link_id = %link_id, "Link id already exists in memory");
            return Err(AppError::Conflict(format!(
                "link {} already exists",
                link_id
            )));
        }

        let link = LinkModel::new(original_url, link_id, &owner.user_id);
        links.insert(
            link_id.to_string(),
            StoredLink {
                link: link.clone(),
                owner: LinkOwner {
                    user_id: owner.user_id.clone(),
                    username: owner.username.clone(),
                    is_pro: owner.is_pro,
                    is_admin: owner.is_admin,
                },
            },
        );

        debug!(link_id = %link_id, "Link created successfully in memory");
        Ok(link)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, link_id: &str) -> Result<Option<LinkWithOwner>, AppError> {
        debug!(link_id = %link_id, "Fetching link from memory");

        let links = self.links.lock().unwrap();
        let found = links.get(link_id).map(|stored| LinkWithOwner {
            link: stored.link.clone(),
            owner: stored.owner.clone(),
        });

        match &found {
            Some(f) => debug!(link_id = %link_id, user_id = %f.owner.user_id, "Link found in memory"),
            None => debug!(link_id = %link_id, "Link not found in memory"),
        }

        Ok(found)
    }

    #[instrument(skip(self))]
    async fn record_visit(
        &self,
        link_id: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<Option<LinkModel>, AppError> {
        debug!(link_id = %link_id, "Recording visit in memory");

        // The increment happens under the map lock, so concurrent visits
        // serialize instead of clobbering each other.
        let mut links = self.links.lock().unwrap();
        let updated = match links.get_mut(link_id) {
            Some(stored) => {
                stored.link.num_hits += 1;
                stored.link.last_accessed_on = accessed_at;
                Some(stored.link.clone())
            }
            None => None,
        };

        match &updated {
            Some(link) => {
                info!(link_id = %link_id, num_hits = link.num_hits, "Visit recorded in memory")
            }
            None => debug!(link_id = %link_id, "Link not found for visit in memory"),
        }

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn list_for_owner(&self, user_id: &str) -> Result<Vec<LinkModel>, AppError> {
        debug!(user_id = %user_id, "Listing links for owner in memory");

        let links = self.links.lock().unwrap();
        let mut owned: Vec<LinkModel> = links
            .values()
            .filter(|stored| stored.link.user_id == user_id)
            .map(|stored| stored.link.clone())
            .collect();
        owned.sort_by(|a, b| a.link_id.cmp(&b.link_id));

        debug!(user_id = %user_id, link_count = owned.len(), "Links listed from memory");
        Ok(owned)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, link_id: &str) -> Result<(), AppError> {
        debug!(link_id = %link_id, "Deleting link from memory");

        let mut links = self.links.lock().unwrap();
        if links.remove(link_id).is_none() {
            debug!(link_id = %link_id, "Link was already gone");
        }

        Ok(())
    }
}

/// PostgreSQL implementation of the link registry
pub struct PostgresLinkRepository {
    pool: PgPool,
}

impl PostgresLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn link_from_row(row: &sqlx::postgres::PgRow) -> LinkModel {
    LinkModel {
        link_id: row.get("link_id"),
        original_url: row.get("original_url"),
        num_hits: row.get("num_hits"),
        last_accessed_on: row.get("last_accessed_on"),
        user_id: row.get("user_id"),
    }
}

#[async_trait]
impl LinkRepository for PostgresLinkRepository {
    #[instrument(skip(self, owner))]
    async fn create_link(
        &self,
        original_url: &str,
        link_id: &str,
        owner: &UserModel,
    ) -> Result<LinkModel, AppError> {
        debug!(link_id = %link_id, user_id = %owner.user_id, "Creating link in database");

        let link = LinkModel::new(original_url, link_id, &owner.user_id);

        sqlx::query(
            "INSERT INTO links (link_id, original_url, num_hits, last_accessed_on, user_id) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&link.link_id)
        .bind(&link.original_url)
        .bind(link.num_hits)
        .bind(link.last_accessed_on)
        .bind(&link.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, link_id = %link_id, "Failed to create link in database");
            AppError::from_storage(e, &format!("link {} already exists", link_id))
        })?;

        debug!(link_id = %link_id, "Link created successfully in database");
        Ok(link)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, link_id: &str) -> Result<Option<LinkWithOwner>, AppError> {
        debug!(link_id = %link_id, "Fetching link from database");

        let row = sqlx::query(
            "SELECT l.link_id, l.original_url, l.num_hits, l.last_accessed_on, l.user_id, \
                    u.username, u.is_pro, u.is_admin \
             FROM links l JOIN users u ON u.user_id = l.user_id \
             WHERE l.link_id = $1",
        )
        .bind(link_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, link_id = %link_id, "Failed to fetch link from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|row| LinkWithOwner {
            link: link_from_row(&row),
            owner: LinkOwner {
                user_id: row.get("user_id"),
                username: row.get("username"),
                is_pro: row.get("is_pro"),
                is_admin: row.get("is_admin"),
            },
        }))
    }

    #[instrument(skip(self))]
    async fn record_visit(
        &self,
        link_id: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<Option<LinkModel>, AppError> {
        debug!(link_id = %link_id, "Recording visit in database");

        // Targeted update by key; the database serializes concurrent
        // increments so none are lost.
        let row = sqlx::query(
            "UPDATE links SET num_hits = num_hits + 1, last_accessed_on = $2 \
             WHERE link_id = $1 \
             RETURNING link_id, original_url, num_hits, last_accessed_on, user_id",
        )
        .bind(link_id)
        .bind(accessed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, link_id = %link_id, "Failed to record visit in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(link_from_row))
    }

    #[instrument(skip(self))]
    async fn list_for_owner(&self, user_id: &str) -> Result<Vec<LinkModel>, AppError> {
        debug!(user_id = %user_id, "Listing links for owner from database");

        let rows = sqlx::query(
            "SELECT link_id, original_url, num_hits, last_accessed_on, user_id \
             FROM links WHERE user_id = $1 ORDER BY link_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to list links from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.iter().map(link_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, link_id: &str) -> Result<(), AppError> {
        debug!(link_id = %link_id, "Deleting link from database");

        let result = sqlx::query("DELETE FROM links WHERE link_id = $1")
            .bind(link_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, link_id = %link_id, "Failed to delete link from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            debug!(link_id = %link_id, "Link was already gone");
        }

        Ok(())
    }
}
