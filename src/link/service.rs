use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    id::derive_link_id,
    repository::LinkRepository,
    types::{LinkOwnerView, LinkView},
};
use crate::policy::{self, LinkProjection, ShortenDecision};
use crate::session::SessionContext;
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Service for handling link registry business logic
pub struct LinkService {
    links: Arc<dyn LinkRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self { links, users }
    }

    /// Shortens a URL for the calling account, subject to the link quota
    /// for non-privileged accounts. The derived id makes the same
    /// (url, user) pair collide with itself, which surfaces as a conflict.
    #[instrument(skip(self, ctx, original_url))]
    pub async fn shorten(
        &self,
        ctx: &SessionContext,
        original_url: &str,
    ) -> Result<LinkView, AppError> {
        // Resolve the caller's account and current link count first; the
        // quota decision needs both.
        let owner = match ctx.authenticated_user() {
            Some(auth) => {
                let user = self.users.find_by_id(&auth.user_id).await?.ok_or_else(|| {
                    warn!(user_id = %auth.user_id, "Session refers to a missing account");
                    AppError::NotFound(format!("user {} not found", auth.user_id))
                })?;
                let owned_links = self.links.list_for_owner(&user.user_id).await?.len();
                Some((user, owned_links))
            }
            None => None,
        };

        let owned_links = owner.as_ref().map(|(_, count)| *count).unwrap_or(0);
        match policy::shorten(ctx, owned_links) {
            ShortenDecision::Unauthenticated => Err(AppError::Unauthenticated),
            ShortenDecision::QuotaExceeded => {
                warn!(owned_links, "Link quota exceeded");
                Err(AppError::Forbidden("link quota exceeded".to_string()))
            }
            ShortenDecision::Allow => {
                // The policy only allows authenticated callers
                let Some((user, _)) = owner else {
                    return Err(AppError::Internal);
                };

                let link_id = derive_link_id(original_url, &user.user_id);
                let link = self.links.create_link(original_url, &link_id, &user).await?;

                info!(
                    link_id = %link.link_id,
                    user_id = %user.user_id,
                    "Link created successfully"
                );

                Ok(LinkView::project(
                    &link,
                    LinkOwnerView::from(&user),
                    LinkProjection::Full,
                ))
            }
        }
    }

    /// Resolves a short link to its original URL, recording the visit.
    /// Public: no session is consulted.
    #[instrument(skip(self))]
    pub async fn resolve(&self, link_id: &str) -> Result<String, AppError> {
        let found = self.links.get_by_id(link_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("link {} not found", link_id))
        })?;

        // Count the visit before handing out the redirect
        let updated = self
            .links
            .record_visit(&found.link.link_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("link {} not found", link_id)))?;

        info!(
            link_id = %updated.link_id,
            num_hits = updated.num_hits,
            "Link resolved"
        );

        Ok(updated.original_url)
    }

    /// Lists the target account's links with the projection the viewer is
    /// entitled to. The listing itself is never denied.
    #[instrument(skip(self, ctx))]
    pub async fn list_for_account(
        &self,
        ctx: &SessionContext,
        target_user_id: &str,
    ) -> Result<Vec<LinkView>, AppError> {
        let target = self.users.find_by_id(target_user_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("user {} not found", target_user_id))
        })?;

        let projection = policy::list_projection(ctx, target_user_id);
        let links = self.links.list_for_owner(target_user_id).await?;

        let full_projection = projection == LinkProjection::Full;
        info!(
            user_id = %target_user_id,
            link_count = links.len(),
            full_projection,
            "Links listed for account"
        );

        Ok(links
            .iter()
            .map(|link| LinkView::project(link, LinkOwnerView::from(&target), projection))
            .collect())
    }

    /// Deletes a link under the target account. Only the target account
    /// itself or an admin may delete; a missing link is reported after the
    /// ownership check so forbidden callers learn nothing about it.
    #[instrument(skip(self, ctx))]
    pub async fn delete(
        &self,
        ctx: &SessionContext,
        target_user_id: &str,
        target_link_id: &str,
    ) -> Result<(), AppError> {
        policy::delete_link(ctx, target_user_id)
            .require("only the link's account or an admin may delete it")?;

        if self.links.get_by_id(target_link_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "link {} not found",
                target_link_id
            )));
        }

        self.links.delete_by_id(target_link_id).await?;

        info!(link_id = %target_link_id, "Link deleted");
        Ok(())
    }
}
