//! Pure authorization decisions.
//!
//! Every rule here is a hard contract applied per operation: the services
//! hand in the session context (and whatever counts the decision needs) and
//! get back a decision to act on. Nothing in this module performs I/O.

use crate::session::SessionContext;
use crate::shared::AppError;

/// Maximum number of links a non-privileged account may own
pub const FREE_LINK_QUOTA: usize = 5;

/// Outcome of gating a shorten request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortenDecision {
    Allow,
    Unauthenticated,
    QuotaExceeded,
}

/// Gate for creating a new short link. Privileged means pro OR admin;
/// either flag alone lifts the quota. Everyone else is capped at
/// `FREE_LINK_QUOTA` owned links.
pub fn shorten(ctx: &SessionContext, owned_links: usize) -> ShortenDecision {
    match ctx.authenticated_user() {
        None => ShortenDecision::Unauthenticated,
        Some(user) => {
            if !user.is_pro && !user.is_admin && owned_links >= FREE_LINK_QUOTA {
                ShortenDecision::QuotaExceeded
            } else {
                ShortenDecision::Allow
            }
        }
    }
}

/// Which fields of a link a viewer is entitled to see
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkProjection {
    /// All fields, including usage metadata
    Full,
    /// Privacy-preserving view without hit counts or last-access time
    Reduced,
}

/// Chooses the projection for listing an account's links. The listing is
/// never denied outright; the reduced projection is the deny path, and
/// anonymous viewers get it too.
pub fn list_projection(ctx: &SessionContext, target_user_id: &str) -> LinkProjection {
    match ctx.authenticated_user() {
        Some(user) if user.is_admin || user.user_id == target_user_id => LinkProjection::Full,
        _ => LinkProjection::Reduced,
    }
}

/// Outcome of gating an operation on somebody's account or links
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccessDecision {
    Allow,
    Unauthenticated,
    Forbidden,
}

impl AccessDecision {
    /// Converts a denial into the error the handler boundary maps onto a
    /// response; `denied` becomes the Forbidden message.
    pub fn require(self, denied: &str) -> Result<(), AppError> {
        match self {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Unauthenticated => Err(AppError::Unauthenticated),
            AccessDecision::Forbidden => Err(AppError::Forbidden(denied.to_string())),
        }
    }
}

/// Gate for deleting a link under the target account. Ownership is the
/// sole authorization axis: only the target account itself or an admin.
pub fn delete_link(ctx: &SessionContext, target_user_id: &str) -> AccessDecision {
    account_access(ctx, target_user_id)
}

/// Gate for mutating an account (renaming). Same axis as deletion: the
/// account itself or an admin.
pub fn manage_account(ctx: &SessionContext, target_user_id: &str) -> AccessDecision {
    account_access(ctx, target_user_id)
}

/// Gate for listing every account in the directory: admins only.
pub fn directory_listing(ctx: &SessionContext) -> AccessDecision {
    match ctx.authenticated_user() {
        None => AccessDecision::Unauthenticated,
        Some(user) if user.is_admin => AccessDecision::Allow,
        Some(_) => AccessDecision::Forbidden,
    }
}

fn account_access(ctx: &SessionContext, target_user_id: &str) -> AccessDecision {
    match ctx.authenticated_user() {
        None => AccessDecision::Unauthenticated,
        Some(user) if user.is_admin || user.user_id == target_user_id => AccessDecision::Allow,
        Some(_) => AccessDecision::Forbidden,
    }
}
