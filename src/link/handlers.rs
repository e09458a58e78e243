use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::LinkService,
    types::{LinkView, ShortenRequest},
};
use crate::session::SessionContext;
use crate::shared::{AppError, AppState};

/// HTTP handler for shortening a URL
///
/// POST /api/links
/// Requires a session; answers 201 with the created link, 403 when the
/// quota is exhausted, and redirects to login when unauthenticated
#[instrument(name = "shorten_url", skip(state, ctx, request))]
pub async fn shorten_url(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(request): Json<ShortenRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Shortening URL");

    // Use injected repositories from app state
    let service = LinkService::new(
        Arc::clone(&state.link_repository),
        Arc::clone(&state.user_repository),
    );
    let link = service.shorten(&ctx, &request.original_url).await?;

    info!(link_id = %link.link_id, "URL shortened successfully");

    Ok((StatusCode::CREATED, Json(link)))
}

/// HTTP handler for resolving a short link
///
/// GET /{target_link_id}
/// Public; counts the visit and redirects to the original URL
#[instrument(name = "resolve_link", skip(state))]
pub async fn resolve_link(
    State(state): State<AppState>,
    Path(target_link_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let service = LinkService::new(
        Arc::clone(&state.link_repository),
        Arc::clone(&state.user_repository),
    );
    let original_url = service.resolve(&target_link_id).await?;

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, original_url)],
    ))
}

/// HTTP handler for listing an account's links
///
/// GET /api/users/{target_user_id}/links
/// The projection depends on the viewer; the listing is never denied
#[instrument(name = "get_link_data", skip(state, ctx))]
pub async fn get_link_data(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(target_user_id): Path<String>,
) -> Result<Json<Vec<LinkView>>, AppError> {
    let service = LinkService::new(
        Arc::clone(&state.link_repository),
        Arc::clone(&state.user_repository),
    );
    let links = service.list_for_account(&ctx, &target_user_id).await?;

    info!(
        user_id = %target_user_id,
        link_count = links.len(),
        "Links listed successfully"
    );

    Ok(Json(links))
}

/// HTTP handler for deleting a link
///
/// DELETE /api/users/{target_user_id}/links/{target_link_id}
/// Requires a session; only the target account or an admin may delete
#[instrument(name = "delete_link", skip(state, ctx))]
pub async fn delete_link(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path((target_user_id, target_link_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let service = LinkService::new(
        Arc::clone(&state.link_repository),
        Arc::clone(&state.user_repository),
    );
    service.delete(&ctx, &target_user_id, &target_link_id).await?;

    info!(link_id = %target_link_id, "Link deleted successfully");

    Ok(StatusCode::OK)
}
