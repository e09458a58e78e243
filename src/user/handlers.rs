use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{AuthRequest, RenameRequest, UserResponse},
};
use crate::session::{clear_session_cookie, session_cookie, SessionContext, SessionService};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a new user
///
/// POST /api/users
/// Returns 201 on success, 409 if the username is taken
#[instrument(name = "register_user", skip(state, request))]
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> Result<StatusCode, AppError> {
    info!(username = %request.username, "Registering user");

    // Use injected repositories from app state
    let service = UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.credentials),
    );
    let user = service.register(&request.username, &request.password).await?;

    info!(user_id = %user.user_id, "User registered successfully");

    Ok(StatusCode::CREATED)
}

/// HTTP handler for logging in
///
/// POST /api/login
/// Establishes a session and sets the session cookie. Unknown usernames
/// and wrong passwords both answer 404.
#[instrument(name = "log_in", skip(state, ctx, request))]
pub async fn log_in(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(request): Json<AuthRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!(username = %request.username, "Logging in");

    let users = UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.credentials),
    );
    let user = users.login(&request.username, &request.password).await?;

    // Replace whatever session the caller already carried
    let sessions = SessionService::new(Arc::clone(&state.session_repository));
    let session = sessions
        .establish(ctx.token(), user.authenticated_user())
        .await?;

    info!(user_id = %user.user_id, "Login successful");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&session.id))],
    ))
}

/// HTTP handler for logging out
///
/// POST /api/logout
/// Clears the session record and the cookie
#[instrument(name = "log_out", skip(state, ctx))]
pub async fn log_out(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = ctx.token() {
        let sessions = SessionService::new(Arc::clone(&state.session_repository));
        sessions.clear(token).await?;
    }

    info!("Logged out");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
    ))
}

/// HTTP handler for renaming an account
///
/// PUT /api/users/{target_user_id}/username
/// Only the account itself or an admin may rename
#[instrument(name = "rename_username", skip(state, ctx, request))]
pub async fn rename_username(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(target_user_id): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Result<StatusCode, AppError> {
    info!(user_id = %target_user_id, "Renaming account");

    let service = UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.credentials),
    );
    service
        .rename(&ctx, &target_user_id, &request.username)
        .await?;

    Ok(StatusCode::OK)
}

/// HTTP handler for listing all accounts
///
/// GET /api/users
/// Admins only; the credential field never appears in the response
#[instrument(name = "list_users", skip(state, ctx))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let service = UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.credentials),
    );
    let users = service.list_accounts(&ctx).await?;

    info!(user_count = users.len(), "Users listed successfully");

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}
