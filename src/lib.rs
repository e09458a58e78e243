// Library crate for the URL shortening service
// This file exposes the public API for integration tests

pub mod link;
pub mod policy;
pub mod session;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use link::{models::LinkModel, repository::LinkRepository};
pub use session::{AuthenticatedUser, SessionContext};
pub use shared::{AppError, AppState};
pub use user::{models::UserModel, repository::UserRepository};

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Builds the application router over the given state. The session
/// middleware runs on every route so handlers always receive an explicit
/// SessionContext.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/users", post(user::register_user).get(user::list_users))
        .route("/api/login", post(user::log_in))
        .route("/api/logout", post(user::log_out))
        .route(
            "/api/users/:target_user_id/username",
            put(user::rename_username),
        )
        .route(
            "/api/users/:target_user_id/links",
            get(link::get_link_data),
        )
        .route("/api/links", post(link::shorten_url))
        .route(
            "/api/users/:target_user_id/links/:target_link_id",
            delete(link::delete_link),
        )
        .route("/:target_link_id", get(link::resolve_link))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::load_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
