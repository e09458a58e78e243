// Public API - what other modules can use
pub use middleware::{clear_session_cookie, load_session, session_cookie, SESSION_COOKIE};
pub use service::SessionService;
pub use types::{AuthenticatedUser, SessionContext};

// Internal modules
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
mod types;
