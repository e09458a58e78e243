// Public API - what other modules can use
pub use handlers::{list_users, log_in, log_out, register_user, rename_username};
pub use service::UserService;

// Internal modules
pub mod credentials;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
