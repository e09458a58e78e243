// Public API - what other modules can use
pub use handlers::{delete_link, get_link_data, resolve_link, shorten_url};
pub use id::derive_link_id;
pub use service::LinkService;

// Internal modules
mod handlers;
pub mod id;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
