use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shortly::link::repository::InMemoryLinkRepository;
use shortly::session::repository::InMemorySessionRepository;
use shortly::user::credentials::Argon2Credentials;
use shortly::user::repository::InMemoryUserRepository;
use shortly::{app, AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shortly=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting URL shortening server");

    // Create shared application state with dependency injection
    // Easy to switch between implementations:
    let user_repository = Arc::new(InMemoryUserRepository::new());
    let link_repository = Arc::new(InMemoryLinkRepository::new());
    let session_repository = Arc::new(InMemorySessionRepository::new());

    // For production with PostgreSQL:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let user_repository = Arc::new(shortly::user::repository::PostgresUserRepository::new(pool.clone()));
    // let link_repository = Arc::new(shortly::link::repository::PostgresLinkRepository::new(pool.clone()));
    // let session_repository = Arc::new(shortly::session::repository::PostgresSessionRepository::new(pool));

    let app_state = AppState::new(
        user_repository,
        link_repository,
        session_repository,
        Arc::new(Argon2Credentials),
    );

    let app = app(app_state);

    // run our app with hyper, listening on the configured port
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();
    info!("Server running on http://localhost:{}", port);
    axum::serve(listener, app).await.unwrap();
}
