//! Mediateca Server - school library management backend

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediateca_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("mediateca_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Mediateca Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool.clone());
    let services = Services::new(
        repository.clone(),
        config.auth.clone(),
        &config.bibliographic,
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        repository,
        pool,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/token", post(api::auth::token))
        .route("/auth/me", get(api::auth::me))
        // Catalog
        .route("/catalog/search", get(api::catalog::search))
        .route("/catalog/suggestions", get(api::catalog::suggestions))
        .route("/catalog", post(api::catalog::create_entry))
        .route("/catalog/:id", get(api::catalog::get_entry))
        .route("/catalog/:id", delete(api::catalog::delete_entry))
        // Copies
        .route("/copies", get(api::copies::list))
        .route("/copies", post(api::copies::create))
        .route("/copies/:id/decommission", post(api::copies::decommission))
        .route("/copies/:id/exclude", post(api::copies::exclude))
        .route("/copies/:id/restore", post(api::copies::restore))
        // Loans
        .route("/loans", get(api::loans::list))
        .route("/loans", post(api::loans::create))
        .route("/loans/:id/return", post(api::loans::return_loan))
        // Reservations
        .route("/reservations", get(api::loans::list_reservations))
        .route("/reservations", post(api::loans::create_reservation))
        // Users
        .route("/users", get(api::users::list))
        .route("/users", post(api::users::create))
        .route("/users/borrowers", get(api::users::list_borrowers))
        .route("/users/import", post(api::users::import))
        .route("/users/:id", get(api::users::get))
        .route("/users/:id", put(api::users::update))
        .route("/users/:id", delete(api::users::delete))
        // Reference data
        .route("/centres", get(api::reference::list_centres))
        .route("/centres", post(api::reference::create_centre))
        .route("/centres/:id", delete(api::reference::delete_centre))
        .route("/groups", get(api::reference::list_groups))
        .route("/groups", post(api::reference::create_group))
        .route("/groups/:id", delete(api::reference::delete_group))
        .route("/countries", get(api::reference::list_countries))
        .route("/countries", post(api::reference::create_country))
        .route("/countries/:id", delete(api::reference::delete_country))
        .route("/languages", get(api::reference::list_languages))
        .route("/languages", post(api::reference::create_language))
        .route("/languages/:id", delete(api::reference::delete_language))
        .route("/categories", get(api::reference::list_categories))
        .route("/categories", post(api::reference::create_category))
        // Audit log
        .route("/logs", get(api::logs::list))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
