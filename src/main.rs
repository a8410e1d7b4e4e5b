//! Studio Booking Server
//!
//! REST API for slot availability, deposits and calendar sync.

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_booking_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    tracing::info!("Starting Studio Booking Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    if config.calendar.calendar_id.is_none() {
        tracing::warn!("Google Calendar is not configured; availability requests will fail");
    }
    if config.payment.token.is_none() {
        tracing::warn!("Payment token is not configured; invoice creation will fail");
    }

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config).context("Failed to create services")?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state)?;

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("studio_booking_server={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Create the application router with all routes
fn create_router(state: AppState) -> anyhow::Result<Router> {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Per-IP limit on endpoints that open invoices
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(6)
            .burst_size(5)
            .finish()
            .context("Invalid rate limiter configuration")?,
    );

    let booking_routes = Router::new()
        .route("/bookings", post(api::bookings::create_booking))
        .route("/invoices", post(api::bookings::create_invoice))
        .layer(GovernorLayer {
            config: governor_conf,
        });

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        // Booking flow
        .route("/availability", get(api::availability::get_availability))
        .route("/session-types", get(api::availability::list_session_types))
        .merge(booking_routes)
        .route("/bookings/:invoice_id/status", get(api::bookings::booking_status))
        .route("/payment-webhook", post(api::payments::payment_webhook))
        // Admin
        .route("/admin/bookings", get(api::bookings::list_bookings))
        .route(
            "/admin/settings/working-hours",
            get(api::settings::get_working_hours).put(api::settings::update_working_hours),
        )
        .route(
            "/admin/vacation",
            get(api::vacations::list_vacations).post(api::vacations::create_vacation),
        )
        .route("/admin/vacation/:id", delete(api::vacations::delete_vacation))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Ok(Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        ))
}
