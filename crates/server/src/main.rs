//! admarket server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admarket_api::{middleware::AppState, router as api_router};
use admarket_common::Config;
use admarket_core::{
    AccountService, AdminUserService, AppealService, BookingService, MessagingService,
    ModerationService, NotificationService, PaymentService, RoleGateService, SessionService,
};
use admarket_db::repositories::{
    AppealRepository, BookingRepository, MessagingRepository, NotificationRepository,
    PermissionRepository, UserRepository,
};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admarket=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting admarket server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(admarket_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    admarket_db::migrate(&db).await?;
    info!("Migrations completed");

    // Repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let appeal_repo = AppealRepository::new(Arc::clone(&db));
    let booking_repo = BookingRepository::new(Arc::clone(&db));
    let messaging_repo = MessagingRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let permission_repo = PermissionRepository::new(Arc::clone(&db));

    // Services
    let state = AppState {
        account_service: AccountService::new(user_repo.clone()),
        session_service: SessionService::new(&config),
        gate_service: RoleGateService::new(user_repo.clone()),
        moderation_service: ModerationService::new(user_repo.clone()),
        appeal_service: AppealService::new(user_repo.clone(), appeal_repo),
        admin_service: AdminUserService::new(user_repo.clone(), permission_repo),
        messaging_service: MessagingService::new(messaging_repo, user_repo.clone()),
        notification_service: NotificationService::new(notification_repo),
        booking_service: BookingService::new(booking_repo.clone(), user_repo),
        payment_service: PaymentService::new(booking_repo, &config),
        secure_cookies: config.auth.secure_cookies,
        session_days: config.auth.session_days,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admarket_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
