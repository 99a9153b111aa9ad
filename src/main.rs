mod config;
mod database;
mod error;
mod export;
mod extraction;
mod handlers;
mod middleware;
mod models;
mod responses;
mod stats;
mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use dotenvy::dotenv;

use config::Config;
use database::{create_database_pool, Database};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = Config::from_env().expect("invalid configuration");

    let db = create_database_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Build the application router
    let app = create_router(db);

    let addr = format!("{}:{}", config.host, config.port);
    log::info!("kharcha server starting on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(db: Database) -> Router {
    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health))

        // Employee routes (bearer token required)
        .route("/expenses", post(handlers::expenses::create_expense))
        .route("/expenses/my", get(handlers::expenses::my_expenses))
        .route("/expenses/my/statistics", get(handlers::expenses::my_statistics))
        .route("/expenses/my/export", get(handlers::expenses::export_my_expenses))

        // HR routes (reviewer role required)
        .route("/hr/expenses", get(handlers::hr::all_expenses))
        .route("/hr/expenses/statistics", get(handlers::hr::statistics))
        .route("/hr/expenses/export", get(handlers::hr::export_all_expenses))
        .route("/hr/expenses/:id/status", patch(handlers::hr::update_expense_status))
        .route("/hr/expenses/bulk-status", post(handlers::hr::bulk_update_status))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
        )
        .with_state(db)
}
