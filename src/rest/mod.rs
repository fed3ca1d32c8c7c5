// rest/mod.rs — Task REST API server.
//
// Axum HTTP server, local only by default.
//
// Endpoints:
//   GET    /api/tasks
//   POST   /api/tasks
//   PUT    /api/tasks/{id}
//   DELETE /api/tasks/{id}
//   GET    /api/health

pub mod error;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("task API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(routes::health::health))
        // Tasks
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/api/tasks/{id}",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
