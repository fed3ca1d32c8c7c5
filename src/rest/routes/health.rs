use crate::AppContext;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let uptime = ctx.started_at.elapsed().as_secs();
    match ctx.storage.count_tasks().await {
        Ok(count) => Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": uptime,
            "tasks": count,
        })),
        Err(_) => Json(json!({
            "status": "degraded",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": uptime,
        })),
    }
}
