//! `taskd status` — one-line server health summary.
//!
//! Exits 0 if the server is reachable and healthy, 1 otherwise (via the
//! propagated error).

use anyhow::{Context as _, Result};

use crate::client::ApiClient;

pub async fn run_status(client: &ApiClient, json: bool) -> Result<()> {
    let health = client
        .health()
        .await
        .context("taskd is not running or not reachable")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    let version = health["version"].as_str().unwrap_or("?");
    let uptime = health["uptime_secs"].as_u64().unwrap_or(0);
    let tasks = health["tasks"].as_u64().unwrap_or(0);
    println!("taskd {version} — {tasks} tasks, up {uptime}s");
    Ok(())
}
