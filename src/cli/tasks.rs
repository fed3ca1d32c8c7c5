//! One-shot task commands (`taskd tasks ...`).
//!
//! Thin wrappers over the HTTP client for scripting. The toggle command
//! mirrors the terminal UI's logic: fetch, find the current state, send
//! its negation.

use anyhow::{bail, Result};

use crate::client::ApiClient;

pub async fn run_list(client: &ApiClient, json: bool) -> Result<()> {
    let tasks = client.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for t in &tasks {
        let mark = if t.completed { "x" } else { " " };
        println!("[{mark}] {}  {}", t.id, t.task);
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    println!("{completed} of {} tasks completed", tasks.len());
    Ok(())
}

pub async fn run_add(client: &ApiClient, text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("task text must not be empty");
    }
    let task = client.create(text).await?;
    println!("Added task {}", task.id);
    Ok(())
}

pub async fn run_toggle(client: &ApiClient, id: &str) -> Result<()> {
    let tasks = client.list().await?;
    let Some(current) = tasks.iter().find(|t| t.id == id) else {
        bail!("no task with id '{id}'");
    };
    let updated = client.set_completed(id, !current.completed).await?;
    let state = if updated.completed { "completed" } else { "not completed" };
    println!("Task {} is now {state}", updated.id);
    Ok(())
}

pub async fn run_remove(client: &ApiClient, id: &str) -> Result<()> {
    client.delete(id).await?;
    println!("Task deleted");
    Ok(())
}
