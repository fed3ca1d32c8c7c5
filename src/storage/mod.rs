use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the server indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
/// Returns an error if the operation takes longer than `QUERY_TIMEOUT`.
async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

/// One task row.
///
/// Serializes to the wire shape `{id, task, completed, createdAt, updatedAt}`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: String,
    pub task: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (or create) the task database at `{data_dir}/taskd.db` and run
    /// migrations.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("taskd.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Insert a new task with a fresh id, `completed = false`, and both
    /// timestamps set to now. The text is stored as given.
    pub async fn create_task(&self, text: &str) -> Result<TaskRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO tasks (id, task, completed, created_at, updated_at)
             VALUES (?, ?, 0, ?, ?)",
        )
        .bind(&id)
        .bind(text)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_task(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after insert"))
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<TaskRow>> {
        Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// All tasks, newest first.
    pub async fn list_tasks(&self) -> Result<Vec<TaskRow>> {
        with_timeout(async {
            Ok(
                sqlx::query_as("SELECT * FROM tasks ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?,
            )
        })
        .await
    }

    pub async fn count_tasks(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }

    /// Set a task's completion state and refresh `updated_at`.
    ///
    /// Returns the updated row, or `None` when no row matched the id.
    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<Option<TaskRow>> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query("UPDATE tasks SET completed = ?, updated_at = ? WHERE id = ?")
            .bind(completed)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_task(id).await
    }

    /// Delete a task. A missing row is not distinguished from success.
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_test_storage(dir: &TempDir) -> Storage {
        Storage::new(dir.path()).await.unwrap()
    }

    #[tokio::test]
    async fn create_and_list_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = open_test_storage(&dir).await;

        let created = storage.create_task("buy milk").await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.task, "buy milk");
        assert!(!created.completed);
        assert_eq!(created.created_at, created.updated_at);

        let tasks = storage.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, created.id);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let dir = TempDir::new().unwrap();
        let storage = open_test_storage(&dir).await;

        let first = storage.create_task("first").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = storage.create_task("second").await.unwrap();

        let tasks = storage.list_tasks().await.unwrap();
        assert_eq!(tasks[0].id, second.id);
        assert_eq!(tasks[1].id, first.id);
    }

    #[tokio::test]
    async fn set_completed_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = open_test_storage(&dir).await;
        let task = storage.create_task("laundry").await.unwrap();

        let once = storage.set_completed(&task.id, true).await.unwrap().unwrap();
        assert!(once.completed);
        let twice = storage.set_completed(&task.id, true).await.unwrap().unwrap();
        assert!(twice.completed);

        let fetched = storage.get_task(&task.id).await.unwrap().unwrap();
        assert!(fetched.completed);
    }

    #[tokio::test]
    async fn set_completed_unknown_id_returns_none() {
        let dir = TempDir::new().unwrap();
        let storage = open_test_storage(&dir).await;

        let result = storage
            .set_completed("00000000-0000-0000-0000-000000000000", true)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_is_indistinguishable_from_absence() {
        let dir = TempDir::new().unwrap();
        let storage = open_test_storage(&dir).await;
        let task = storage.create_task("ephemeral").await.unwrap();

        storage.delete_task(&task.id).await.unwrap();
        // Second delete of the same id still succeeds.
        storage.delete_task(&task.id).await.unwrap();

        let tasks = storage.list_tasks().await.unwrap();
        assert!(tasks.iter().all(|t| t.id != task.id));
    }
}
