use crate::db::DbConnection;
use crate::models::{Task, TaskStatus};
use crate::repo::{RepoError, RepoResult, TaskRepository};
use anyhow::Result;
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT uuid, title, status FROM tasks";

/// Task repository backed by a SQLite database
pub struct SqliteTaskRepository {
    conn: Connection,
    location: Option<PathBuf>,
}

impl SqliteTaskRepository {
    /// Open (and migrate) the database file at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = DbConnection::open(db_path)?;
        debug!("SqliteTaskRepository opened {}", db_path.display());
        Ok(Self {
            conn,
            location: Some(db_path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: DbConnection::connect_in_memory()?,
            location: None,
        })
    }

    /// Raw row to task; rows that no longer parse are logged and dropped
    fn row_to_task(uuid: String, title: String, status: String) -> Option<Task> {
        let id = match Uuid::parse_str(&uuid) {
            Ok(id) => id,
            Err(e) => {
                error!("Invalid task ID '{}' in database: {}", uuid, e);
                return None;
            }
        };
        match TaskStatus::from_str(&status) {
            Some(status) => Some(Task::with_id(id, title, status)),
            None => {
                error!("Unknown status '{}' for task {} in database", status, id);
                None
            }
        }
    }

    fn exists(&self, id: Uuid) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM tasks WHERE uuid = ?1", [id.to_string()], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn get_all_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY created_ts, rowid", TASK_SELECT_SQL))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            let (uuid, title, status) = row?;
            if let Some(task) = Self::row_to_task(uuid, title, status) {
                tasks.push(task);
            }
        }

        info!("Loaded {} tasks from {}", tasks.len(), self.describe());
        Ok(tasks)
    }

    fn get_task_by_id(&self, id: Uuid) -> RepoResult<Task> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE uuid = ?1", TASK_SELECT_SQL),
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
            )
            .optional()?;

        row.and_then(|(uuid, title, status)| Self::row_to_task(uuid, title, status))
            .ok_or(RepoError::NotFound(id))
    }

    fn add_task(&self, task: &Task) -> RepoResult<()> {
        if self.exists(task.id)? {
            return Err(RepoError::Duplicate(task.id));
        }
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO tasks (uuid, title, status, created_ts, modified_ts) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![task.id.to_string(), task.title, task.status.as_str(), now, now],
        )?;
        Ok(())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?1, status = ?2, modified_ts = ?3 WHERE uuid = ?4",
            params![
                task.title,
                task.status.as_str(),
                chrono::Utc::now().timestamp(),
                task.id.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }
        Ok(())
    }

    fn delete_task(&self, id: Uuid) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.location {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }
}
