//! Task repository contract and storage backends.
//!
//! The service layer only ever talks to [`TaskRepository`]; which backend sits
//! behind it is decided by the registry in [`crate::container`].

pub mod csv_repo;
pub mod sqlite_repo;

pub use csv_repo::CsvTaskRepository;
pub use sqlite_repo::SqliteTaskRepository;

use crate::models::Task;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors raised by task repositories
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Task with ID '{0}' not found.")]
    NotFound(Uuid),
    #[error("Task with ID '{0}' already exists.")]
    Duplicate(Uuid),
    #[error("Task file not found at: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Refusing to rewrite {}: {reason}", path.display())]
    Unwritable { path: PathBuf, reason: String },
    #[error("{0} is not supported by a read-only repository")]
    ReadOnly(&'static str),
    #[error("Failed to access task file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read or write CSV data")]
    Csv(#[from] csv::Error),
    #[error("SQLite error")]
    Sqlite(#[from] rusqlite::Error),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound(_))
    }
}

/// CRUD contract over stored tasks
pub trait TaskRepository {
    /// All tasks in storage order
    fn get_all_tasks(&self) -> RepoResult<Vec<Task>>;

    /// Single task by id; `RepoError::NotFound` when absent
    fn get_task_by_id(&self, id: Uuid) -> RepoResult<Task>;

    /// Store a new task; `RepoError::Duplicate` when the id is taken
    fn add_task(&self, task: &Task) -> RepoResult<()>;

    /// Replace the stored task with the same id
    fn update_task(&self, task: &Task) -> RepoResult<()>;

    fn delete_task(&self, id: Uuid) -> RepoResult<()>;

    /// True when every write will fail with `RepoError::ReadOnly`
    fn is_read_only(&self) -> bool {
        false
    }

    /// Short label naming the backend and its location
    fn describe(&self) -> String;
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn get_all_tasks(&self) -> RepoResult<Vec<Task>> {
        (**self).get_all_tasks()
    }

    fn get_task_by_id(&self, id: Uuid) -> RepoResult<Task> {
        (**self).get_task_by_id(id)
    }

    fn add_task(&self, task: &Task) -> RepoResult<()> {
        (**self).add_task(task)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        (**self).update_task(task)
    }

    fn delete_task(&self, id: Uuid) -> RepoResult<()> {
        (**self).delete_task(id)
    }

    fn is_read_only(&self) -> bool {
        (**self).is_read_only()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
