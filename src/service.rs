//! Task use-case service.
//!
//! Business rules live here; storage is reached only through the injected
//! [`TaskRepository`]. Read paths degrade to empty/`None` results after
//! logging, write paths either propagate (`add_new_task`) or report a flag.

use crate::models::{Task, TaskStatus};
use crate::repo::{RepoError, TaskRepository};
use log::{debug, error, info, warn};
use thiserror::Error;
use uuid::Uuid;

/// Shortest id prefix accepted by [`TaskManagerService::resolve_id`]
pub const MIN_ID_PREFIX_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error(
        "Invalid task ID: '{}'. Use a full UUID or a prefix of at least {} hex characters.",
        .0,
        MIN_ID_PREFIX_LEN
    )]
    InvalidId(String),
    #[error("Task '{0}' not found")]
    NoMatch(String),
    #[error("Task ID prefix '{prefix}' is ambiguous ({count} tasks match)")]
    Ambiguous { prefix: String, count: usize },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    /// Errors caused by what the user typed rather than by storage
    pub fn is_user_error(&self) -> bool {
        match self {
            ServiceError::Repo(e) => e.is_not_found() || matches!(e, RepoError::ReadOnly(_)),
            _ => true,
        }
    }
}

/// Manages task business logic over an injected repository
pub struct TaskManagerService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskManagerService<R> {
    pub fn new(repo: R) -> Self {
        debug!("TaskManagerService initialized with repository: {}", repo.describe());
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// All tasks; an empty list if the repository cannot be read
    pub fn get_all_tasks(&self) -> Vec<Task> {
        info!("Retrieving all tasks from repository.");
        match self.repo.get_all_tasks() {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("Error retrieving all tasks: {:#}", anyhow::Error::from(e));
                Vec::new()
            }
        }
    }

    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<Task> {
        self.get_all_tasks()
            .into_iter()
            .filter(|t| t.status == status)
            .collect()
    }

    pub fn get_task_by_id(&self, id: Uuid) -> Option<Task> {
        info!("Retrieving task with ID: {}", id);
        match self.repo.get_task_by_id(id) {
            Ok(task) => Some(task),
            Err(e) if e.is_not_found() => {
                warn!("Task with ID {} not found: {}", id, e);
                None
            }
            Err(e) => {
                error!("Error retrieving task by ID {}: {:#}", id, anyhow::Error::from(e));
                None
            }
        }
    }

    /// Create a pending task with the trimmed title and store it
    pub fn add_new_task(&self, title: &str) -> Result<Task, ServiceError> {
        let title = title.trim();
        info!("Attempting to add new task: '{}'", title);
        if title.is_empty() {
            return Err(ServiceError::EmptyTitle);
        }

        let task = Task::new(title);
        if let Err(e) = self.repo.add_task(&task) {
            error!("Error adding new task '{}': {}", title, e);
            return Err(e.into());
        }
        info!("Successfully added task: {}", task);
        Ok(task)
    }

    /// Returns false when the task is missing or the update fails
    pub fn mark_task_complete(&self, id: Uuid) -> bool {
        info!("Attempting to mark task {} as complete.", id);
        let Some(mut task) = self.get_task_by_id(id) else {
            warn!("Task {} not found for marking complete.", id);
            return false;
        };

        task.mark_complete();
        match self.repo.update_task(&task) {
            Ok(()) => {
                info!("Task {} marked as complete.", id);
                true
            }
            Err(e) => {
                error!("Error updating task {} to complete: {}", id, e);
                false
            }
        }
    }

    /// Returns false when the task is missing or the delete fails
    pub fn delete_task_by_id(&self, id: Uuid) -> bool {
        info!("Attempting to delete task with ID: {}", id);
        match self.repo.delete_task(id) {
            Ok(()) => {
                info!("Task {} deleted successfully.", id);
                true
            }
            Err(e) if e.is_not_found() => {
                warn!("Task {} not found for deletion: {}", id, e);
                false
            }
            Err(e) => {
                error!("Error deleting task {}: {}", id, e);
                false
            }
        }
    }

    /// Full UUID, or a unique case-insensitive prefix of an existing task id
    pub fn resolve_id(&self, text: &str) -> Result<Uuid, ServiceError> {
        let text = text.trim();
        if let Ok(id) = Uuid::parse_str(text) {
            return Ok(id);
        }

        let prefix = text.to_ascii_lowercase();
        let is_prefix = prefix.len() >= MIN_ID_PREFIX_LEN
            && prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
        if !is_prefix {
            return Err(ServiceError::InvalidId(text.to_string()));
        }

        let tasks = match self.repo.get_all_tasks() {
            Ok(tasks) => tasks,
            // Nothing stored yet
            Err(RepoError::FileNotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let matches: Vec<Uuid> = tasks
            .into_iter()
            .map(|t| t.id)
            .filter(|id| id.to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(ServiceError::NoMatch(text.to_string())),
            [id] => Ok(*id),
            _ => Err(ServiceError::Ambiguous {
                prefix: text.to_string(),
                count: matches.len(),
            }),
        }
    }
}
