//! CSV file storage for tasks.
//!
//! The file carries a header row naming at least `id`, `title` and `status`.
//! Reads are lenient: unusable rows are logged and skipped rather than failing
//! the whole load. Writes are strict: they refuse to rewrite a file the reader
//! could not fully understand, then replace it through a persisted temp file.

use crate::models::{Task, TaskStatus};
use crate::repo::{RepoError, RepoResult, TaskRepository};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

const REQUIRED_HEADERS: [&str; 3] = ["id", "title", "status"];

/// Column positions of the required fields within a header row
struct Columns {
    id: usize,
    title: usize,
    status: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Option<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Some(Self {
            id: find("id")?,
            title: find("title")?,
            status: find("status")?,
        })
    }
}

/// Outcome of parsing the file
enum CsvContents {
    Empty,
    MissingHeaders,
    Rows { tasks: Vec<Task>, skipped: usize },
}

/// Task repository backed by a CSV file
pub struct CsvTaskRepository {
    file_path: PathBuf,
    read_only: bool,
}

impl CsvTaskRepository {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        debug!("CsvTaskRepository initialized. Expected file_path: {}", file_path.display());
        Self {
            file_path,
            read_only: false,
        }
    }

    /// Repository that refuses every write (used for bundled sample data)
    pub fn read_only(file_path: impl Into<PathBuf>) -> Self {
        Self {
            read_only: true,
            ..Self::new(file_path)
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn parse_row(row_num: usize, record: &StringRecord, columns: &Columns) -> Option<Task> {
        let (Some(id), Some(title), Some(status)) = (
            record.get(columns.id),
            record.get(columns.title),
            record.get(columns.status),
        ) else {
            warn!("Skipping row {} due to missing values for required fields: {:?}", row_num, record);
            return None;
        };

        let (id, title, status) = (id.trim(), title.trim(), status.trim());
        if id.is_empty() || title.is_empty() || status.is_empty() {
            warn!("Skipping row {} due to empty required fields: {:?}", row_num, record);
            return None;
        }

        let id = match Uuid::parse_str(id) {
            Ok(id) => id,
            Err(e) => {
                error!("Invalid task ID in row {}: {}. Row: {:?}", row_num, e, record);
                return None;
            }
        };
        let Some(status) = TaskStatus::from_str(status) else {
            error!("Unknown status '{}' in row {}. Row: {:?}", status, row_num, record);
            return None;
        };

        Some(Task::with_id(id, title, status))
    }

    /// Current tasks for a write; a missing file is treated as empty.
    ///
    /// Unlike `get_all_tasks`, any row or header the reader would have to drop
    /// fails the write, so a rewrite never loses stored data.
    fn load_for_write(&self, operation: &'static str) -> RepoResult<Vec<Task>> {
        if self.read_only {
            return Err(RepoError::ReadOnly(operation));
        }
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }
        match self.read_contents()? {
            CsvContents::Empty => Ok(Vec::new()),
            CsvContents::MissingHeaders => Err(RepoError::Unwritable {
                path: self.file_path.clone(),
                reason: format!("header row lacks one of {}", REQUIRED_HEADERS.join(",")),
            }),
            CsvContents::Rows { skipped, .. } if skipped > 0 => Err(RepoError::Unwritable {
                path: self.file_path.clone(),
                reason: format!("{} row(s) could not be read", skipped),
            }),
            CsvContents::Rows { tasks, .. } => Ok(tasks),
        }
    }

    fn write_all(&self, tasks: &[Task]) -> RepoResult<()> {
        let io_err = |source| RepoError::Io {
            path: self.file_path.clone(),
            source,
        };

        let parent = match self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(io_err)?;
                parent
            }
            None => Path::new("."),
        };

        // Removed on drop unless persisted
        let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
        {
            let mut writer = WriterBuilder::new().from_writer(tmp.as_file_mut());
            writer.write_record(REQUIRED_HEADERS)?;
            for task in tasks {
                writer.write_record([task.id.to_string().as_str(), task.title.as_str(), task.status.as_str()])?;
            }
            writer.flush().map_err(io_err)?;
        }

        tmp.persist(&self.file_path).map_err(|e| io_err(e.error))?;
        debug!("Wrote {} tasks to {}", tasks.len(), self.file_path.display());
        Ok(())
    }

    /// Parse the file, keeping count of the rows that had to be dropped
    fn read_contents(&self) -> RepoResult<CsvContents> {
        if !self.file_path.exists() {
            warn!("CSV file not found at: {}", self.file_path.display());
            return Err(RepoError::FileNotFound(self.file_path.clone()));
        }

        let content = fs::read_to_string(&self.file_path).map_err(|source| RepoError::Io {
            path: self.file_path.clone(),
            source,
        })?;
        debug!("Successfully opened CSV file: {}", self.file_path.display());

        if content.trim().is_empty() {
            warn!("CSV file '{}' is empty or contains only whitespace.", self.file_path.display());
            return Ok(CsvContents::Empty);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        debug!("CSV headers found: {:?}", headers);
        let Some(columns) = Columns::locate(&headers) else {
            error!(
                "Missing expected headers in CSV '{}'. Expected: {:?}, Found: {:?}",
                self.file_path.display(),
                REQUIRED_HEADERS,
                headers
            );
            return Ok(CsvContents::MissingHeaders);
        };

        let mut tasks = Vec::new();
        let mut skipped = 0;
        for (index, record) in reader.records().enumerate() {
            // Header is row 1
            let row_num = index + 2;
            let task = match record {
                Ok(record) => Self::parse_row(row_num, &record, &columns),
                Err(e) => {
                    error!("Unreadable CSV row {}: {}", row_num, e);
                    None
                }
            };
            match task {
                Some(task) => tasks.push(task),
                None => skipped += 1,
            }
        }

        Ok(CsvContents::Rows { tasks, skipped })
    }
}

impl TaskRepository for CsvTaskRepository {
    fn get_all_tasks(&self) -> RepoResult<Vec<Task>> {
        let tasks = match self.read_contents()? {
            CsvContents::Empty | CsvContents::MissingHeaders => Vec::new(),
            CsvContents::Rows { tasks, .. } => tasks,
        };
        info!("Successfully loaded {} tasks from {}", tasks.len(), self.file_path.display());
        Ok(tasks)
    }

    fn get_task_by_id(&self, id: Uuid) -> RepoResult<Task> {
        debug!("Attempting to retrieve task with ID: {}", id);
        match self.get_all_tasks()?.into_iter().find(|t| t.id == id) {
            Some(task) => {
                info!("Found task with ID {}: {}", id, task.title);
                Ok(task)
            }
            None => {
                warn!("Task with ID '{}' not found in {}.", id, self.file_path.display());
                Err(RepoError::NotFound(id))
            }
        }
    }

    fn add_task(&self, task: &Task) -> RepoResult<()> {
        let mut tasks = self.load_for_write("add_task")?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(RepoError::Duplicate(task.id));
        }
        tasks.push(task.clone());
        self.write_all(&tasks)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let mut tasks = self.load_for_write("update_task")?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(RepoError::NotFound(task.id))?;
        *slot = task.clone();
        self.write_all(&tasks)
    }

    fn delete_task(&self, id: Uuid) -> RepoResult<()> {
        let mut tasks = self.load_for_write("delete_task")?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(RepoError::NotFound(id));
        }
        self.write_all(&tasks)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn describe(&self) -> String {
        let mode = if self.read_only { " (read-only)" } else { "" };
        format!("csv:{}{}", self.file_path.display(), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PLUMBER_ID: &str = "f0a3e8b1-1d2c-4e5f-8a9b-0c1d2e3f4a5b";

    fn repo_with(content: &str) -> (TempDir, CsvTaskRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.csv");
        fs::write(&path, content).unwrap();
        (temp_dir, CsvTaskRepository::new(path))
    }

    #[test]
    fn test_reads_rows_in_file_order() {
        let (_dir, repo) = repo_with(&format!(
            "id,title,status\n{},Call plumber for leaky faucet,pending\n\
             1b2c3d4e-5f6a-7b8c-9d0e-1f2a3b4c5d6e,Schedule dentist appointment,COMPLETE\n",
            PLUMBER_ID
        ));
        let tasks = repo.get_all_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id.to_string(), PLUMBER_ID);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[1].status, TaskStatus::Complete);
    }

    #[test]
    fn test_header_order_and_extra_columns() {
        let (_dir, repo) = repo_with(&format!(
            "status, title ,notes,id\nOverdue,  Pay rent  ,ignored,{}\n",
            PLUMBER_ID
        ));
        let tasks = repo.get_all_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Pay rent");
        assert_eq!(tasks[0].status, TaskStatus::Overdue);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let (_dir, repo) = repo_with(&format!(
            "id,title,status\n\
             not-a-uuid,Bad id,PENDING\n\
             {},Bad status,SOMEDAY\n\
             {},,PENDING\n\
             {}\n\
             {},Good row,OVERDUE\n",
            PLUMBER_ID, PLUMBER_ID, PLUMBER_ID, PLUMBER_ID
        ));
        let tasks = repo.get_all_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Good row");
    }

    #[test]
    fn test_empty_file_gives_no_tasks() {
        let (_dir, repo) = repo_with("   \n\n");
        assert!(repo.get_all_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_missing_headers_gives_no_tasks() {
        let (_dir, repo) = repo_with(&format!("id,name\n{},Something\n", PLUMBER_ID));
        assert!(repo.get_all_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CsvTaskRepository::new(temp_dir.path().join("nope.csv"));
        assert!(matches!(repo.get_all_tasks(), Err(RepoError::FileNotFound(_))));
    }

    #[test]
    fn test_add_creates_file_and_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tasks.csv");
        let repo = CsvTaskRepository::new(&path);

        let task = Task::new("Buy milk, eggs");
        repo.add_task(&task).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,title,status\n"));
        assert!(content.contains("\"Buy milk, eggs\""));
        assert_eq!(repo.get_task_by_id(task.id).unwrap(), task);
    }

    #[test]
    fn test_add_duplicate_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CsvTaskRepository::new(temp_dir.path().join("tasks.csv"));
        let task = Task::new("Once");
        repo.add_task(&task).unwrap();
        assert!(matches!(repo.add_task(&task), Err(RepoError::Duplicate(id)) if id == task.id));
    }

    #[test]
    fn test_update_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CsvTaskRepository::new(temp_dir.path().join("tasks.csv"));
        let mut first = Task::new("First");
        let second = Task::new("Second");
        repo.add_task(&first).unwrap();
        repo.add_task(&second).unwrap();

        first.mark_complete();
        repo.update_task(&first).unwrap();
        assert!(repo.get_task_by_id(first.id).unwrap().is_complete());

        repo.delete_task(first.id).unwrap();
        let remaining = repo.get_all_tasks().unwrap();
        assert_eq!(remaining, vec![second]);

        assert!(repo.delete_task(first.id).unwrap_err().is_not_found());
        assert!(repo.update_task(&first).unwrap_err().is_not_found());
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let (_dir, repo) = repo_with(&format!("id,title,status\n{},Plumber,PENDING\n", PLUMBER_ID));
        let repo = CsvTaskRepository::read_only(repo.file_path());
        let err = repo.add_task(&Task::new("Nope")).unwrap_err();
        assert!(matches!(err, RepoError::ReadOnly("add_task")));
        assert!(err.to_string().contains("add_task"));
        assert_eq!(repo.get_all_tasks().unwrap().len(), 1);
        assert!(repo.describe().ends_with("(read-only)"));
        assert!(repo.is_read_only());
    }

    #[test]
    fn test_write_refuses_unrecognized_header() {
        let original = format!("ID,Title,Status\n{},Plumber,PENDING\n{},Dentist,COMPLETE\n", PLUMBER_ID, Uuid::new_v4());
        let (_dir, repo) = repo_with(&original);
        assert!(repo.get_all_tasks().unwrap().is_empty());

        let err = repo.add_task(&Task::new("New")).unwrap_err();
        assert!(matches!(err, RepoError::Unwritable { .. }));
        assert!(err.to_string().contains("header row lacks one of id,title,status"));
        assert_eq!(fs::read_to_string(repo.file_path()).unwrap(), original);
    }

    #[test]
    fn test_write_refuses_file_with_skipped_rows() {
        let original = format!(
            "id,title,status\n{},Plumber,SOMEDAY\n{},Dentist,PENDING\n",
            PLUMBER_ID,
            Uuid::new_v4()
        );
        let (_dir, repo) = repo_with(&original);
        let dentist = repo.get_all_tasks().unwrap().remove(0);

        for result in [
            repo.add_task(&Task::new("New")),
            repo.update_task(&dentist),
            repo.delete_task(dentist.id),
        ] {
            match result {
                Err(RepoError::Unwritable { reason, .. }) => assert_eq!(reason, "1 row(s) could not be read"),
                other => panic!("expected unwritable file, got {:?}", other),
            }
        }
        assert_eq!(fs::read_to_string(repo.file_path()).unwrap(), original);
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CsvTaskRepository::new(temp_dir.path().join("tasks.csv"));
        repo.add_task(&Task::new("One")).unwrap();
        repo.add_task(&Task::new("Two")).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("tasks.csv")]);
    }
}
