use clap::{Parser, Subcommand, ValueEnum};
use crate::cli::error::{service_error, user_error, validate_non_empty};
use crate::cli::output::{format_status_report, format_task_list_json, format_task_list_table, format_task_summary, TaskListOptions};
use crate::config::{Config, DebugMode};
use crate::container::{DynRepository, RepositoryRegistry};
use crate::logging::setup_logging;
use crate::models::TaskStatus;
use crate::repo::TaskRepository;
use crate::service::TaskManagerService;
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use uuid::Uuid;

type Service = TaskManagerService<DynRepository>;

#[derive(Parser)]
#[command(name = "taskbuddy")]
#[command(about = "TaskBuddy - Voice Memo Task Manager")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Debug mode controlling log verbosity (overrides debug.mode)
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,
    /// Storage backend name (overrides data.backend)
    #[arg(long, global = true)]
    pub backend: Option<String>,
    /// Data file location (overrides data.location)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks
    List {
        /// Only show tasks with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Show full task IDs
        #[arg(long)]
        full: bool,
    },
    /// Show details of a task
    Show {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Add a new task
    Add {
        /// Task title
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Mark a task as complete
    Done {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Permanently delete a task
    Delete {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Show task counts per status
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Dev,
    Test,
    Prod,
}

impl From<ModeArg> for DebugMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Dev => DebugMode::Dev,
            ModeArg::Test => DebugMode::Test,
            ModeArg::Prod => DebugMode::Prod,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Complete,
    Overdue,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::Complete => TaskStatus::Complete,
            StatusArg::Overdue => TaskStatus::Overdue,
        }
    }
}

/// Parse the process arguments and execute the selected command
pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => return Err(e.into()),
        // --help / --version
        Err(e) => {
            e.print()?;
            return Ok(());
        }
    };
    run_cli(cli)
}

pub fn run_cli(cli: Cli) -> Result<()> {
    let mode_flag = cli.mode.map(DebugMode::from);
    let config = Config::load(mode_flag)
        .context("Failed to load configuration")?
        .with_overrides(cli.backend.as_deref(), cli.data.as_deref(), mode_flag);

    setup_logging(config.debug_mode);
    info!("TaskBuddy starting in {} mode.", config.debug_mode);

    let registry = RepositoryRegistry::with_defaults();
    let service = registry
        .resolve_service(&config)
        .context("Could not initialize application services")?;

    match cli.command {
        None => handle_run_application(&service, &config),
        Some(Commands::List { status, json, full }) => handle_list(&service, status.map(Into::into), json, full),
        Some(Commands::Show { id }) => handle_show(&service, &id),
        Some(Commands::Add { title }) => handle_add(&service, &title.join(" ")),
        Some(Commands::Done { id }) => handle_done(&service, &id),
        Some(Commands::Delete { id }) => handle_delete(&service, &id),
        Some(Commands::Status) => handle_status(&service),
    }
}

fn resolve_id(service: &Service, text: &str) -> Result<Uuid> {
    service.resolve_id(text).map_err(service_error)
}

fn ensure_writable(service: &Service) -> Result<()> {
    let repo = service.repository();
    if repo.is_read_only() {
        return Err(user_error(format!("Task storage {} is read-only", repo.describe())));
    }
    Ok(())
}

/// Default flow with no subcommand: load everything and report it
fn handle_run_application(service: &Service, config: &Config) -> Result<()> {
    println!("\n--- Starting TaskBuddy Application ---");
    info!("Application running in {} mode.", config.debug_mode);

    let tasks = service.get_all_tasks();
    info!("Successfully loaded {} tasks.", tasks.len());
    for task in &tasks {
        info!("  - {}", task);
    }

    println!("Loaded {} tasks from {}.", tasks.len(), service.repository().describe());
    info!("TaskBuddy application finished.");
    Ok(())
}

fn handle_list(service: &Service, status: Option<TaskStatus>, json: bool, full: bool) -> Result<()> {
    let tasks = match status {
        Some(status) => service.tasks_with_status(status),
        None => service.get_all_tasks(),
    };

    if json {
        println!("{}", format_task_list_json(&tasks)?);
    } else {
        let options = TaskListOptions {
            full_ids: full,
            ..TaskListOptions::for_stdout()
        };
        print!("{}", format_task_list_table(&tasks, options));
    }
    Ok(())
}

fn handle_show(service: &Service, id_text: &str) -> Result<()> {
    let id = resolve_id(service, id_text)?;
    match service.get_task_by_id(id) {
        Some(task) => {
            print!("{}", format_task_summary(&task));
            Ok(())
        }
        None => Err(user_error(format!("Task {} not found", id))),
    }
}

fn handle_add(service: &Service, title: &str) -> Result<()> {
    validate_non_empty(title, "Task title").map_err(user_error)?;
    let task = service.add_new_task(title).map_err(service_error)?;
    println!("Created task {}", task.id);
    Ok(())
}

fn handle_done(service: &Service, id_text: &str) -> Result<()> {
    ensure_writable(service)?;
    let id = resolve_id(service, id_text)?;
    if service.get_task_by_id(id).is_none() {
        return Err(user_error(format!("Task {} not found", id)));
    }
    if !service.mark_task_complete(id) {
        anyhow::bail!("Failed to mark task {} as complete", id);
    }
    println!("Completed task {}", id);
    Ok(())
}

fn handle_delete(service: &Service, id_text: &str) -> Result<()> {
    ensure_writable(service)?;
    let id = resolve_id(service, id_text)?;
    if service.get_task_by_id(id).is_none() {
        return Err(user_error(format!("Task {} not found", id)));
    }
    if !service.delete_task_by_id(id) {
        anyhow::bail!("Failed to delete task {}", id);
    }
    println!("Deleted task {}", id);
    Ok(())
}

fn handle_status(service: &Service) -> Result<()> {
    let tasks = service.get_all_tasks();
    print!("{}", format_status_report(&tasks, &service.repository().describe()));
    Ok(())
}
