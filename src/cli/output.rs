// Output formatting utilities

use crate::models::{Task, TaskStatus};
use anyhow::Result;
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";

/// Characters of the UUID shown in tables
pub const SHORT_ID_LEN: usize = 8;

/// Options controlling table rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListOptions {
    /// Emit ANSI colors and bold headers
    pub color: bool,
    /// Print full UUIDs instead of the short prefix
    pub full_ids: bool,
}

impl TaskListOptions {
    /// Color only when stdout is a terminal and NO_COLOR is unset
    pub fn for_stdout() -> Self {
        Self {
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
            full_ids: false,
        }
    }
}

fn status_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => ANSI_FG_YELLOW,
        TaskStatus::Complete => ANSI_FG_GREEN,
        TaskStatus::Overdue => ANSI_FG_RED,
    }
}

pub fn short_id(task: &Task) -> String {
    task.id.to_string()[..SHORT_ID_LEN].to_string()
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("{}{}{}", code, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Render tasks as an aligned ID / Status / Title table
pub fn format_task_list_table(tasks: &[Task], options: TaskListOptions) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let ids: Vec<String> = tasks
        .iter()
        .map(|t| if options.full_ids { t.id.to_string() } else { short_id(t) })
        .collect();
    let id_width = ids.iter().map(|s| s.len()).max().unwrap_or(0).max("ID".len());
    let status_width = TaskStatus::ALL.iter().map(|s| s.as_str().len()).max().unwrap_or(0);

    let mut out = String::new();
    let header = format!("{:<id_width$}  {:<status_width$}  {}", "ID", "Status", "Title");
    out.push_str(&paint(&header, ANSI_BOLD, options.color));
    out.push('\n');
    out.push_str(&format!("{}  {}  {}\n", "-".repeat(id_width), "-".repeat(status_width), "-".repeat(5)));

    for (task, id) in tasks.iter().zip(&ids) {
        let status = format!("{:<status_width$}", task.status.as_str());
        out.push_str(&format!(
            "{:<id_width$}  {}  {}\n",
            id,
            paint(&status, status_color(task.status), options.color),
            task.title
        ));
    }
    out
}

/// Detailed single-task view
pub fn format_task_summary(task: &Task) -> String {
    format!(
        "ID:     {}\nTitle:  {}\nStatus: {}\n",
        task.id, task.title, task.status
    )
}

/// Tasks as a pretty-printed JSON array
pub fn format_task_list_json(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Per-status counts in `TaskStatus::ALL` order
pub fn status_counts(tasks: &[Task]) -> Vec<(TaskStatus, usize)> {
    TaskStatus::ALL
        .iter()
        .map(|&status| (status, tasks.iter().filter(|t| t.status == status).count()))
        .collect()
}

pub fn format_status_report(tasks: &[Task], backend: &str) -> String {
    let mut out = format!("Backend: {}\nTotal:   {}\n", backend, tasks.len());
    for (status, count) in status_counts(tasks) {
        out.push_str(&format!("  {:<9}{}\n", status.as_str(), count));
    }
    out
}
