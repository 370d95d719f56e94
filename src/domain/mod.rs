//! Core domain types for DoNow

mod action;
mod project;
mod report_view;
mod task;
mod user;

pub use action::{Action, ActionEdit, ActionKind, ResolvedAction, DEFAULT_NOTE, INTERRUPTED_NOTE};
pub use project::{Project, ProjectInput};
pub use report_view::{ExportFormat, ReportView, ReportViewInput};
pub use task::{
    HabitStats, Task, TaskInput, TaskKind, TaskStats, TaskUpdate, DEFAULT_DAILY_GOAL,
    DEFAULT_TASK_COLOR, DEFAULT_TASK_NAME, TASK_COLORS,
};
pub use user::{Session, User};

/// Generate a new record identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
