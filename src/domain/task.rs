use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_TASK_NAME: &str = "General";
pub const DEFAULT_TASK_COLOR: &str = "#808080";
pub const DEFAULT_DAILY_GOAL: u32 = 10;

/// Palette new tasks pick their color from
pub const TASK_COLORS: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEEAD", "#D4A5A5", "#9B6B70", "#E9967A",
    "#66CDAA", "#DEB887",
];

/// What kind of work a task tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Timed pomodoro work, optionally billed through a project
    #[default]
    Project,
    /// Daily habit counted by completions
    Habit,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Habit => "habit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "project" => Some(Self::Project),
            "habit" => Some(Self::Habit),
            _ => None,
        }
    }
}

/// Cached totals over a task's completed actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_actions: u64,
    /// Milliseconds
    pub total_duration: i64,
    pub first_action_at: Option<DateTime<Utc>>,
    pub last_action_at: Option<DateTime<Utc>>,
}

/// Cached streak counters for habit tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub today_completed_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    /// Completions per day; habit tasks only
    pub daily_goal: Option<u32>,
    /// Fallback task used when a timer starts without one
    pub is_default: bool,
    pub stats: TaskStats,
    pub habit_stats: HabitStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(name: &str, kind: TaskKind, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: super::new_id(),
            name: name.to_string(),
            color: pick_color(),
            kind,
            user_id: Some(user_id.to_string()),
            project_id: None,
            daily_goal: (kind == TaskKind::Habit).then_some(DEFAULT_DAILY_GOAL),
            is_default: false,
            stats: TaskStats::default(),
            habit_stats: HabitStats::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The per-user fallback task
    pub fn default_for(user_id: &str, now: DateTime<Utc>) -> Self {
        let mut task = Self::new(DEFAULT_TASK_NAME, TaskKind::Project, user_id, now);
        task.color = DEFAULT_TASK_COLOR.to_string();
        task.is_default = true;
        task
    }

    pub fn is_habit(&self) -> bool {
        self.kind == TaskKind::Habit
    }

    /// Apply a partial update. `projectId: ""` detaches the task from its project.
    pub fn apply(&mut self, update: TaskUpdate, now: DateTime<Utc>) -> ApiResult<()> {
        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ApiError::validation("Task name cannot be empty"));
            }
            self.name = name.to_string();
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(kind) = update.kind {
            self.kind = parse_kind(&kind)?;
        }
        if let Some(project_id) = update.project_id {
            self.project_id = Some(project_id).filter(|id| !id.is_empty());
        }
        if let Some(goal) = update.daily_goal {
            if goal == 0 {
                return Err(ApiError::validation("Daily goal must be at least 1"));
            }
            self.daily_goal = Some(goal);
        }
        if self.is_habit() && self.daily_goal.is_none() {
            self.daily_goal = Some(DEFAULT_DAILY_GOAL);
        }
        if !self.is_habit() {
            self.daily_goal = None;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Body of `POST /api/tasks`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub name: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub project_id: Option<String>,
    pub daily_goal: Option<u32>,
}

impl TaskInput {
    pub fn into_task(self, user_id: &str, now: DateTime<Utc>) -> ApiResult<Task> {
        let kind = match self.kind.as_deref() {
            Some(k) => parse_kind(k)?,
            None => TaskKind::Project,
        };
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("New task");

        let mut task = Task::new(name, kind, user_id, now);
        task.apply(
            TaskUpdate {
                name: None,
                color: self.color,
                kind: None,
                project_id: self.project_id,
                daily_goal: self.daily_goal,
            },
            now,
        )?;
        Ok(task)
    }
}

/// Body of `PUT /api/tasks/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub project_id: Option<String>,
    pub daily_goal: Option<u32>,
}

fn parse_kind(s: &str) -> ApiResult<TaskKind> {
    TaskKind::parse(s)
        .ok_or_else(|| ApiError::validation(format!("Unknown task type: {}", s)))
}

/// Random palette entry; a v4 uuid's first byte is fully random
fn pick_color() -> String {
    let byte = uuid::Uuid::new_v4().as_bytes()[0] as usize;
    TASK_COLORS[byte % TASK_COLORS.len()].to_string()
}
