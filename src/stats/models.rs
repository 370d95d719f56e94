//! Data models for time statistics
//!
//! Serialized as-is by `GET /api/projects/stats`.

use serde::Serialize;

/// Aggregated totals for a set of completed actions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStatsReport {
    pub total_hours: f64,
    pub total_amount: f64,
    pub project_stats: Vec<ProjectTotals>,
    pub task_stats: Vec<TaskTotals>,
    /// Newest day first
    pub daily_stats: Vec<DailyTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTotals {
    pub project_id: String,
    pub project_name: String,
    pub is_billable: bool,
    pub hourly_rate: f64,
    pub hours: f64,
    pub amount: f64,
    pub record_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTotals {
    pub task_id: String,
    pub task_name: String,
    pub color: String,
    pub project_id: Option<String>,
    pub hours: f64,
    pub amount: f64,
    pub record_count: u32,
}

/// One local calendar day, with per-project and per-task sub-totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    /// "YYYY-MM-DD"
    pub date: String,
    pub hours: f64,
    pub amount: f64,
    pub record_count: u32,
    pub projects: Vec<ProjectTotals>,
    pub tasks: Vec<TaskTotals>,
}
