//! /api/tasks

use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::to_json;
use crate::domain::{Project, Task, TaskInput, TaskKind, TaskUpdate};
use crate::error::{ApiError, ApiResult};
use crate::server::guard::load_owned;
use crate::server::types::{AppState, Reply, RequestContext};

pub fn list(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let kind = match ctx.query.get("type") {
        Some(raw) => Some(
            TaskKind::parse(raw)
                .ok_or_else(|| ApiError::validation(format!("Unknown task type: {}", raw)))?,
        ),
        None => None,
    };
    let tasks = state.store.list_tasks(&ctx.user.id, kind)?;
    Ok(Reply::ok(to_json(&tasks)?))
}

pub fn create(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let input: TaskInput = ctx.json()?;
    if let Some(project_id) = input.project_id.as_deref().filter(|id| !id.is_empty()) {
        let _: Project = load_owned(&state.store, project_id, &ctx.user)?;
    }

    let goal_given = input.daily_goal.is_some();
    let mut task = input.into_task(&ctx.user.id, Utc::now())?;
    if task.is_habit() && !goal_given {
        task.daily_goal = Some(state.config.timer.default_daily_goal);
    }
    state.store.insert_task(&task)?;
    info!("[donow:http] Created {} task {}", task.kind.as_str(), task.id);
    Ok(Reply::created(to_json(&task)?))
}

pub fn update(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let mut task: Task = load_owned(&state.store, id, &ctx.user)?;
    let update: TaskUpdate = ctx.json()?;
    if let Some(project_id) = update.project_id.as_deref().filter(|id| !id.is_empty()) {
        let _: Project = load_owned(&state.store, project_id, &ctx.user)?;
    }

    task.apply(update, Utc::now())?;
    state.store.update_task(&task)?;
    Ok(Reply::ok(to_json(&task)?))
}

pub fn delete(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let task: Task = load_owned(&state.store, id, &ctx.user)?;
    let action_count = state.store.count_task_actions(&task.id)?;
    if action_count > 0 {
        return Err(ApiError::validation(format!(
            "Cannot delete a task with recorded actions ({} action(s))",
            action_count
        )));
    }
    if !state.store.delete_task(&task.id)? {
        return Err(ApiError::not_found("Task not found"));
    }
    info!("[donow:http] Deleted task {}", task.id);
    Ok(Reply::ok(json!({
        "success": true,
        "message": "Task deleted",
        "deletedTask": task,
    })))
}

/// POST /api/tasks/recalculate
pub fn recalculate(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let updated = state.recorder.recalculate_all(Some(&ctx.user.id))?;
    Ok(Reply::ok(json!({
        "success": true,
        "message": "Task stats recalculated",
        "updatedTasks": updated,
    })))
}
