//! /api/timer
//!
//! Every write to an action refreshes the cached stats of the task(s) it
//! belongs to before responding.

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::info;

use super::to_json;
use crate::domain::{Action, ActionEdit, ActionKind, Task, INTERRUPTED_NOTE};
use crate::error::{ApiError, ApiResult};
use crate::server::guard::load_owned;
use crate::server::types::{
    AppState, HabitRequest, MoveActionRequest, NoteRequest, Reply, RequestContext,
    StartTimerRequest,
};
use crate::stats::goal_reached;
use crate::store::ActionFilter;

/// Treat `""` like an absent id
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn list(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let mut filter = ActionFilter::for_user(&ctx.user.id);
    if let Some(raw) = ctx.query.get("type") {
        let kind = ActionKind::parse(raw)
            .ok_or_else(|| ApiError::validation(format!("Unknown action type: {}", raw)))?;
        filter = filter.of_kind(kind);
    }
    let actions = state.store.list_actions(&filter)?;
    Ok(Reply::ok(to_json(&actions)?))
}

/// POST /api/timer/start; without a task id the user's default task is used
pub fn start(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let req: StartTimerRequest = ctx.json()?;
    let task: Task = match non_empty(req.task_id) {
        Some(task_id) => load_owned(&state.store, &task_id, &ctx.user)?,
        None => state.store.ensure_default_task(&ctx.user.id)?,
    };
    let note = non_empty(req.note).unwrap_or_else(|| state.config.timer.default_note.clone());

    let action = Action::start(&ctx.user.id, &task.id, Some(note), Utc::now());
    state.store.insert_action(&action)?;
    state.recorder.refresh_task(&task.id)?;
    info!("[donow:http] Timer started on task {}", task.id);
    Ok(Reply::created(to_json(&action)?))
}

pub fn end(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let mut action: Action = load_owned(&state.store, id, &ctx.user)?;
    action.finish(Utc::now());
    state.store.update_action(&action)?;
    state.recorder.refresh_task(&action.task_id)?;
    Ok(Reply::ok(to_json(&action)?))
}

pub fn note(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let mut action: Action = load_owned(&state.store, id, &ctx.user)?;
    let req: NoteRequest = ctx.json()?;
    action.note = req.note.unwrap_or_default();
    state.store.update_action(&action)?;
    state.recorder.refresh_task(&action.task_id)?;
    Ok(Reply::ok(to_json(&action)?))
}

/// PUT /api/timer/actions/:id, user correction of times and note
pub fn edit(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let mut action: Action = load_owned(&state.store, id, &ctx.user)?;
    let edit: ActionEdit = ctx.json()?;
    action.apply(edit)?;
    state.store.update_action(&action)?;
    state.recorder.refresh_task(&action.task_id)?;
    Ok(Reply::ok(to_json(&action)?))
}

/// PUT /api/timer/actions/:id/task, move an action to another task
pub fn move_to_task(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let mut action: Action = load_owned(&state.store, id, &ctx.user)?;
    let req: MoveActionRequest = ctx.json()?;
    let task_id = non_empty(req.task_id).ok_or_else(|| ApiError::validation("taskId is required"))?;
    let target: Task = load_owned(&state.store, &task_id, &ctx.user)?;

    let previous = std::mem::replace(&mut action.task_id, target.id.clone());
    state.store.update_action(&action)?;
    state
        .recorder
        .refresh_tasks([previous.as_str(), target.id.as_str()])?;
    info!(
        "[donow:http] Moved action {} from task {} to {}",
        action.id, previous, target.id
    );
    Ok(Reply::ok(to_json(&action)?))
}

/// POST /api/timer/habit, record one completion of a habit task
///
/// `goalReached` tells whether today's completions met the daily goal.
pub fn habit(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let req: HabitRequest = ctx.json()?;
    let task_id = non_empty(req.task_id).ok_or_else(|| ApiError::validation("taskId is required"))?;
    let task: Task = load_owned(&state.store, &task_id, &ctx.user)?;
    if !task.is_habit() {
        return Err(ApiError::validation("Task is not a habit task"));
    }

    let action = Action::habit(&ctx.user.id, &task.id, req.note, Utc::now());
    state.store.insert_action(&action)?;
    let task = state.recorder.refresh_task(&task.id)?.unwrap_or(task);
    let reached = goal_reached(&task.habit_stats, task.daily_goal);
    Ok(Reply::created(json!({
        "action": action,
        "task": task,
        "goalReached": reached,
    })))
}

/// POST /api/timer/cleanup, close the requester's forgotten timers
pub fn cleanup(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let now = Utc::now();
    let cutoff = now - Duration::minutes(state.config.timer.cleanup_after_minutes);
    let closed = state
        .store
        .close_stale_actions(&ctx.user.id, cutoff, now, INTERRUPTED_NOTE)?;
    if closed > 0 {
        info!("[donow:http] Closed {} stale timer(s)", closed);
    }
    Ok(Reply::ok(json!({
        "success": true,
        "modifiedCount": closed,
    })))
}

pub fn delete(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let action: Action = load_owned(&state.store, id, &ctx.user)?;
    if !state.store.delete_action(&action.id)? {
        return Err(ApiError::not_found("Action not found"));
    }
    state.recorder.refresh_task(&action.task_id)?;
    Ok(Reply::ok(json!({
        "success": true,
        "message": "Action deleted successfully",
    })))
}
