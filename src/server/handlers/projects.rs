//! /api/projects

use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::to_json;
use crate::domain::{Project, ProjectInput};
use crate::error::{ApiError, ApiResult};
use crate::server::guard::load_owned;
use crate::server::types::{AppState, Reply, RequestContext};
use crate::stats::aggregate;
use crate::store::ActionFilter;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

pub fn list(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let projects = state.store.list_projects(&ctx.user.id)?;
    Ok(Reply::ok(to_json(&projects)?))
}

pub fn create(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let input: ProjectInput = ctx.json()?;
    let project = input.into_project(&ctx.user.id, Utc::now())?;
    state.store.insert_project(&project)?;
    info!("[donow:http] Created project {} ({})", project.name, project.id);
    Ok(Reply::created(to_json(&project)?))
}

pub fn update(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let mut project: Project = load_owned(&state.store, id, &ctx.user)?;
    let input: ProjectInput = ctx.json()?;
    project.apply(input, Utc::now())?;
    state.store.update_project(&project)?;
    Ok(Reply::ok(to_json(&project)?))
}

pub fn delete(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let project: Project = load_owned(&state.store, id, &ctx.user)?;
    if state.store.project_has_tasks(&project.id)? {
        return Err(ApiError::validation(
            "Cannot delete a project that still has tasks",
        ));
    }
    if !state.store.delete_project(&project.id)? {
        return Err(ApiError::not_found("Project not found"));
    }
    info!("[donow:http] Deleted project {}", project.id);
    Ok(Reply::ok(json!({
        "success": true,
        "message": "Project deleted",
        "deletedProject": project,
    })))
}

/// GET /api/projects/stats
///
/// `taskIds` takes precedence over `projectIds`.
pub fn stats(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let (start, end) = ctx.query.date_range()?;

    let mut filter = ActionFilter::for_user(&ctx.user.id).completed();
    filter.started_from = Some(start);
    filter.ended_until = Some(end);

    let task_ids = ctx.query.list("taskIds");
    let project_ids = ctx.query.list("projectIds");
    if !task_ids.is_empty() {
        filter = filter.with_tasks(task_ids);
    } else if !project_ids.is_empty() {
        let ids = state
            .store
            .task_ids_for_projects(Some(&ctx.user.id), &project_ids)?;
        filter = filter.with_tasks(ids);
    }

    let actions = state.store.list_actions(&filter)?;
    let report = aggregate(&state.store.resolve_actions(actions)?);
    Ok(Reply::ok(to_json(&report)?))
}

/// GET /api/projects/:id/actions, paginated, newest first
pub fn actions(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let project: Project = load_owned(&state.store, id, &ctx.user)?;
    let page = ctx.query.positive("page", 1)?;
    let limit = ctx.query.positive("limit", DEFAULT_PAGE_SIZE)?;
    if limit > MAX_PAGE_SIZE {
        return Err(ApiError::validation(format!(
            "limit must be at most {}",
            MAX_PAGE_SIZE
        )));
    }
    let offset = (page - 1)
        .checked_mul(limit)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| ApiError::validation("page is out of range"))?;

    let task_ids = state
        .store
        .task_ids_for_projects(None, std::slice::from_ref(&project.id))?;
    let mut filter = ActionFilter::default().with_tasks(task_ids).completed();
    if let Some((start, end)) = ctx.query.optional_date_range()? {
        filter = filter.started_between(start, end);
    }

    let total = state.store.count_actions(&filter)? as usize;
    let actions = state
        .store
        .list_actions(&filter.page(limit, offset))?;
    let rows: Vec<serde_json::Value> = state
        .store
        .resolve_actions(actions)?
        .into_iter()
        .map(|r| {
            json!({
                "id": r.action.id,
                "date": r.action.user_start_time,
                "taskName": r.task.map(|t| t.name),
                "note": r.action.note,
                "startTime": r.action.user_start_time,
                "endTime": r.action.user_end_time,
                "duration": r.action.duration_ms(),
            })
        })
        .collect();

    let total_pages = total.div_ceil(limit);
    Ok(Reply::ok(json!({
        "actions": rows,
        "pagination": {
            "currentPage": page,
            "totalPages": total_pages,
            "totalItems": total,
            "hasMore": page < total_pages,
        },
    })))
}
