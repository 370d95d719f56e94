//! /api/reports

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use super::to_json;
use crate::domain::{ReportView, ReportViewInput};
use crate::error::{ApiError, ApiResult};
use crate::report::{export_report, system_views, ExportRecord, ExportSettings};
use crate::server::guard::{check_ownership, Owned};
use crate::server::types::{AppState, Reply, RequestContext};
use crate::store::ActionFilter;

/// GET /api/reports/export
///
/// A `viewId` that is unknown, or not visible to the requester, is
/// ignored and the request parameters apply.
pub fn export(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let (start, end) = ctx.query.date_range()?;

    let view = match ctx.query.get("viewId") {
        Some(view_id) => {
            let view = state.store.get_view(view_id)?.filter(|v| {
                v.owner_id().is_none_or(|owner| owner == ctx.user.id)
            });
            if view.is_none() {
                debug!("[donow:export] View {} not usable, using request parameters", view_id);
            }
            view
        }
        None => None,
    };
    let settings = ExportSettings::resolve(
        view.as_ref(),
        ctx.query.get("format"),
        &ctx.query.list("fields"),
        ctx.query.flag("use24Hour"),
    )?;

    let mut filter = ActionFilter::for_user(&ctx.user.id)
        .completed()
        .started_between(start, end);
    filter.oldest_first = true;
    let project_ids = ctx.query.list("projectIds");
    if !project_ids.is_empty() {
        let task_ids = state
            .store
            .task_ids_for_projects(Some(&ctx.user.id), &project_ids)?;
        filter = filter.with_tasks(task_ids);
    }

    let actions = state.store.list_actions(&filter)?;
    if actions.is_empty() {
        return Err(ApiError::not_found(
            "No time records match the selected range or projects",
        ));
    }

    let records: Vec<ExportRecord> = state
        .store
        .resolve_actions(actions)?
        .iter()
        .map(ExportRecord::from)
        .collect();
    let file = export_report(
        &records,
        &settings,
        &state.config.export.temp_dir(),
        state.config.export.delimiter(),
        Utc::now(),
    )?;
    Ok(Reply::File(file))
}

pub fn list_views(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let views = state.store.list_views(&ctx.user.id)?;
    Ok(Reply::ok(to_json(&views)?))
}

pub fn create_view(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let input: ReportViewInput = ctx.json()?;
    let view = input.into_view(&ctx.user.id, Utc::now())?;
    state.store.insert_view(&view)?;
    info!("[donow:http] Created report view {}", view.name);
    Ok(Reply::created(to_json(&view)?))
}

pub fn get_view(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let view: ReportView = check_ownership(state.store.get_view(id)?, &ctx.user)?;
    Ok(Reply::ok(to_json(&view)?))
}

/// DELETE /api/reports/views/:id; system views are immutable
pub fn delete_view(state: &AppState, ctx: &RequestContext, id: &str) -> ApiResult<Reply> {
    let view = state
        .store
        .get_view(id)?
        .ok_or_else(|| ApiError::not_found("Report view not found"))?;
    if view.is_system {
        return Err(ApiError::forbidden("System views cannot be deleted"));
    }
    let view = check_ownership(Some(view), &ctx.user)?;
    state.store.delete_view(&view.id)?;
    Ok(Reply::ok(json!({
        "success": true,
        "message": "Report view deleted",
    })))
}

/// POST /api/reports/views/reset
pub fn reset_views(state: &AppState, ctx: &RequestContext) -> ApiResult<Reply> {
    let seeded = state.store.reset_system_views(&system_views())?;
    info!("[donow:http] Reset {} system view(s)", seeded);
    let views = state.store.list_views(&ctx.user.id)?;
    Ok(Reply::ok(json!({
        "success": true,
        "message": "System views reset",
        "views": views,
    })))
}
