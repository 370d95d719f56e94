use serde_json::json;

use super::to_json;
use crate::error::ApiResult;
use crate::server::types::{Reply, RequestContext};

/// GET /api/health, unauthenticated keep-alive ping
pub fn health() -> Reply {
    Reply::ok(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/auth/me
pub fn me(ctx: &RequestContext) -> ApiResult<Reply> {
    Ok(Reply::ok(to_json(&ctx.user)?))
}
