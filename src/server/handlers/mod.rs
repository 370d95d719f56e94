//! Route handlers, one file per resource.

pub mod misc;
pub mod projects;
pub mod reports;
pub mod tasks;
pub mod timer;

use serde::Serialize;

use crate::error::ApiResult;

/// Serialize a handler result for a JSON reply
pub(crate) fn to_json<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    Ok(serde_json::to_value(value).map_err(anyhow::Error::from)?)
}
