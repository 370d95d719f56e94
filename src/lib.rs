//! DoNow - pomodoro timer, habit tracker and billable time reports
//!
//! The backend of DoNow: a REST API over a SQLite record store.
//!
//! ## Pieces
//!
//! 1. **Record store** (`store`): users, sessions, projects, tasks, timer
//!    actions and report views.
//!
//! 2. **Stats** (`stats`): hours and billable amounts per project, task and
//!    day, plus cached per-task stats and habit streaks.
//!
//! 3. **Reports** (`report`): field-mapped XLSX / CSV exports.
//!
//! 4. **Server** (`server`): the HTTP API with bearer-token identity and
//!    ownership checks.

pub mod config;
pub mod domain;
pub mod error;
pub mod report;
pub mod server;
pub mod stats;
pub mod store;

pub use domain::*;
pub use error::{ApiError, ApiResult};
