//! Time statistics for DoNow
//!
//! Two jobs live here:
//! - aggregating completed actions into hours and billable amounts
//!   (per project, per task, per local day) for `GET /api/projects/stats`
//! - keeping each task's cached `stats` / `habitStats` blocks current
//!
//! # Usage
//!
//! ```ignore
//! let filter = ActionFilter::for_user(&user.id).completed();
//! let report = aggregate(&store.resolve_actions(store.list_actions(&filter)?)?);
//!
//! // After any action write
//! StatsRecorder::new(store.clone()).refresh_task(&action.task_id)?;
//! ```

mod aggregate;
mod models;
mod recorder;
mod streaks;
mod time_bucket;

pub use aggregate::aggregate;
pub use models::{DailyTotals, ProjectTotals, TaskTotals, TimeStatsReport};
pub use recorder::{summarize_actions, StatsRecorder};
pub use streaks::{compute_habit_stats, goal_reached};
pub use time_bucket::{
    local_date, local_day_bucket, local_day_end, local_day_start, parse_day_bucket, today_local,
};
