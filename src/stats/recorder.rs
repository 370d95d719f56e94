//! Stats recorder - rewrites the cached stats of tasks
//!
//! Every change to an action recomputes its task's `stats` and
//! `habitStats` blocks from the full action history. Nothing is updated
//! incrementally.

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{debug, info};

use super::streaks::{compute_habit_stats, goal_reached};
use super::time_bucket::{local_date, today_local};
use crate::domain::{Action, ActionKind, Task, TaskStats};
use crate::store::{ActionFilter, Store};

/// Recomputes cached task stats in the record store
#[derive(Clone)]
pub struct StatsRecorder {
    store: Store,
}

impl StatsRecorder {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Recompute one task's cached stats.
    ///
    /// Returns the updated task, or `None` if it no longer exists.
    pub fn refresh_task(&self, task_id: &str) -> Result<Option<Task>> {
        let Some(mut task) = self.store.get_task(task_id)? else {
            debug!("[donow:stats] Task {} vanished before refresh", task_id);
            return Ok(None);
        };

        let mut filter = ActionFilter::for_task(task_id).completed();
        filter.oldest_first = true;
        let actions = self.store.list_actions(&filter)?;

        let stats = summarize_actions(&actions);
        let habit_dates: Vec<_> = actions
            .iter()
            .filter(|a| a.kind == ActionKind::Habit)
            .map(|a| local_date(a.user_start_time))
            .collect();
        let habit = compute_habit_stats(&habit_dates, today_local(), &task.habit_stats);

        self.store.save_task_stats(task_id, &stats, &habit)?;
        if task.is_habit() && goal_reached(&habit, task.daily_goal) {
            debug!("[donow:stats] Daily goal reached for task {}", task_id);
        }

        task.stats = stats;
        task.habit_stats = habit;
        Ok(Some(task))
    }

    /// Refresh several tasks, each at most once
    pub fn refresh_tasks<'a>(&self, task_ids: impl IntoIterator<Item = &'a str>) -> Result<usize> {
        let unique: BTreeSet<&str> = task_ids.into_iter().collect();
        let mut refreshed = 0;
        for task_id in unique {
            if self.refresh_task(task_id)?.is_some() {
                refreshed += 1;
            }
        }
        Ok(refreshed)
    }

    /// Recompute every task of one user, or of everyone when `user_id` is `None`
    pub fn recalculate_all(&self, user_id: Option<&str>) -> Result<usize> {
        let task_ids: Vec<String> = match user_id {
            Some(user_id) => self
                .store
                .list_tasks(user_id, None)?
                .into_iter()
                .map(|t| t.id)
                .collect(),
            None => self.store.all_task_ids()?,
        };

        let refreshed = self.refresh_tasks(task_ids.iter().map(String::as_str))?;
        info!("[donow:stats] Recalculated stats for {} task(s)", refreshed);
        Ok(refreshed)
    }
}

/// Totals over completed actions, in any order
pub fn summarize_actions(actions: &[Action]) -> TaskStats {
    let completed = actions.iter().filter(|a| a.is_completed);
    let mut stats = TaskStats::default();
    for action in completed {
        stats.total_actions += 1;
        stats.total_duration += action.duration_ms();
        let at = action.user_start_time;
        if stats.first_action_at.is_none_or(|first| at < first) {
            stats.first_action_at = Some(at);
        }
        if stats.last_action_at.is_none_or(|last| at > last) {
            stats.last_action_at = Some(at);
        }
    }
    stats
}
