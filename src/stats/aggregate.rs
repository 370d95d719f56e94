//! Single-pass accumulation of hours and billable amounts

use std::collections::BTreeMap;

use super::models::{DailyTotals, ProjectTotals, TaskTotals, TimeStatsReport};
use super::time_bucket::local_day_bucket;
use crate::domain::{Project, ResolvedAction, Task};

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Default)]
struct DayAccumulator {
    totals: DailyTotals,
    projects: BTreeMap<String, ProjectTotals>,
    tasks: BTreeMap<String, TaskTotals>,
}

fn project_entry<'a>(
    map: &'a mut BTreeMap<String, ProjectTotals>,
    project: &Project,
) -> &'a mut ProjectTotals {
    map.entry(project.id.clone()).or_insert_with(|| ProjectTotals {
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        is_billable: project.is_billable,
        hourly_rate: project.hourly_rate,
        ..Default::default()
    })
}

fn task_entry<'a>(map: &'a mut BTreeMap<String, TaskTotals>, task: &Task) -> &'a mut TaskTotals {
    map.entry(task.id.clone()).or_insert_with(|| TaskTotals {
        task_id: task.id.clone(),
        task_name: task.name.clone(),
        color: task.color.clone(),
        project_id: task.project_id.clone(),
        ..Default::default()
    })
}

/// Aggregate completed actions into totals plus project, task and day breakdowns.
///
/// The caller has already applied the date range; nothing is filtered here
/// except actions whose task no longer exists.
pub fn aggregate(actions: &[ResolvedAction]) -> TimeStatsReport {
    let mut total_hours = 0.0;
    let mut total_amount = 0.0;
    let mut projects: BTreeMap<String, ProjectTotals> = BTreeMap::new();
    let mut tasks: BTreeMap<String, TaskTotals> = BTreeMap::new();
    let mut days: BTreeMap<String, DayAccumulator> = BTreeMap::new();

    for resolved in actions {
        let Some(task) = resolved.task.as_ref() else {
            continue;
        };
        let hours = resolved.action.duration_ms() as f64 / MS_PER_HOUR;
        let amount = resolved
            .project
            .as_ref()
            .map(|p| p.amount_for_hours(hours))
            .unwrap_or(0.0);

        total_hours += hours;
        total_amount += amount;

        let date = local_day_bucket(resolved.action.user_start_time);
        let day = days.entry(date.clone()).or_insert_with(|| DayAccumulator {
            totals: DailyTotals {
                date,
                ..Default::default()
            },
            ..Default::default()
        });
        day.totals.hours += hours;
        day.totals.amount += amount;
        day.totals.record_count += 1;

        if let Some(project) = resolved.project.as_ref() {
            for entry in [
                project_entry(&mut projects, project),
                project_entry(&mut day.projects, project),
            ] {
                entry.hours += hours;
                entry.amount += amount;
                entry.record_count += 1;
            }
        }

        for entry in [task_entry(&mut tasks, task), task_entry(&mut day.tasks, task)] {
            entry.hours += hours;
            entry.amount += amount;
            entry.record_count += 1;
        }
    }

    let daily_stats = days
        .into_values()
        .rev()
        .map(|day| DailyTotals {
            projects: day.projects.into_values().collect(),
            tasks: day.tasks.into_values().collect(),
            ..day.totals
        })
        .collect();

    TimeStatsReport {
        total_hours,
        total_amount,
        project_stats: projects.into_values().collect(),
        task_stats: tasks.into_values().collect(),
        daily_stats,
    }
}
