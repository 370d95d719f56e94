//! Task queries, including the cached stats columns

use anyhow::Result;
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};
use tracing::info;

use super::db::{from_ms, to_ms};
use super::Store;
use crate::domain::{HabitStats, Task, TaskKind, TaskStats};

const TASK_COLUMNS: &str = "id, name, color, kind, user_id, project_id, daily_goal, is_default, \
     total_actions, total_duration_ms, first_action_at, last_action_at, \
     current_streak, longest_streak, today_completed_count, created_at, updated_at";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let kind: String = row.get(3)?;
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        kind: TaskKind::parse(&kind).unwrap_or_default(),
        user_id: row.get(4)?,
        project_id: row.get(5)?,
        daily_goal: row.get(6)?,
        is_default: row.get(7)?,
        stats: TaskStats {
            total_actions: row.get(8)?,
            total_duration: row.get(9)?,
            first_action_at: row.get::<_, Option<i64>>(10)?.map(from_ms),
            last_action_at: row.get::<_, Option<i64>>(11)?.map(from_ms),
        },
        habit_stats: HabitStats {
            current_streak: row.get(12)?,
            longest_streak: row.get(13)?,
            today_completed_count: row.get(14)?,
        },
        created_at: from_ms(row.get(15)?),
        updated_at: from_ms(row.get(16)?),
    })
}

impl Store {
    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn().execute(
            r#"INSERT INTO tasks
               (id, name, color, kind, user_id, project_id, daily_goal, is_default, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            rusqlite::params![
                task.id, task.name, task.color, task.kind.as_str(), task.user_id,
                task.project_id, task.daily_goal, task.is_default, to_ms(task.created_at),
                to_ms(task.updated_at),
            ],
        )?;
        self.save_task_stats(&task.id, &task.stats, &task.habit_stats)?;
        Ok(())
    }

    /// Persist the editable fields; cached stats are left alone
    pub fn update_task(&self, task: &Task) -> Result<()> {
        self.conn().execute(
            r#"UPDATE tasks SET name = ?2, color = ?3, kind = ?4, project_id = ?5,
                   daily_goal = ?6, updated_at = ?7
               WHERE id = ?1"#,
            rusqlite::params![
                task.id, task.name, task.color, task.kind.as_str(), task.project_id,
                task.daily_goal, to_ms(task.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Overwrite both cached stats blocks
    pub fn save_task_stats(
        &self,
        task_id: &str,
        stats: &TaskStats,
        habit: &HabitStats,
    ) -> Result<()> {
        self.conn().execute(
            r#"UPDATE tasks SET total_actions = ?2, total_duration_ms = ?3, first_action_at = ?4,
                   last_action_at = ?5, current_streak = ?6, longest_streak = ?7,
                   today_completed_count = ?8
               WHERE id = ?1"#,
            rusqlite::params![
                task_id, stats.total_actions, stats.total_duration,
                stats.first_action_at.map(to_ms), stats.last_action_at.map(to_ms),
                habit.current_streak, habit.longest_streak, habit.today_completed_count,
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
        Ok(self.conn().query_row(&sql, [id], task_from_row).optional()?)
    }

    /// A user's tasks, oldest first, optionally of one kind
    pub fn list_tasks(&self, user_id: &str, kind: Option<TaskKind>) -> Result<Vec<Task>> {
        let conn = self.conn();
        let tasks = match kind {
            Some(kind) => {
                let sql = format!(
                    "SELECT {} FROM tasks WHERE user_id = ?1 AND kind = ?2 ORDER BY created_at ASC",
                    TASK_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([user_id, kind.as_str()], task_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM tasks WHERE user_id = ?1 ORDER BY created_at ASC",
                    TASK_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([user_id], task_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(tasks)
    }

    /// Ids of every task, across all users (batch recalculation)
    pub fn all_task_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id FROM tasks ORDER BY created_at ASC")?;
        let rows = stmt.query_map([], |r| r.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Ids of tasks linked to any of the given projects.
    ///
    /// With `user_id` set, only that user's tasks are returned.
    pub fn task_ids_for_projects(
        &self,
        user_id: Option<&str>,
        project_ids: &[String],
    ) -> Result<Vec<String>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; project_ids.len()].join(", ");
        let mut params: Vec<rusqlite::types::Value> = project_ids
            .iter()
            .map(|id| rusqlite::types::Value::Text(id.clone()))
            .collect();
        let mut sql = format!("SELECT id FROM tasks WHERE project_id IN ({})", placeholders);
        if let Some(user_id) = user_id {
            sql.push_str(" AND user_id = ?");
            params.push(rusqlite::types::Value::Text(user_id.to_string()));
        }

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), |r| r.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_task_actions(&self, task_id: &str) -> Result<u64> {
        Ok(self.conn().query_row(
            "SELECT COUNT(*) FROM actions WHERE task_id = ?1",
            [task_id],
            |r| r.get(0),
        )?)
    }

    /// Returns false when nothing was deleted
    pub fn delete_task(&self, id: &str) -> Result<bool> {
        let changed = self.conn().execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Look up the user's default task, creating it on first use
    pub fn ensure_default_task(&self, user_id: &str) -> Result<Task> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = ?1 AND is_default = 1 ORDER BY created_at ASC LIMIT 1",
            TASK_COLUMNS
        );
        let existing = self
            .conn()
            .query_row(&sql, [user_id], task_from_row)
            .optional()?;
        if let Some(task) = existing {
            return Ok(task);
        }

        let task = Task::default_for(user_id, Utc::now());
        self.insert_task(&task)?;
        info!("[donow:store] Created default task for user {}", user_id);
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectInput;

    #[test]
    fn test_default_task_created_once_per_user() {
        let store = Store::open_in_memory().unwrap();
        let first = store.ensure_default_task("u1").unwrap();
        let second = store.ensure_default_task("u1").unwrap();
        let other = store.ensure_default_task("u2").unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.id, other.id);
        assert!(first.is_default);
        assert_eq!(store.list_tasks("u1", None).unwrap().len(), 1);
    }

    #[test]
    fn test_stats_roundtrip_and_kind_filter() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        let habit = Task::new("Read", TaskKind::Habit, "u1", now);
        let work = Task::new("Code", TaskKind::Project, "u1", now);
        store.insert_task(&habit).unwrap();
        store.insert_task(&work).unwrap();

        let stats = TaskStats {
            total_actions: 3,
            total_duration: 90_000,
            first_action_at: Some(now),
            last_action_at: Some(now),
        };
        let streaks = HabitStats {
            current_streak: 2,
            longest_streak: 5,
            today_completed_count: 1,
        };
        store.save_task_stats(&habit.id, &stats, &streaks).unwrap();

        let loaded = store.get_task(&habit.id).unwrap().unwrap();
        assert_eq!(loaded.stats.total_actions, 3);
        assert_eq!(loaded.habit_stats, streaks);
        assert_eq!(loaded.daily_goal, Some(10));

        let habits = store.list_tasks("u1", Some(TaskKind::Habit)).unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].id, habit.id);
    }

    #[test]
    fn test_task_ids_for_projects() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        let project = ProjectInput {
            name: Some("Client".into()),
            ..Default::default()
        }
        .into_project("u1", now)
        .unwrap();
        store.insert_project(&project).unwrap();

        let mut linked = Task::new("Linked", TaskKind::Project, "u1", now);
        linked.project_id = Some(project.id.clone());
        store.insert_task(&linked).unwrap();
        store
            .insert_task(&Task::new("Loose", TaskKind::Project, "u1", now))
            .unwrap();

        let ids = store
            .task_ids_for_projects(Some("u1"), &[project.id.clone()])
            .unwrap();
        assert_eq!(ids, vec![linked.id.clone()]);
        assert!(store
            .task_ids_for_projects(Some("u2"), &[project.id.clone()])
            .unwrap()
            .is_empty());
        assert!(store.project_has_tasks(&project.id).unwrap());
    }
}
