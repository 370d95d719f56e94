//! Timer action queries

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row};

use super::db::{from_ms, to_ms};
use super::Store;
use crate::domain::{Action, ActionKind, Project, ResolvedAction, Task};

const ACTION_COLUMNS: &str = "id, start_time, end_time, user_start_time, user_end_time, note, \
     is_completed, kind, user_id, task_id";

fn action_from_row(row: &Row<'_>) -> rusqlite::Result<Action> {
    let kind: String = row.get(7)?;
    Ok(Action {
        id: row.get(0)?,
        start_time: from_ms(row.get(1)?),
        end_time: row.get::<_, Option<i64>>(2)?.map(from_ms),
        user_start_time: from_ms(row.get(3)?),
        user_end_time: row.get::<_, Option<i64>>(4)?.map(from_ms),
        note: row.get(5)?,
        is_completed: row.get(6)?,
        kind: ActionKind::parse(&kind).unwrap_or_default(),
        user_id: row.get(8)?,
        task_id: row.get(9)?,
    })
}

/// Selection criteria for action queries
///
/// All set criteria are combined with AND. Results are ordered by
/// `user_start_time`, newest first unless `oldest_first` is set.
#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    pub user_id: Option<String>,
    /// `Some(empty)` matches nothing
    pub task_ids: Option<Vec<String>>,
    pub kind: Option<ActionKind>,
    pub completed_only: bool,
    /// `user_start_time >= started_from`
    pub started_from: Option<DateTime<Utc>>,
    /// `user_start_time <= started_until`
    pub started_until: Option<DateTime<Utc>>,
    /// `user_end_time <= ended_until`
    pub ended_until: Option<DateTime<Utc>>,
    pub oldest_first: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl ActionFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_task(task_id: &str) -> Self {
        Self {
            task_ids: Some(vec![task_id.to_string()]),
            ..Default::default()
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed_only = true;
        self
    }

    pub fn of_kind(mut self, kind: ActionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn started_between(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.started_from = Some(from);
        self.started_until = Some(until);
        self
    }

    pub fn with_tasks(mut self, task_ids: Vec<String>) -> Self {
        self.task_ids = Some(task_ids);
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(user_id) = &self.user_id {
            clauses.push("user_id = ?".to_string());
            params.push(Value::Text(user_id.clone()));
        }
        if let Some(task_ids) = &self.task_ids {
            if task_ids.is_empty() {
                clauses.push("0 = 1".to_string());
            } else {
                clauses.push(format!("task_id IN ({})", vec!["?"; task_ids.len()].join(", ")));
                params.extend(task_ids.iter().cloned().map(Value::Text));
            }
        }
        if let Some(kind) = self.kind {
            clauses.push("kind = ?".to_string());
            params.push(Value::Text(kind.as_str().to_string()));
        }
        if self.completed_only {
            clauses.push("is_completed = 1".to_string());
        }
        if let Some(from) = self.started_from {
            clauses.push("user_start_time >= ?".to_string());
            params.push(Value::Integer(to_ms(from)));
        }
        if let Some(until) = self.started_until {
            clauses.push("user_start_time <= ?".to_string());
            params.push(Value::Integer(to_ms(until)));
        }
        if let Some(until) = self.ended_until {
            clauses.push("user_end_time IS NOT NULL AND user_end_time <= ?".to_string());
            params.push(Value::Integer(to_ms(until)));
        }

        let sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (sql, params)
    }
}

impl Store {
    pub fn insert_action(&self, action: &Action) -> Result<()> {
        self.conn().execute(
            r#"INSERT INTO actions
               (id, start_time, end_time, user_start_time, user_end_time, note,
                is_completed, kind, user_id, task_id)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            rusqlite::params![
                action.id, to_ms(action.start_time), action.end_time.map(to_ms),
                to_ms(action.user_start_time), action.user_end_time.map(to_ms), action.note,
                action.is_completed, action.kind.as_str(), action.user_id, action.task_id,
            ],
        )?;
        Ok(())
    }

    pub fn update_action(&self, action: &Action) -> Result<()> {
        self.conn().execute(
            r#"UPDATE actions SET start_time = ?2, end_time = ?3, user_start_time = ?4,
                   user_end_time = ?5, note = ?6, is_completed = ?7, kind = ?8, task_id = ?9
               WHERE id = ?1"#,
            rusqlite::params![
                action.id, to_ms(action.start_time), action.end_time.map(to_ms),
                to_ms(action.user_start_time), action.user_end_time.map(to_ms), action.note,
                action.is_completed, action.kind.as_str(), action.task_id,
            ],
        )?;
        Ok(())
    }

    pub fn get_action(&self, id: &str) -> Result<Option<Action>> {
        let sql = format!("SELECT {} FROM actions WHERE id = ?1", ACTION_COLUMNS);
        Ok(self.conn().query_row(&sql, [id], action_from_row).optional()?)
    }

    /// Returns false when nothing was deleted
    pub fn delete_action(&self, id: &str) -> Result<bool> {
        let changed = self.conn().execute("DELETE FROM actions WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    pub fn list_actions(&self, filter: &ActionFilter) -> Result<Vec<Action>> {
        let (where_sql, mut params) = filter.where_clause();
        let order = if filter.oldest_first { "ASC" } else { "DESC" };
        let mut sql = format!(
            "SELECT {} FROM actions{} ORDER BY user_start_time {}",
            ACTION_COLUMNS, where_sql, order
        );
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            let limit = i64::try_from(limit).context("Page size out of range")?;
            let offset = i64::try_from(filter.offset).context("Page offset out of range")?;
            params.push(Value::Integer(limit));
            params.push(Value::Integer(offset));
        }

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), action_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Number of actions matching the filter, ignoring paging
    pub fn count_actions(&self, filter: &ActionFilter) -> Result<u64> {
        let (where_sql, params) = filter.where_clause();
        let sql = format!("SELECT COUNT(*) FROM actions{}", where_sql);
        Ok(self
            .conn()
            .query_row(&sql, rusqlite::params_from_iter(params), |r| r.get(0))?)
    }

    /// Join each action with its task and the task's project
    pub fn resolve_actions(&self, actions: Vec<Action>) -> Result<Vec<ResolvedAction>> {
        let mut tasks: HashMap<String, Option<Task>> = HashMap::new();
        let mut projects: HashMap<String, Option<Project>> = HashMap::new();
        let mut resolved = Vec::with_capacity(actions.len());

        for action in actions {
            if !tasks.contains_key(&action.task_id) {
                let task = self.get_task(&action.task_id)?;
                tasks.insert(action.task_id.clone(), task);
            }
            let task = tasks.get(&action.task_id).cloned().flatten();

            let project = match task.as_ref().and_then(|t| t.project_id.as_deref()) {
                Some(project_id) => {
                    if !projects.contains_key(project_id) {
                        let project = self.get_project(project_id)?;
                        projects.insert(project_id.to_string(), project);
                    }
                    projects.get(project_id).cloned().flatten()
                }
                None => None,
            };

            resolved.push(ResolvedAction {
                action,
                task,
                project,
            });
        }
        Ok(resolved)
    }

    /// Close a user's open actions that started before `cutoff`.
    ///
    /// They keep `is_completed = false`, so they never count toward stats.
    pub fn close_stale_actions(
        &self,
        user_id: &str,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
        note: &str,
    ) -> Result<usize> {
        let changed = self.conn().execute(
            r#"UPDATE actions SET end_time = ?3, user_end_time = COALESCE(user_end_time, ?3), note = ?4
               WHERE user_id = ?1 AND end_time IS NULL AND start_time < ?2"#,
            rusqlite::params![user_id, to_ms(cutoff), to_ms(now), note],
        )?;
        Ok(changed)
    }
}
