//! Project queries

use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

use super::db::{from_ms, to_ms};
use super::Store;
use crate::domain::Project;

const PROJECT_COLUMNS: &str =
    "id, name, is_billable, hourly_rate, monthly_budget_limit, user_id, created_at, updated_at";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        is_billable: row.get(2)?,
        hourly_rate: row.get(3)?,
        monthly_budget_limit: row.get(4)?,
        user_id: row.get(5)?,
        created_at: from_ms(row.get(6)?),
        updated_at: from_ms(row.get(7)?),
    })
}

impl Store {
    pub fn insert_project(&self, project: &Project) -> Result<()> {
        self.conn().execute(
            r#"INSERT INTO projects
               (id, name, is_billable, hourly_rate, monthly_budget_limit, user_id, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            rusqlite::params![
                project.id, project.name, project.is_billable, project.hourly_rate,
                project.monthly_budget_limit, project.user_id, to_ms(project.created_at),
                to_ms(project.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn update_project(&self, project: &Project) -> Result<()> {
        self.conn().execute(
            r#"UPDATE projects SET name = ?2, is_billable = ?3, hourly_rate = ?4,
                   monthly_budget_limit = ?5, updated_at = ?6
               WHERE id = ?1"#,
            rusqlite::params![
                project.id, project.name, project.is_billable, project.hourly_rate,
                project.monthly_budget_limit, to_ms(project.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS);
        Ok(self.conn().query_row(&sql, [id], project_from_row).optional()?)
    }

    /// A user's projects, newest first
    pub fn list_projects(&self, user_id: &str) -> Result<Vec<Project>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT {} FROM projects WHERE user_id = ?1 ORDER BY created_at DESC",
            PROJECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], project_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn project_has_tasks(&self, id: &str) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE project_id = ?1",
            [id],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    /// Returns false when nothing was deleted
    pub fn delete_project(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectInput;
    use chrono::{Duration, Utc};

    fn project(name: &str, user: &str, at: chrono::DateTime<Utc>) -> Project {
        ProjectInput {
            name: Some(name.to_string()),
            is_billable: true,
            hourly_rate: Some(90.0),
            monthly_budget_limit: None,
        }
        .into_project(user, at)
        .unwrap()
    }

    #[test]
    fn test_list_is_per_user_and_newest_first() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store.insert_project(&project("Old", "u1", now - Duration::days(2))).unwrap();
        store.insert_project(&project("New", "u1", now)).unwrap();
        store.insert_project(&project("Other", "u2", now)).unwrap();

        let names: Vec<String> = store
            .list_projects("u1")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[test]
    fn test_update_and_delete() {
        let store = Store::open_in_memory().unwrap();
        let mut p = project("Client", "u1", Utc::now());
        store.insert_project(&p).unwrap();

        p.name = "Client B".into();
        p.hourly_rate = 120.0;
        store.update_project(&p).unwrap();
        let loaded = store.get_project(&p.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Client B");
        assert_eq!(loaded.hourly_rate, 120.0);
        assert!(loaded.is_billable);

        assert!(!store.project_has_tasks(&p.id).unwrap());
        assert!(store.delete_project(&p.id).unwrap());
        assert!(!store.delete_project(&p.id).unwrap());
        assert!(store.get_project(&p.id).unwrap().is_none());
    }
}
