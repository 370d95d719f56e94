//! Saved report views

use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, Row};
use tracing::info;

use super::db::{from_ms, to_ms};
use super::Store;
use crate::domain::{ExportFormat, ReportView};

const VIEW_COLUMNS: &str =
    "id, name, fields, format, is_default, is_system, use_24_hour, description, user_id, created_at";

fn view_from_row(row: &Row<'_>) -> rusqlite::Result<ReportView> {
    let fields: String = row.get(2)?;
    let format: String = row.get(3)?;
    Ok(ReportView {
        id: row.get(0)?,
        name: row.get(1)?,
        fields: serde_json::from_str(&fields).unwrap_or_default(),
        format: ExportFormat::parse(&format).unwrap_or_default(),
        is_default: row.get(4)?,
        is_system: row.get(5)?,
        use_24_hour: row.get(6)?,
        description: row.get(7)?,
        user_id: row.get(8)?,
        created_at: from_ms(row.get(9)?),
    })
}

impl Store {
    pub fn insert_view(&self, view: &ReportView) -> Result<()> {
        let fields = serde_json::to_string(&view.fields).context("Failed to encode view fields")?;
        self.conn().execute(
            r#"INSERT INTO report_views
               (id, name, fields, format, is_default, is_system, use_24_hour, description, user_id, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            rusqlite::params![
                view.id, view.name, fields, view.format.as_str(), view.is_default,
                view.is_system, view.use_24_hour, view.description, view.user_id,
                to_ms(view.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_view(&self, id: &str) -> Result<Option<ReportView>> {
        let sql = format!("SELECT {} FROM report_views WHERE id = ?1", VIEW_COLUMNS);
        Ok(self.conn().query_row(&sql, [id], view_from_row).optional()?)
    }

    /// System views plus the user's own, default first, then by name
    pub fn list_views(&self, user_id: &str) -> Result<Vec<ReportView>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT {} FROM report_views WHERE is_system = 1 OR user_id = ?1 \
             ORDER BY is_default DESC, name ASC",
            VIEW_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], view_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Returns false when nothing was deleted
    pub fn delete_view(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn()
            .execute("DELETE FROM report_views WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Insert any seed view that is missing or out of date.
    ///
    /// A system view is matched by name; one whose fields, format or
    /// time toggle drifted from the seed is replaced.
    pub fn ensure_system_views(&self, seeds: &[ReportView]) -> Result<usize> {
        let mut created = 0;
        for seed in seeds {
            let existing = {
                let sql = format!(
                    "SELECT {} FROM report_views WHERE is_system = 1 AND name = ?1",
                    VIEW_COLUMNS
                );
                self.conn()
                    .query_row(&sql, [&seed.name], view_from_row)
                    .optional()?
            };

            match existing {
                Some(view)
                    if view.fields == seed.fields
                        && view.format == seed.format
                        && view.use_24_hour == seed.use_24_hour => {}
                Some(stale) => {
                    self.delete_view(&stale.id)?;
                    self.insert_view(seed)?;
                    info!("[donow:store] Replaced stale system view {}", seed.name);
                    created += 1;
                }
                None => {
                    self.insert_view(seed)?;
                    created += 1;
                }
            }
        }
        if created > 0 {
            info!("[donow:store] Seeded {} system report view(s)", created);
        }
        Ok(created)
    }

    /// Drop every system view and seed them again
    pub fn reset_system_views(&self, seeds: &[ReportView]) -> Result<usize> {
        self.conn()
            .execute("DELETE FROM report_views WHERE is_system = 1", [])?;
        self.ensure_system_views(seeds)
    }
}
