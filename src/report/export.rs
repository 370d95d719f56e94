//! Export orchestration: pick settings, render, write a temp file

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use super::csv_writer::write_csv;
use super::fields::{resolve_fields, ExportRecord, FieldMapper, ReportField};
use super::xlsx_writer::write_xlsx;
use crate::domain::{ExportFormat, ReportView};
use crate::error::{ApiError, ApiResult};

/// Format, columns and clock style of one export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub fields: Vec<ReportField>,
    pub use_24_hour: bool,
}

impl ExportSettings {
    /// Settings from a saved view, or from ad-hoc request parameters.
    ///
    /// A view overrides format, fields and the 24-hour toggle.
    pub fn resolve(
        view: Option<&ReportView>,
        format: Option<&str>,
        fields: &[String],
        use_24_hour: bool,
    ) -> ApiResult<Self> {
        if let Some(view) = view {
            return Ok(Self {
                format: view.format,
                fields: resolve_fields(&view.fields),
                use_24_hour: view.use_24_hour,
            });
        }

        let format = match format.map(str::trim) {
            None | Some("") => ExportFormat::Xlsx,
            Some(f) => ExportFormat::parse(f)
                .ok_or_else(|| ApiError::validation(format!("Unsupported format: {}", f)))?,
        };
        Ok(Self {
            format,
            fields: resolve_fields(fields),
            use_24_hour,
        })
    }
}

/// A rendered report waiting to be sent
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub format: ExportFormat,
    pub row_count: usize,
}

/// Render `records` into `temp_dir/time-report-<unixms>.<ext>`
pub fn export_report(
    records: &[ExportRecord],
    settings: &ExportSettings,
    temp_dir: &Path,
    csv_delimiter: u8,
    now: DateTime<Utc>,
) -> Result<ExportedFile> {
    std::fs::create_dir_all(temp_dir)
        .with_context(|| format!("Failed to create export dir: {}", temp_dir.display()))?;

    let file_name = format!(
        "time-report-{}.{}",
        now.timestamp_millis(),
        settings.format.extension()
    );
    let path = temp_dir.join(&file_name);

    let mapper = FieldMapper::new(settings.fields.clone(), settings.use_24_hour, now);
    let rows = mapper.rows(records);

    match settings.format {
        ExportFormat::Xlsx => write_xlsx(&path, &mapper, &rows)?,
        ExportFormat::Csv => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(BufWriter::new(file), &mapper, &rows, csv_delimiter)?;
        }
    }

    info!(
        "[donow:export] Wrote {} row(s) to {}",
        rows.len(),
        path.display()
    );
    Ok(ExportedFile {
        path,
        file_name,
        format: settings.format,
        row_count: rows.len(),
    })
}
