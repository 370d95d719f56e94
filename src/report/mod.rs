//! Report export
//!
//! Completed actions are flattened into [`ExportRecord`]s, mapped to rows
//! through a field list (from a saved view or the request) and rendered as
//! XLSX or CSV into a temp file that the server streams back.

mod csv_writer;
mod export;
mod fields;
mod timefmt;
mod views;
mod xlsx_writer;

pub use csv_writer::write_csv;
pub use export::{export_report, ExportSettings, ExportedFile};
pub use fields::{
    resolve_fields, CellValue, ExportRecord, FieldMapper, ReportField, ReportRow, NO_PROJECT,
    NO_TASK,
};
pub use views::system_views;
pub use xlsx_writer::{build_workbook, sheet_cells, write_xlsx, SheetCell, SHEET_NAME};
