//! Spreadsheet export

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};

use super::fields::{CellValue, FieldMapper, ReportRow};

pub const SHEET_NAME: &str = "Time Records";

/// Build the workbook: bold centered header, one sized column per field
pub fn build_workbook(mapper: &FieldMapper, rows: &[ReportRow]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    fill_sheet(sheet, mapper, rows)?;
    Ok(workbook)
}

/// One cell as written to the sheet. Row 0 is the header.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
}

/// Cell layout of the sheet: header row, then one row per report row
pub fn sheet_cells(mapper: &FieldMapper, rows: &[ReportRow]) -> Vec<SheetCell> {
    let header = mapper
        .headers()
        .into_iter()
        .enumerate()
        .map(|(col, header)| SheetCell {
            row: 0,
            col: col as u16,
            value: CellValue::Text(header.to_string()),
        });
    let body = rows.iter().enumerate().flat_map(|(i, row)| {
        row.cells.iter().enumerate().map(move |(col, (_, value))| SheetCell {
            row: (i + 1) as u32,
            col: col as u16,
            value: value.clone(),
        })
    });
    header.chain(body).collect()
}

fn fill_sheet(sheet: &mut Worksheet, mapper: &FieldMapper, rows: &[ReportRow]) -> Result<()> {
    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let cell_format = Format::new().set_align(FormatAlign::VerticalCenter);

    for (col, field) in mapper.fields().iter().enumerate() {
        sheet.set_column_width(col as u16, field.column_width())?;
    }

    for cell in sheet_cells(mapper, rows) {
        let format = if cell.row == 0 {
            &header_format
        } else {
            &cell_format
        };
        match &cell.value {
            CellValue::Integer(n) => {
                sheet.write_number_with_format(cell.row, cell.col, *n as f64, format)?
            }
            CellValue::Text(s) => sheet.write_string_with_format(cell.row, cell.col, s, format)?,
        };
    }
    Ok(())
}

/// Write the workbook to `path`
pub fn write_xlsx(path: &Path, mapper: &FieldMapper, rows: &[ReportRow]) -> Result<()> {
    let mut workbook = build_workbook(mapper, rows)?;
    workbook
        .save(path)
        .with_context(|| format!("Failed to write spreadsheet: {}", path.display()))?;
    Ok(())
}
