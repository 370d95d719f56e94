//! Delimited-text export

use std::io::Write;

use anyhow::{Context, Result};

use super::fields::{FieldMapper, ReportRow};

/// Write the header and rows as CSV.
///
/// Values containing the delimiter, a quote or a line break are quoted;
/// embedded quotes are doubled.
pub fn write_csv<W: Write>(
    out: W,
    mapper: &FieldMapper,
    rows: &[ReportRow],
    delimiter: u8,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(out);

    writer
        .write_record(mapper.headers())
        .context("Failed to write CSV header")?;
    for row in rows {
        writer
            .write_record(row.cells.iter().map(|(_, value)| value.to_string()))
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}
