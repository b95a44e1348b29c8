use std::fs;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::{Result, ToolError};
use crate::model::MergedRecord;

/// Renders merged records as CSV text.
///
/// The header is the union of every record's columns in order of first
/// appearance. Columns a record lacks render as empty cells.
pub fn to_csv(records: &[MergedRecord]) -> Result<String> {
    let header = collect_header(records);
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    if !header.is_empty() {
        writer.write_record(&header)?;
    }
    for record in records {
        let cells = header.iter().map(|column| {
            record
                .get(column)
                .map(|value| value.render())
                .unwrap_or_default()
        });
        writer.write_record(cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| ToolError::Io(error.into_error()))?;
    String::from_utf8(bytes).map_err(|error| {
        ToolError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, error))
    })
}

/// Writes `records` as UTF-8 CSV to `path`, replacing any existing file.
pub fn write_csv(path: &Path, records: &[MergedRecord]) -> Result<()> {
    let csv = to_csv(records)?;
    fs::write(path, csv)?;
    Ok(())
}

fn collect_header(records: &[MergedRecord]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for record in records {
        for column in record.columns() {
            if !header.iter().any(|known| known == column) {
                header.push(column.to_string());
            }
        }
    }
    header
}
