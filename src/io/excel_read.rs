use std::collections::HashSet;
use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use chrono::{NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::Row;

/// Header name used for columns whose header cell is blank.
pub const EMPTY_HEADER: &str = "__EMPTY";

/// Reads the first worksheet of the workbook at `path` into rows, one per
/// non-blank data row, keyed by the header row.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    if !path.exists() {
        return Err(ToolError::NotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::EmptyWorkbook(path.to_path_buf()))??;

    let rows = rows_from_range(&range);
    debug!(row_count = rows.len(), "worksheet converted to rows");
    Ok(rows)
}

fn rows_from_range(range: &Range<DataType>) -> Vec<Row> {
    let mut lines = range.rows();
    let headers = match lines.next() {
        Some(first_row) => unique_headers(first_row.iter().map(|cell| cell_to_string(Some(cell)))),
        None => return Vec::new(),
    };

    lines
        .filter(|cells| cells.iter().any(|cell| !cell_to_string(Some(cell)).is_empty()))
        .map(|cells| {
            Row::from_pairs(
                headers
                    .iter()
                    .enumerate()
                    .map(|(col_idx, header)| (header.clone(), cell_to_string(cells.get(col_idx)))),
            )
        })
        .collect()
}

/// Names blank headers `__EMPTY`, `__EMPTY_1`, ... and suffixes repeated
/// headers with `_1`, `_2`, ... so every column keeps its own key.
fn unique_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut used = HashSet::new();
    raw.map(|header| {
        let base = if header.trim().is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut counter = 1;
        while used.contains(&candidate) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        used.insert(candidate.clone());
        candidate
    })
    .collect()
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(cell @ DataType::DateTime(_)) => cell
            .as_datetime()
            .map(format_datetime)
            .unwrap_or_else(|| cell.to_string()),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Date-only cells render as `YYYY-MM-DD`, others as `YYYY-MM-DDTHH:MM:SS`.
fn format_datetime(value: NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
