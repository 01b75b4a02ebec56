// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashSet;
use std::io::Cursor;
use tracing::debug;

use crate::error::AugurError;
use crate::tabular::{CellValue, Dataset, Row, TabularFile};

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xls", "xlsm", "xlsb", "ods"];

/// Parses an uploaded file into a typed dataset plus the exact delimited
/// text later embedded in model prompts. Spreadsheets are converted to CSV
/// first so the retained text matches what was parsed.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<TabularFile, AugurError> {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let csv_text = if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        spreadsheet_to_csv(bytes)?
    } else {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AugurError::Parse("file is not valid UTF-8 text".to_string()))?
    };

    let dataset = parse_delimited(&csv_text)?;
    debug!(
        file = file_name,
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "parsed tabular file"
    );

    Ok(TabularFile {
        file_name: file_name.to_string(),
        dataset,
        csv_text,
    })
}

/// Parses delimited text: first row is the header, blank lines are
/// skipped, every other line is one record, cells are dynamically typed.
pub fn parse_delimited(text: &str) -> Result<Dataset, AugurError> {
    // Not flexible: a row whose field count differs from the header is a
    // row-level error, and any row-level error rejects the whole parse.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AugurError::Parse(format!("failed to read header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AugurError::Parse("file has no header row".to_string()));
    }

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(AugurError::Parse(format!(
                "duplicate column header '{header}'"
            )));
        }
    }

    // Truly blank lines never reach here; the reader drops them. A line of
    // bare delimiters is a real record of nulls and is kept.
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AugurError::Parse(format!("row error: {e}")))?;
        let mut row = Row::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(raw) = record.get(index) {
                row.insert(header.clone(), coerce_cell(raw));
            }
        }
        rows.push(row);
    }

    Ok(Dataset { headers, rows })
}

/// Dynamic per-cell typing: full numeric parses become numbers, booleans
/// become booleans, the empty cell becomes null, everything else is text.
fn coerce_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        if number.is_finite() {
            return CellValue::Number(number);
        }
    }
    CellValue::Text(raw.to_string())
}

fn spreadsheet_to_csv(bytes: &[u8]) -> Result<String, AugurError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| AugurError::Parse(format!("failed to open spreadsheet: {e}")))?;

    // First worksheet only.
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AugurError::Parse("spreadsheet has no worksheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AugurError::Parse(format!("failed to read worksheet: {e}")))?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in range.rows() {
        let fields: Vec<String> = row.iter().map(excel_cell_to_text).collect();
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        writer
            .write_record(&fields)
            .map_err(|e| AugurError::Parse(format!("failed to serialise worksheet: {e}")))?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| AugurError::Parse(format!("failed to serialise worksheet: {e}")))?;
    String::from_utf8(buffer)
        .map_err(|_| AugurError::Parse("worksheet produced invalid UTF-8".to_string()))
}

fn excel_cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{e:?}"),
    }
}
