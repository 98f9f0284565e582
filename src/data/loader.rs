use std::collections::HashSet;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use super::error::{Result, SweepError};
use super::model::{CellValue, FileFormat, Table, TabularFile};

/// Strings read back as missing cells.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – comma-delimited text with a header row
/// * `.xlsx` – first worksheet, first row is the header
///
/// Any other extension yields [`SweepError::UnsupportedFormat`].
pub fn ingest(name: &str, bytes: &[u8]) -> Result<TabularFile> {
    let format = FileFormat::from_file_name(name)?;
    let table = match format {
        FileFormat::Csv => read_csv(bytes)?,
        FileFormat::Spreadsheet => read_xlsx(bytes)?,
    };
    Ok(TabularFile {
        name: name.to_string(),
        size_bytes: bytes.len(),
        format,
        table,
    })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Header row followed by records. Short records are padded with missing
/// cells; a record wider than the header is an error. Every field is typed
/// individually, then mixed integer/float columns are unified to floats.
pub fn read_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for (row_no, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > width {
            return Err(SweepError::TooManyFields {
                line: record.position().map_or(row_no as u64 + 2, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<CellValue> = record.iter().map(guess_cell_type).collect();
        row.resize(width, CellValue::Null);
        rows.push(row);
    }

    let mut table = Table::from_rows(dedupe_headers(headers), rows)?;
    for col in table.columns_mut() {
        col.unify_numeric();
    }
    Ok(table)
}

fn guess_cell_type(s: &str) -> CellValue {
    if MISSING_MARKERS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "True" | "true" | "TRUE" => CellValue::Bool(true),
        "False" | "false" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an `.xlsx` workbook held in memory.
pub fn read_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SweepError::NoWorksheet)??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            Data::Empty => String::new(),
            Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
            other => other.to_string(),
        })
        .collect();

    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    let mut table = Table::from_rows(dedupe_headers(headers), rows)?;
    for col in table.columns_mut() {
        col.unify_numeric();
    }
    Ok(table)
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Header normalisation
// ---------------------------------------------------------------------------

/// Name blank headers `Unnamed: {i}` and suffix repeats with `.1`, `.2`, …
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());
    for (i, raw) in headers.into_iter().enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            raw
        };
        let mut name = base.clone();
        let mut suffix = 0;
        while seen.contains(&name) {
            suffix += 1;
            name = format!("{base}.{suffix}");
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}
