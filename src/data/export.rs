use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use super::error::{Result, SweepError};
use super::model::{CellValue, Table};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// Worksheet limits.
const MAX_SHEET_ROWS: usize = 1_048_576;
const MAX_SHEET_COLUMNS: usize = 16_384;

// ---------------------------------------------------------------------------
// Export target
// ---------------------------------------------------------------------------

/// Conversion target, independent of the uploaded format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    #[serde(alias = "excel", alias = "xlsx")]
    Spreadsheet,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Spreadsheet];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Spreadsheet => XLSX_MIME,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Spreadsheet => "Excel",
        }
    }
}

// ---------------------------------------------------------------------------
// Download artifact
// ---------------------------------------------------------------------------

/// An exported buffer ready to be saved by the user.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Serialise `table` into `format` and name it after `original_name`.
pub fn export(table: &Table, original_name: &str, format: ExportFormat) -> Result<Download> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(table)?,
        ExportFormat::Spreadsheet => write_xlsx(table)?,
    };
    let file_name = output_file_name(original_name, format);
    log::info!(
        "Exported {} rows x {} columns to {file_name} ({} bytes)",
        table.n_rows(),
        table.n_cols(),
        bytes.len()
    );
    Ok(Download {
        file_name,
        mime: format.mime_type(),
        format,
        bytes,
    })
}

/// Swap the final extension of `original` for the target's extension.
pub fn output_file_name(original: &str, format: ExportFormat) -> String {
    Path::new(original)
        .with_extension(format.extension())
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

/// Header row then one record per row; no index column.
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if table.n_cols() > 0 {
        writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.to_field()))?;
        }
    }
    writer.into_inner().map_err(|e| SweepError::Io(e.into_error()))
}

/// A single `Sheet1` with a bold header row. Missing cells stay blank.
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let (rows, columns) = (table.n_rows(), table.n_cols());
    if rows + 1 > MAX_SHEET_ROWS || columns > MAX_SHEET_COLUMNS {
        return Err(SweepError::SheetTooLarge { rows, columns });
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    for (c, col) in table.columns().iter().enumerate() {
        let c = c as u16;
        sheet.write_string_with_format(0, c, col.name.as_str(), &header)?;
        for (r, cell) in col.values.iter().enumerate() {
            let r = r as u32 + 1;
            match cell {
                CellValue::Null => {}
                CellValue::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                CellValue::Integer(i) => {
                    sheet.write_number(r, c, *i as f64)?;
                }
                CellValue::Float(v) if v.is_finite() => {
                    sheet.write_number(r, c, *v)?;
                }
                CellValue::Float(v) => {
                    sheet.write_string(r, c, v.to_string())?;
                }
                CellValue::Text(s) => {
                    sheet.write_string(r, c, s.as_str())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
