use thiserror::Error;

/// Everything that can go wrong between reading an uploaded file and
/// handing back an exported buffer.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The file extension is neither `.csv` nor `.xlsx`. The file is skipped.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected at most {expected} fields, found {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read spreadsheet: {0}")]
    SpreadsheetRead(#[from] calamine::XlsxError),

    #[error("failed to write spreadsheet: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("workbook contains no worksheets")]
    NoWorksheet,

    #[error("table is too large for a worksheet ({rows} rows, {columns} columns)")]
    SheetTooLarge { rows: usize, columns: usize },

    #[error("column '{name}' has {found} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}

pub type Result<T> = std::result::Result<T, SweepError>;
