use std::collections::HashSet;
use std::fmt;

use super::error::{Result, SweepError};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a dataframe would infer.
/// Rows are used as set keys during deduplication, so `CellValue` must be
/// `Eq + Hash` even though it carries floats.
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord/Hash: floats compare by `total_cmp` and hash by bits --
// -- with `-0.0` folded into `0.0` so both zeros are one value           --

fn signless_zero(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else {
        f
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => signless_zero(*a).total_cmp(&signless_zero(*b)),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => signless_zero(*f).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "<null>"),
            other => write!(f, "{}", other.to_field()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`, for numeric columns only.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text form used when serialising to CSV. Missing cells become empty
    /// fields and whole floats keep a trailing `.0` so they read back as floats.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.1}"),
            CellValue::Float(v) => v.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// A column is numeric when it has at least one value and every
    /// non-missing value is an integer or a float.
    pub fn is_numeric(&self) -> bool {
        let mut seen = false;
        for v in &self.values {
            match v {
                CellValue::Null => {}
                CellValue::Integer(_) | CellValue::Float(_) => seen = true,
                _ => return false,
            }
        }
        seen
    }

    /// Arithmetic mean of the non-missing numeric values.
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .values
            .iter()
            .filter_map(CellValue::as_f64)
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Turn every integer cell into a float when the column mixes the two.
    pub(crate) fn unify_numeric(&mut self) {
        let has_float = self.values.iter().any(|v| matches!(v, CellValue::Float(_)));
        if has_float && self.is_numeric() {
            self.promote_to_float();
        }
    }

    pub(crate) fn promote_to_float(&mut self) {
        for v in &mut self.values {
            if let CellValue::Integer(i) = v {
                *v = CellValue::Float(*i as f64);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the in-memory tabular structure
// ---------------------------------------------------------------------------

/// Ordered, uniquely named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut names = HashSet::new();
        for col in &columns {
            if !names.insert(col.name.as_str()) {
                return Err(SweepError::DuplicateColumn(col.name.clone()));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(SweepError::RaggedColumn {
                    name: bad.name.clone(),
                    expected,
                    found: bad.values.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Build a table from a header and row-major records.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for (row_no, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                let name = columns
                    .get(row.len())
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| format!("row {row_no}"));
                return Err(SweepError::RaggedColumn {
                    name,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(value);
            }
        }
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.n_rows()).map(|i| self.row(i))
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        let keep = n.min(self.n_rows());
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values[..keep].to_vec()))
                .collect(),
        }
    }

    /// Keep only the rows whose mask entry is `true`.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for col in &mut self.columns {
            let mut mask = keep.iter();
            col.values.retain(|_| mask.next().copied().unwrap_or(false));
        }
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

// ---------------------------------------------------------------------------
// FileFormat / TabularFile
// ---------------------------------------------------------------------------

/// Formats recognised on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// Detect the format from the lower-cased final extension of a file name.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Spreadsheet),
            "" => Err(SweepError::UnsupportedFormat("(no extension)".to_string())),
            other => Err(SweepError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "CSV"),
            FileFormat::Spreadsheet => write!(f, "Excel"),
        }
    }
}

/// An uploaded file after parsing.
#[derive(Debug, Clone)]
pub struct TabularFile {
    pub name: String,
    pub size_bytes: usize,
    pub format: FileFormat,
    pub table: Table,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> CellValue {
        CellValue::Integer(i)
    }

    #[test]
    fn table_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("A", vec![int(1), int(2)]),
            Column::new("B", vec![int(1)]),
        ])
        .unwrap_err();
        assert!(matches!(err, SweepError::RaggedColumn { found: 1, expected: 2, .. }));
    }

    #[test]
    fn table_rejects_duplicate_names() {
        let err = Table::new(vec![Column::new("A", vec![]), Column::new("A", vec![])]).unwrap_err();
        assert!(matches!(err, SweepError::DuplicateColumn(name) if name == "A"));
    }

    #[test]
    fn numeric_column_ignores_nulls_but_needs_a_value() {
        assert!(Column::new("a", vec![int(1), CellValue::Null, CellValue::Float(3.0)]).is_numeric());
        assert!(!Column::new("b", vec![int(1), CellValue::Text("x".into())]).is_numeric());
        assert!(!Column::new("c", vec![CellValue::Null, CellValue::Null]).is_numeric());
        assert!(!Column::new("d", vec![CellValue::Bool(true)]).is_numeric());
    }

    #[test]
    fn mean_skips_missing_cells() {
        let col = Column::new("a", vec![int(1), CellValue::Null, int(3)]);
        assert_eq!(col.mean(), Some(2.0));
        assert_eq!(Column::new("e", vec![CellValue::Null]).mean(), None);
    }

    #[test]
    fn negative_zero_equals_zero_and_hashes_alike() {
        use std::collections::hash_map::RandomState;
        use std::hash::BuildHasher;
        let pos = CellValue::Float(0.0);
        let neg = CellValue::Float(-0.0);
        assert_eq!(pos, neg);
        assert_eq!(pos.cmp(&neg), std::cmp::Ordering::Equal);
        let hasher = RandomState::new();
        assert_eq!(hasher.hash_one(&pos), hasher.hash_one(&neg));
        assert!(CellValue::Float(-1.0) < neg);
    }

    #[test]
    fn whole_floats_keep_decimal_point() {
        assert_eq!(CellValue::Float(2.0).to_field(), "2.0");
        assert_eq!(CellValue::Float(2.5).to_field(), "2.5");
        assert_eq!(CellValue::Null.to_field(), "");
    }

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(FileFormat::from_file_name("Data.CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("book.xlsx").unwrap(), FileFormat::Spreadsheet);
        assert!(matches!(
            FileFormat::from_file_name("notes.txt"),
            Err(SweepError::UnsupportedFormat(ext)) if ext == ".txt"
        ));
    }

    #[test]
    fn head_truncates_every_column() {
        let t = Table::new(vec![
            Column::new("A", vec![int(1), int(2), int(3)]),
            Column::new("B", vec![int(4), int(5), int(6)]),
        ])
        .unwrap();
        let h = t.head(2);
        assert_eq!(h.n_rows(), 2);
        assert_eq!(h.n_cols(), 2);
        assert_eq!(t.head(10).n_rows(), 3);
    }
}
