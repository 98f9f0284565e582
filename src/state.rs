use std::borrow::Cow;
use std::path::PathBuf;

use crate::config::Settings;
use crate::data::cache::SessionCache;
use crate::data::clean::{drop_duplicates, fill_missing_with_mean};
use crate::data::error::Result;
use crate::data::export::{Download, ExportFormat, export};
use crate::data::loader;
use crate::data::model::{FileFormat, Table};
use crate::data::projection::project;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Everything the UI can ask for. Widgets never mutate [`AppState`]
/// directly; they emit actions that are dispatched after the frame is drawn.
#[derive(Debug, Clone)]
pub enum Action {
    Upload { name: String, bytes: Vec<u8> },
    SetCleaning { file: String, enabled: bool },
    RemoveDuplicates { file: String },
    FillMissing { file: String },
    ToggleColumn { file: String, column: String, selected: bool },
    SelectAllColumns { file: String },
    SelectNoColumns { file: String },
    SetShowChart { file: String, show: bool },
    SetTarget { file: String, format: ExportFormat },
    Convert { file: String },
    DownloadSaved { file: String, path: PathBuf },
    ReportError(String),
    DismissErrors,
}

// ---------------------------------------------------------------------------
// Per-file UI state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Widget state for one uploaded file. The table itself lives in the cache.
#[derive(Debug, Clone)]
pub struct FileView {
    pub name: String,
    pub size_bytes: usize,
    pub format: FileFormat,
    pub cleaning_enabled: bool,
    /// Columns ticked in the multi-select, in the order they were picked.
    pub selected_columns: Vec<String>,
    pub show_chart: bool,
    pub target: ExportFormat,
    /// Result of the last "Convert", until something changes.
    pub download: Option<Download>,
    pub notice: Option<Notice>,
}

impl FileView {
    fn new(
        name: String,
        size_bytes: usize,
        format: FileFormat,
        columns: Vec<String>,
        target: ExportFormat,
    ) -> Self {
        Self {
            name,
            size_bytes,
            format,
            cleaning_enabled: false,
            selected_columns: columns,
            show_chart: false,
            target,
            download: None,
            notice: None,
        }
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    pub settings: Settings,

    /// Current table per uploaded file name.
    pub cache: SessionCache,

    /// Uploaded files in upload order.
    pub files: Vec<FileView>,

    /// Files that could not be loaded (unsupported type, parse failure).
    pub errors: Vec<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn file(&self, name: &str) -> Option<&FileView> {
        self.files.iter().find(|f| f.name == name)
    }

    fn file_mut(&mut self, name: &str) -> Option<&mut FileView> {
        self.files.iter_mut().find(|f| f.name == name)
    }

    /// The projected view of `name`'s cached table, as the chart and the
    /// exporter see it.
    pub fn view(&self, name: &str) -> Option<Result<Cow<'_, Table>>> {
        let table = self.cache.get(name)?;
        let file = self.file(name)?;
        Some(project(table, &file.selected_columns))
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Upload { name, bytes } => self.upload(name, bytes),
            Action::SetCleaning { file, enabled } => {
                if let Some(view) = self.file_mut(&file) {
                    view.cleaning_enabled = enabled;
                }
            }
            Action::RemoveDuplicates { file } => self.clean(&file, Cleaning::Dedup),
            Action::FillMissing { file } => self.clean(&file, Cleaning::Impute),
            Action::ToggleColumn {
                file,
                column,
                selected,
            } => {
                let known = self
                    .cache
                    .get(&file)
                    .is_some_and(|t| t.column(&column).is_some());
                if !known {
                    return;
                }
                if let Some(view) = self.file_mut(&file) {
                    if !selected {
                        view.selected_columns.retain(|c| *c != column);
                    } else if !view.selected_columns.contains(&column) {
                        view.selected_columns.push(column);
                    }
                    view.download = None;
                }
            }
            Action::SelectAllColumns { file } => {
                let Some(order) = self.cache.get(&file).map(Table::column_names) else {
                    return;
                };
                if let Some(view) = self.file_mut(&file) {
                    view.selected_columns = order;
                    view.download = None;
                }
            }
            Action::SelectNoColumns { file } => {
                if let Some(view) = self.file_mut(&file) {
                    view.selected_columns.clear();
                    view.download = None;
                }
            }
            Action::SetShowChart { file, show } => {
                if let Some(view) = self.file_mut(&file) {
                    view.show_chart = show;
                }
            }
            Action::SetTarget { file, format } => {
                if let Some(view) = self.file_mut(&file) {
                    if view.target != format {
                        view.target = format;
                        view.download = None;
                    }
                }
            }
            Action::Convert { file } => self.convert(&file),
            Action::DownloadSaved { file, path } => {
                log::info!("Saved {} to {}", file, path.display());
                if let Some(view) = self.file_mut(&file) {
                    view.notice = Some(Notice::Success(format!("Saved to {}", path.display())));
                }
            }
            Action::ReportError(message) => {
                log::error!("{message}");
                self.errors.push(message);
            }
            Action::DismissErrors => self.errors.clear(),
        }
    }

    fn upload(&mut self, name: String, bytes: Vec<u8>) {
        let format = match FileFormat::from_file_name(&name) {
            Ok(format) => format,
            Err(e) => {
                log::warn!("Skipping {name}: {e}");
                self.errors.push(e.to_string());
                return;
            }
        };

        let built = self.cache.get_or_create(&name, || {
            loader::ingest(&name, &bytes).map(|parsed| {
                log::info!(
                    "Parsed {} as {} ({:.2} KB): {} rows x {} columns",
                    parsed.name,
                    parsed.format,
                    parsed.size_bytes as f64 / 1024.0,
                    parsed.table.n_rows(),
                    parsed.table.n_cols()
                );
                parsed.table
            })
        });
        let columns = match built {
            Ok(table) => table.column_names(),
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                self.errors.push(format!("{name}: {e}"));
                return;
            }
        };

        if let Some(view) = self.file_mut(&name) {
            // Re-uploading keeps the cached (possibly cleaned) table.
            view.size_bytes = bytes.len();
            return;
        }
        log::debug!("Columns of {name}: {columns:?}");
        let target = self.settings.default_export;
        self.files
            .push(FileView::new(name, bytes.len(), format, columns, target));
    }

    fn clean(&mut self, file: &str, op: Cleaning) {
        if !self.file(file).is_some_and(|v| v.cleaning_enabled) {
            log::debug!("Cleaning is disabled for {file}");
            return;
        }
        let message = match op {
            Cleaning::Dedup => self
                .cache
                .transform(file, drop_duplicates)
                .map(|n| format!("Duplicates removed ({n} rows)")),
            Cleaning::Impute => self
                .cache
                .transform(file, fill_missing_with_mean)
                .map(|n| format!("Missing values filled ({n} cells)")),
        };
        let Some(message) = message else {
            log::warn!("No cached table for {file}");
            return;
        };
        log::info!("{file}: {message}");
        if let Some(view) = self.file_mut(file) {
            view.notice = Some(Notice::Success(message));
            view.download = None;
        }
    }

    fn convert(&mut self, file: &str) {
        let Some(target) = self.file(file).map(|v| v.target) else {
            return;
        };
        let Some(result) = self
            .view(file)
            .map(|view| view.and_then(|table| export(&table, file, target)))
        else {
            return;
        };
        let Some(view) = self.file_mut(file) else {
            return;
        };
        match result {
            Ok(download) => {
                view.notice = None;
                view.download = Some(download);
            }
            Err(e) => {
                log::error!("Failed to convert {file}: {e}");
                view.notice = Some(Notice::Error(format!("Conversion failed: {e}")));
                view.download = None;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Cleaning {
    Dedup,
    Impute,
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx};

    use super::*;
    use crate::data::model::CellValue;

    const DATA_CSV: &str = "id,name,score\n1,ann,10\n2,bob,\n1,ann,10\n3,cid,30\n";

    fn upload(state: &mut AppState, name: &str, body: &str) {
        state.dispatch(Action::Upload {
            name: name.to_string(),
            bytes: body.as_bytes().to_vec(),
        });
    }

    fn file(name: &str) -> String {
        name.to_string()
    }

    #[test]
    fn clean_project_and_convert_to_excel() {
        let mut state = AppState::default();
        upload(&mut state, "data.csv", DATA_CSV);
        let f = file("data.csv");

        state.dispatch(Action::SetCleaning { file: f.clone(), enabled: true });
        state.dispatch(Action::RemoveDuplicates { file: f.clone() });
        state.dispatch(Action::FillMissing { file: f.clone() });
        state.dispatch(Action::SelectAllColumns { file: f.clone() });
        state.dispatch(Action::SetTarget {
            file: f.clone(),
            format: ExportFormat::Spreadsheet,
        });
        state.dispatch(Action::Convert { file: f.clone() });

        let download = state.file(&f).unwrap().download.clone().unwrap();
        assert_eq!(download.file_name, "data.xlsx");
        assert_eq!(download.format, ExportFormat::Spreadsheet);

        let mut book: Xlsx<_> = Xlsx::new(Cursor::new(download.bytes)).unwrap();
        let range = book.worksheet_range_at(0).unwrap().unwrap();
        let rows: Vec<&[Data]> = range.rows().collect();
        assert_eq!(rows.len(), 1 + 3, "header plus three unique rows");
        assert!(rows[1..].iter().all(|r| r[2] != Data::Empty));
        assert_eq!(rows[2][2], Data::Float(20.0));
    }

    #[test]
    fn cleaning_requires_toggle() {
        let mut state = AppState::default();
        upload(&mut state, "data.csv", DATA_CSV);
        state.dispatch(Action::RemoveDuplicates { file: file("data.csv") });
        assert_eq!(state.cache.get("data.csv").unwrap().n_rows(), 4);
    }

    #[test]
    fn cleaning_composes_over_cached_table() {
        let mut state = AppState::default();
        upload(&mut state, "data.csv", DATA_CSV);
        let f = file("data.csv");
        state.dispatch(Action::SetCleaning { file: f.clone(), enabled: true });
        state.dispatch(Action::FillMissing { file: f.clone() });
        state.dispatch(Action::RemoveDuplicates { file: f.clone() });

        let table = state.cache.get(&f).unwrap();
        assert_eq!(table.n_rows(), 3);
        // mean of 10, 10, 30 taken before dedup
        let expected = CellValue::Float(50.0 / 3.0);
        assert_eq!(table.column("score").unwrap().values[1], expected);
        assert!(matches!(state.file(&f).unwrap().notice, Some(Notice::Success(_))));
    }

    #[test]
    fn unsupported_file_is_skipped_and_others_continue() {
        let mut state = AppState::default();
        upload(&mut state, "notes.txt", "hello");
        upload(&mut state, "data.csv", DATA_CSV);
        assert_eq!(state.errors, vec!["Unsupported file type: .txt".to_string()]);
        assert_eq!(state.files.len(), 1);
        assert!(state.cache.get("notes.txt").is_none());
    }

    #[test]
    fn malformed_file_reports_error() {
        let mut state = AppState::default();
        upload(&mut state, "bad.csv", "a,b\n1,2,3\n");
        assert_eq!(state.errors.len(), 1);
        assert!(state.errors[0].starts_with("bad.csv:"));
        assert!(state.files.is_empty());
    }

    #[test]
    fn reupload_keeps_cleaned_table() {
        let mut state = AppState::default();
        upload(&mut state, "data.csv", DATA_CSV);
        let f = file("data.csv");
        state.dispatch(Action::SetCleaning { file: f.clone(), enabled: true });
        state.dispatch(Action::RemoveDuplicates { file: f.clone() });
        upload(&mut state, "data.csv", DATA_CSV);
        assert_eq!(state.files.len(), 1);
        assert_eq!(state.cache.get(&f).unwrap().n_rows(), 3);
    }

    #[test]
    fn empty_selection_shows_every_column() {
        let mut state = AppState::default();
        upload(&mut state, "data.csv", DATA_CSV);
        let f = file("data.csv");
        state.dispatch(Action::SelectNoColumns { file: f.clone() });
        let view = state.view(&f).unwrap().unwrap();
        assert_eq!(view.column_names(), vec!["id", "name", "score"]);
    }

    #[test]
    fn toggled_columns_keep_pick_order() {
        let mut state = AppState::default();
        upload(&mut state, "data.csv", DATA_CSV);
        let f = file("data.csv");
        state.dispatch(Action::SelectNoColumns { file: f.clone() });
        for column in ["score", "name", "id"] {
            state.dispatch(Action::ToggleColumn {
                file: f.clone(),
                column: column.to_string(),
                selected: true,
            });
        }
        state.dispatch(Action::ToggleColumn {
            file: f.clone(),
            column: "name".to_string(),
            selected: false,
        });
        state.dispatch(Action::ToggleColumn {
            file: f.clone(),
            column: "missing".to_string(),
            selected: true,
        });
        assert_eq!(state.file(&f).unwrap().selected_columns, vec!["score", "id"]);
        let view = state.view(&f).unwrap().unwrap();
        assert_eq!(view.column_names(), vec!["score", "id"]);

        state.dispatch(Action::Convert { file: f.clone() });
        let download = state.file(&f).unwrap().download.clone().unwrap();
        let text = String::from_utf8(download.bytes).unwrap();
        assert_eq!(text.lines().next(), Some("score,id"));
        assert_eq!(text.lines().nth(1), Some("10,1"));
        assert_eq!(text.lines().count(), 5);
        assert_eq!(download.file_name, "data.csv");
    }

    #[test]
    fn changing_target_discards_stale_download() {
        let mut state = AppState::default();
        upload(&mut state, "data.csv", DATA_CSV);
        let f = file("data.csv");
        state.dispatch(Action::Convert { file: f.clone() });
        assert!(state.file(&f).unwrap().download.is_some());
        state.dispatch(Action::SetTarget {
            file: f.clone(),
            format: ExportFormat::Spreadsheet,
        });
        assert!(state.file(&f).unwrap().download.is_none());
    }

    #[test]
    fn default_target_comes_from_settings() {
        let settings = Settings {
            default_export: ExportFormat::Spreadsheet,
            ..Settings::default()
        };
        let mut state = AppState::new(settings);
        upload(&mut state, "data.csv", DATA_CSV);
        assert_eq!(state.file("data.csv").unwrap().target, ExportFormat::Spreadsheet);
    }
}
