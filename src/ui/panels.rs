use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::{Download, ExportFormat};
use crate::state::{Action, AppState, FileView, Notice};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &AppState, actions: &mut Vec<Action>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(actions);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("{} file(s) loaded", state.cache.len()));
        ui.weak("Drop .csv or .xlsx files anywhere to upload");
    });
}

// ---------------------------------------------------------------------------
// Central panel – one section per uploaded file
// ---------------------------------------------------------------------------

/// Render every uploaded file with its cleaning, column, chart and
/// conversion controls.
pub fn file_list(ui: &mut Ui, state: &AppState, actions: &mut Vec<Action>) {
    ui.heading("Data Sweeper");
    ui.label("Transform your files between CSV and Excel formats with built-in data cleaning and visualizations!");
    ui.separator();

    if !state.errors.is_empty() {
        ui.horizontal(|ui: &mut Ui| {
            ui.vertical(|ui: &mut Ui| {
                for err in &state.errors {
                    ui.label(RichText::new(err).color(Color32::RED));
                }
            });
            if ui.small_button("Dismiss").clicked() {
                actions.push(Action::DismissErrors);
            }
        });
        ui.separator();
    }

    if state.files.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open files to get started  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for file in &state.files {
                egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                    file_section(ui, state, file, actions);
                });
                ui.add_space(8.0);
            }
            ui.label(RichText::new("All files processed").color(Color32::GREEN));
        });
}

fn file_section(ui: &mut Ui, state: &AppState, file: &FileView, actions: &mut Vec<Action>) {
    let name = &file.name;
    let Some(cached) = state.cache.get(name) else {
        return;
    };

    ui.label(RichText::new(format!("File Name: {name}")).strong());
    ui.label(format!("File Size: {:.2} KB", file.size_kb()));
    ui.label(format!(
        "{} rows × {} columns ({})",
        cached.n_rows(),
        cached.n_cols(),
        file.format
    ));

    // ---- Preview ----
    ui.strong("Preview");
    table::preview(ui, name, cached, state.settings.preview_rows);
    ui.add_space(4.0);

    // ---- Cleaning ----
    ui.strong("Data Cleaning Options");
    let mut enabled = file.cleaning_enabled;
    if ui
        .checkbox(&mut enabled, format!("Enable Data Cleaning for {name}"))
        .changed()
    {
        actions.push(Action::SetCleaning {
            file: name.clone(),
            enabled,
        });
    }
    if file.cleaning_enabled {
        ui.horizontal(|ui: &mut Ui| {
            if ui.button(format!("Remove Duplicates from {name}")).clicked() {
                actions.push(Action::RemoveDuplicates { file: name.clone() });
            }
            if ui.button(format!("Fill Missing Values for {name}")).clicked() {
                actions.push(Action::FillMissing { file: name.clone() });
            }
        });
    }
    show_notice(ui, file.notice.as_ref());

    // ---- Column selection ----
    if !cached.is_empty() {
        let header = format!(
            "Choose Columns for {name}  ({}/{})",
            file.selected_columns.len(),
            cached.n_cols()
        );
        egui::CollapsingHeader::new(RichText::new(header).strong())
            .id_salt(("columns", name))
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        actions.push(Action::SelectAllColumns { file: name.clone() });
                    }
                    if ui.small_button("None").clicked() {
                        actions.push(Action::SelectNoColumns { file: name.clone() });
                    }
                });
                for column in cached.column_names() {
                    let mut checked = file.selected_columns.contains(&column);
                    if ui.checkbox(&mut checked, &column).changed() {
                        actions.push(Action::ToggleColumn {
                            file: name.clone(),
                            column,
                            selected: checked,
                        });
                    }
                }
            });
    }

    // ---- Visualisation ----
    let mut show_chart = file.show_chart;
    if ui
        .checkbox(&mut show_chart, format!("Show Visualization for {name}"))
        .changed()
    {
        actions.push(Action::SetShowChart {
            file: name.clone(),
            show: show_chart,
        });
    }
    if file.show_chart {
        match state.view(name) {
            Some(Ok(view)) => plot::bar_chart(ui, name, &view),
            Some(Err(e)) => {
                ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
            }
            None => {}
        }
    }

    // ---- Conversion ----
    ui.strong("Conversion Options");
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Convert {name} to:"));
        let mut target = file.target;
        for format in ExportFormat::ALL {
            ui.radio_value(&mut target, format, format.label());
        }
        if target != file.target {
            actions.push(Action::SetTarget {
                file: name.clone(),
                format: target,
            });
        }
    });
    if ui.button(format!("Convert {name}")).clicked() {
        actions.push(Action::Convert { file: name.clone() });
    }
    if let Some(download) = &file.download {
        let label = format!("⬇ Download {} as {}", download.file_name, download.format.label());
        if ui.button(label).on_hover_text(download.mime).clicked() {
            match save_download(download) {
                Ok(Some(path)) => actions.push(Action::DownloadSaved {
                    file: name.clone(),
                    path,
                }),
                Ok(None) => {}
                Err(e) => actions.push(Action::ReportError(format!("{e:#}"))),
            }
        }
    }
}

fn show_notice(ui: &mut Ui, notice: Option<&Notice>) {
    match notice {
        Some(Notice::Success(msg)) => {
            ui.label(RichText::new(format!("✔ {msg}")).color(Color32::GREEN));
        }
        Some(Notice::Error(msg)) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(actions: &mut Vec<Action>) {
    let files = rfd::FileDialog::new()
        .set_title("Upload your files (CSV or Excel)")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("All files", &["*"])
        .pick_files();

    for path in files.unwrap_or_default() {
        match read_upload(&path) {
            Ok(action) => actions.push(action),
            Err(e) => actions.push(Action::ReportError(format!("{e:#}"))),
        }
    }
}

/// Read a picked or dropped path into an upload action.
pub fn read_upload(path: &Path) -> Result<Action> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid file name: {}", path.display()))?
        .to_string();
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Action::Upload { name, bytes })
}

/// Ask where to save `download` and write it. `Ok(None)` when cancelled.
fn save_download(download: &Download) -> Result<Option<std::path::PathBuf>> {
    let Some(path) = rfd::FileDialog::new()
        .set_title(format!("Save {}", download.file_name))
        .set_file_name(&download.file_name)
        .add_filter(download.format.label(), &[download.format.extension()])
        .save_file()
    else {
        return Ok(None);
    };
    std::fs::write(&path, &download.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(path))
}
