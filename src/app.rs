use eframe::egui;

use crate::config::Settings;
use crate::state::{Action, AppState};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataSweeperApp {
    pub state: AppState,
}

impl DataSweeperApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for DataSweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state, &mut actions);
        });

        // ---- Central panel: uploaded files ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::file_list(ui, &self.state, &mut actions);
        });

        if !actions.is_empty() {
            for action in actions {
                self.state.dispatch(action);
            }
            ctx.request_repaint();
        }
    }
}

/// Files dropped onto the window this frame, as upload actions.
fn dropped_files(ctx: &egui::Context) -> Vec<Action> {
    ctx.input(|i| i.raw.dropped_files.clone())
        .into_iter()
        .filter_map(|file| {
            if let Some(bytes) = file.bytes {
                return Some(Action::Upload {
                    name: file.name,
                    bytes: bytes.to_vec(),
                });
            }
            let path = file.path?;
            Some(panels::read_upload(&path).unwrap_or_else(|e| Action::ReportError(format!("{e:#}"))))
        })
        .collect()
}
