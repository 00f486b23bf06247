use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_plotter::render::Mark;

use crate::state::AppState;

/// Steps shown in the colour bar legend.
const COLORBAR_STEPS: usize = 8;

// ---------------------------------------------------------------------------
// Right side panel – legend, colour bar, errors
// ---------------------------------------------------------------------------

/// Render the legend panel for the current figure.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Legend");
    ui.separator();

    let Some(figure) = state.current_figure() else {
        ui.label("Nothing plotted.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for mark in &figure.marks {
                let (name, swatch) = match mark {
                    Mark::Line { name, color, .. } | Mark::Bars { name, color, .. } => {
                        (name, *color)
                    }
                    Mark::Scatter { name, .. } => (name, Color32::GRAY),
                };
                ui.label(RichText::new(format!("■ {name}")).color(swatch));
            }

            // ---- Colour bar ----
            if let Some(bar) = &figure.colorbar {
                ui.separator();
                let title = if bar.label.is_empty() { "color" } else { bar.label.as_str() };
                ui.strong(format!("{title} ({})", figure.colormap.name));
                for (value, color) in figure
                    .colormap
                    .legend_entries(bar.min, bar.max, COLORBAR_STEPS)
                    .into_iter()
                    .rev()
                {
                    ui.label(RichText::new(format!("■ {value:.4}")).color(color));
                }
            }

            // ---- Failed inputs ----
            if !state.errors.is_empty() {
                ui.separator();
                ui.strong("Failed inputs");
                for err in &state.errors {
                    ui.label(RichText::new(err).color(Color32::RED));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_open = state.rolling.is_none();
            if ui.add_enabled(can_open, egui::Button::new("Open…")).clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.rolling {
            ui.label(format!("{}: {}", session.source, session.status()));
        } else {
            for (i, panel) in state.panels.iter().enumerate() {
                if ui.selectable_label(state.selected == i, &panel.source).clicked() {
                    state.selected = i;
                }
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open data")
        .add_filter("Supported files", &["txt", "dat", "tsv", "csv", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["txt", "dat", "tsv"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
