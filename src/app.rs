use std::time::Duration;

use eframe::egui;
use rusty_plotter::options::PlotOptions;

use crate::state::{AppState, FigurePanel, RollingSession};
use crate::ui::{panels, plot};

/// Repaint interval while a rolling session waits for input.
const ROLLING_REPAINT: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PlotterApp {
    pub state: AppState,
}

impl PlotterApp {
    pub fn new_static(options: PlotOptions, panels: Vec<FigurePanel>, errors: Vec<String>) -> Self {
        let mut state = AppState::new(options);
        state.panels = panels;
        state.errors = errors;
        Self { state }
    }

    pub fn new_rolling(options: PlotOptions, session: RollingSession) -> Self {
        let mut state = AppState::new(options);
        state.rolling = Some(session);
        Self { state }
    }
}

impl eframe::App for PlotterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Ingest streamed lines ----
        if let Some(session) = &mut self.state.rolling {
            if let Some(e) = session.pump() {
                self.state.status_message = Some(format!("Error: {e}"));
            } else if session.engine.is_running() {
                ctx.request_repaint_after(ROLLING_REPAINT);
            }
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Right side panel: legend / colour bar ----
        egui::SidePanel::right("legend_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure_plot(ui, &self.state);
        });
    }
}
