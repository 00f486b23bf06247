use std::collections::HashMap;

use chrono::DateTime;
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, MarkerShape, Plot, PlotBounds, PlotPoints, Points};
use rusty_plotter::options::MarkerKind;
use rusty_plotter::render::Mark;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Figure plot (central panel)
// ---------------------------------------------------------------------------

/// Render the current figure in the central panel.
pub fn figure_plot(ui: &mut Ui, state: &AppState) {
    let figure = match state.current_figure() {
        Some(fig) => fig,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to plot  (File → Open…)");
            });
            return;
        }
    };

    if !figure.title.is_empty() {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(&figure.title);
        });
    }

    let mut plot = Plot::new(("figure_plot", state.selected))
        .legend(Legend::default())
        .x_axis_label(axis_label(&figure.xlabel, figure.log_x, figure.projected_3d))
        .y_axis_label(axis_label(&figure.ylabel, figure.log_y, false))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if figure.time_axis {
        plot = plot.x_axis_formatter(|mark: GridMark, _range| format_time(mark.value));
    } else if figure.log_x {
        plot = plot.x_axis_formatter(|mark: GridMark, _range| format_log(mark.value));
    }
    if figure.log_y {
        plot = plot.y_axis_formatter(|mark: GridMark, _range| format_log(mark.value));
    }

    plot.show(ui, |plot_ui| {
        if let Some(bounds) = figure.bounds {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(bounds.min, bounds.max));
        }
        for mark in &figure.marks {
            match mark {
                Mark::Line {
                    name,
                    points,
                    color,
                    style,
                } => {
                    if style.line {
                        plot_ui.line(
                            Line::new(PlotPoints::from(points.clone()))
                                .name(name)
                                .color(*color)
                                .width(1.5),
                        );
                    }
                    if let Some(kind) = style.marker {
                        plot_ui.points(
                            Points::new(PlotPoints::from(points.clone()))
                                .name(name)
                                .color(*color)
                                .shape(marker_shape(kind))
                                .radius(marker_radius(kind))
                                .filled(true),
                        );
                    }
                }
                Mark::Scatter {
                    name,
                    points,
                    colors,
                    marker,
                } => {
                    // egui_plot colours a whole item, so batch points per colour.
                    let mut by_color: HashMap<Color32, Vec<[f64; 2]>> = HashMap::new();
                    for (p, c) in points.iter().zip(colors) {
                        by_color.entry(*c).or_default().push(*p);
                    }
                    for (color, pts) in by_color {
                        plot_ui.points(
                            Points::new(PlotPoints::from(pts))
                                .name(name)
                                .color(color)
                                .shape(marker_shape(*marker))
                                .radius(marker_radius(*marker))
                                .filled(true),
                        );
                    }
                }
                Mark::Bars {
                    name,
                    bars,
                    width,
                    color,
                } => {
                    let bars = bars
                        .iter()
                        .map(|&[center, height]| Bar::new(center, height).width(*width))
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name(name).color(*color));
                }
            }
        }
    });
}

fn axis_label(label: &str, log: bool, projected: bool) -> String {
    let mut text = label.to_string();
    if log {
        text.push_str(" (log10)");
    }
    if projected {
        text.push_str(" (oblique 3-D projection)");
    }
    text.trim().to_string()
}

fn format_time(seconds: f64) -> String {
    DateTime::from_timestamp(seconds.floor() as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn format_log(exponent: f64) -> String {
    format!("{:.3e}", 10f64.powf(exponent))
}

fn marker_shape(kind: MarkerKind) -> MarkerShape {
    match kind {
        MarkerKind::Point | MarkerKind::Circle => MarkerShape::Circle,
        MarkerKind::Cross => MarkerShape::Cross,
        MarkerKind::Plus => MarkerShape::Plus,
        MarkerKind::Asterisk => MarkerShape::Asterisk,
        MarkerKind::Square => MarkerShape::Square,
        MarkerKind::Triangle => MarkerShape::Up,
        MarkerKind::Diamond => MarkerShape::Diamond,
    }
}

fn marker_radius(kind: MarkerKind) -> f32 {
    match kind {
        MarkerKind::Point => 1.5,
        _ => 3.0,
    }
}
