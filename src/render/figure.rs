use eframe::egui::Color32;

use super::Renderer;
use crate::color::{ColorMap, generate_palette};
use crate::error::Result;
use crate::layout::{ColorChannel, Histogram, PairSeries, TripleSeries, XAxis};
use crate::options::{MarkerKind, MarkerStyle, RenderHints};

/// Oblique projection used to draw 3-D triples on a 2-D plot.
const DEPTH_SCALE: f64 = 0.5;
const DEPTH_ANGLE: f64 = std::f64::consts::FRAC_PI_6;

// ---------------------------------------------------------------------------
// Figure – the render context
// ---------------------------------------------------------------------------

/// One drawable item of a figure.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Line {
        name: String,
        points: Vec<[f64; 2]>,
        color: Color32,
        style: MarkerStyle,
    },
    /// Points colored one by one through the figure's colour map.
    Scatter {
        name: String,
        points: Vec<[f64; 2]>,
        colors: Vec<Color32>,
        marker: MarkerKind,
    },
    /// Bars as `[center, height]`.
    Bars {
        name: String,
        bars: Vec<[f64; 2]>,
        width: f64,
        color: Color32,
    },
}

impl Mark {
    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Mark::Line { points, .. } | Mark::Scatter { points, .. } => points,
            Mark::Bars { bars, .. } => bars,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

/// Everything needed to paint one plot. Owned by the caller and passed into
/// every drawing verb.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    /// Legend overrides, by series order.
    pub legend: Vec<String>,
    pub marker: MarkerStyle,
    pub log_x: bool,
    pub log_y: bool,
    pub colormap: ColorMap,
    pub marks: Vec<Mark>,
    pub colorbar: Option<Colorbar>,
    /// Fixed view bounds; `None` lets the plot fit its contents.
    pub bounds: Option<Bounds>,
    /// x values are Unix seconds.
    pub time_axis: bool,
    /// Marks hold obliquely projected 3-D data.
    pub projected_3d: bool,
    pub redraws: u64,
}

impl Figure {
    pub fn new(hints: &RenderHints, title: String) -> Result<Self> {
        Ok(Self {
            title,
            xlabel: hints.xlabel.clone(),
            ylabel: hints.ylabel.clone(),
            legend: hints.legend.clone(),
            marker: hints.marker,
            log_x: hints.log_x,
            log_y: hints.log_y,
            colormap: ColorMap::by_name(&hints.colormap)?,
            marks: Vec::new(),
            colorbar: None,
            bounds: None,
            time_axis: false,
            projected_3d: false,
            redraws: 0,
        })
    }

    /// Fit the view bounds to the finite points of every mark.
    pub fn autoscale(&mut self) {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in self.marks.iter().flat_map(|m| m.points().iter()) {
            for axis in 0..2 {
                if p[axis].is_finite() {
                    min[axis] = min[axis].min(p[axis]);
                    max[axis] = max[axis].max(p[axis]);
                }
            }
        }
        if !(min[0].is_finite() && min[1].is_finite()) {
            self.bounds = None;
            return;
        }
        for axis in 0..2 {
            if max[axis] - min[axis] < f64::EPSILON {
                min[axis] -= 0.5;
                max[axis] += 0.5;
            }
        }
        self.bounds = Some(Bounds { min, max });
    }

    /// Legend name of the `index`-th series.
    fn series_name(&self, index: usize, label: &str) -> String {
        match self.legend.get(index).filter(|l| !l.is_empty()) {
            Some(name) => name.clone(),
            None if !label.is_empty() => label.to_string(),
            None => format!("series {}", index + 1),
        }
    }

    fn scale_x(&self, v: f64) -> f64 {
        if self.log_x { log10_or_nan(v) } else { v }
    }

    fn scale_y(&self, v: f64) -> f64 {
        if self.log_y { log10_or_nan(v) } else { v }
    }

    /// Scaled points with non-finite entries dropped, plus the indices kept.
    fn points(&self, xs: &[f64], ys: &[f64]) -> (Vec<[f64; 2]>, Vec<usize>) {
        xs.iter()
            .zip(ys)
            .enumerate()
            .map(|(i, (&x, &y))| (i, [self.scale_x(x), self.scale_y(y)]))
            .filter(|(_, p)| p[0].is_finite() && p[1].is_finite())
            .map(|(i, p)| (p, i))
            .unzip()
    }

    fn push_series(
        &mut self,
        name: String,
        base: Color32,
        xs: &[f64],
        ys: &[f64],
        color: Option<&ColorChannel>,
    ) {
        let (points, kept) = self.points(xs, ys);
        match color.and_then(|c| c.range().map(|r| (c, r))) {
            Some((channel, (lo, hi))) => {
                let colors = kept
                    .iter()
                    .map(|&i| {
                        let v = channel.values.get(i).copied().unwrap_or(f64::NAN);
                        self.colormap.color_for(v, lo, hi)
                    })
                    .collect();
                self.marks.push(Mark::Scatter {
                    name,
                    points,
                    colors,
                    marker: self.marker.marker.unwrap_or(MarkerKind::Circle),
                });
                self.colorbar = Some(Colorbar {
                    label: channel.label.clone(),
                    min: lo,
                    max: hi,
                });
            }
            None => self.marks.push(Mark::Line {
                name,
                points,
                color: base,
                style: self.marker,
            }),
        }
    }
}

fn log10_or_nan(v: f64) -> f64 {
    if v > 0.0 { v.log10() } else { f64::NAN }
}

fn project(x: f64, y: f64, z: f64) -> [f64; 2] {
    [
        x + z * DEPTH_SCALE * DEPTH_ANGLE.cos(),
        y + z * DEPTH_SCALE * DEPTH_ANGLE.sin(),
    ]
}

// ---------------------------------------------------------------------------
// FigureRenderer – turns drawing verbs into marks
// ---------------------------------------------------------------------------

/// Renderer that records drawing calls as marks on the figure.
#[derive(Debug, Default)]
pub struct FigureRenderer;

impl Renderer for FigureRenderer {
    fn draw_series(
        &mut self,
        fig: &mut Figure,
        x: Option<&XAxis>,
        series: &[Vec<f64>],
        labels: &[String],
        color: Option<&ColorChannel>,
    ) {
        let palette = generate_palette(series.len());
        let shared_x = x.map(XAxis::positions);
        fig.time_axis = matches!(x, Some(XAxis::Time(_)));
        for (i, ys) in series.iter().enumerate() {
            let xs = shared_x
                .clone()
                .unwrap_or_else(|| (0..ys.len()).map(|j| j as f64).collect());
            let name = fig.series_name(i, labels.get(i).map_or("", String::as_str));
            fig.push_series(name, palette[i], &xs, ys, color);
        }
    }

    fn draw_paired(&mut self, fig: &mut Figure, pairs: &[PairSeries], color: Option<&ColorChannel>) {
        let palette = generate_palette(pairs.len());
        for (i, pair) in pairs.iter().enumerate() {
            let name = fig.series_name(i, &pair.label);
            fig.push_series(name, palette[i], &pair.x, &pair.y, color);
        }
    }

    fn draw_triples(
        &mut self,
        fig: &mut Figure,
        triples: &[TripleSeries],
        color: Option<&ColorChannel>,
    ) {
        let palette = generate_palette(triples.len());
        fig.projected_3d = true;
        for (i, t) in triples.iter().enumerate() {
            let (xs, ys): (Vec<f64>, Vec<f64>) = t
                .x
                .iter()
                .zip(&t.y)
                .zip(&t.z)
                .map(|((&x, &y), &z)| {
                    let [px, py] = project(x, y, z);
                    (px, py)
                })
                .unzip();
            let name = fig.series_name(i, &t.label);
            fig.push_series(name, palette[i], &xs, &ys, color);
        }
    }

    fn draw_histograms(&mut self, fig: &mut Figure, hist: &Histogram) {
        let palette = generate_palette(hist.counts.len());
        let columns = hist.counts.len().max(1) as f64;
        let bucket = hist.bucket_width();
        // Side-by-side bars within each bucket, one slot per column.
        let slot = bucket / columns;
        for (i, counts) in hist.counts.iter().enumerate() {
            let bars = counts
                .iter()
                .enumerate()
                .map(|(b, &n)| {
                    let center = hist.edges[b] + slot * (i as f64 + 0.5);
                    [center, n as f64]
                })
                .collect();
            let name = fig.series_name(i, hist.labels.get(i).map_or("", String::as_str));
            fig.marks.push(Mark::Bars {
                name,
                bars,
                width: slot * 0.9,
                color: palette[i],
            });
        }
    }

    fn update_line(&mut self, fig: &mut Figure, ydata: &[f64]) {
        let xs: Vec<f64> = (0..ydata.len()).map(|i| i as f64).collect();
        let (points, _) = fig.points(&xs, ydata);
        let name = fig.series_name(0, "");
        match fig.marks.first_mut() {
            Some(Mark::Line { points: existing, .. }) => *existing = points,
            _ => {
                fig.marks.clear();
                fig.marks.push(Mark::Line {
                    name,
                    points,
                    color: Color32::LIGHT_BLUE,
                    style: fig.marker,
                });
            }
        }
    }

    fn redraw(&mut self, fig: &mut Figure) {
        fig.redraws += 1;
    }
}
