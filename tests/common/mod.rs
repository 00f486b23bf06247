use rusty_plotter::layout::{ColorChannel, Histogram, PairSeries, TripleSeries, XAxis};
use rusty_plotter::render::{Figure, FigureRenderer, Renderer};

/// Wraps the figure renderer and records every drawing call by name.
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Vec<&'static str>,
    inner: FigureRenderer,
}

impl RecordingRenderer {
    pub fn count(&self, verb: &str) -> usize {
        self.calls.iter().filter(|c| **c == verb).count()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_series(
        &mut self,
        fig: &mut Figure,
        x: Option<&XAxis>,
        series: &[Vec<f64>],
        labels: &[String],
        color: Option<&ColorChannel>,
    ) {
        self.calls.push("draw_series");
        self.inner.draw_series(fig, x, series, labels, color);
    }

    fn draw_paired(&mut self, fig: &mut Figure, pairs: &[PairSeries], color: Option<&ColorChannel>) {
        self.calls.push("draw_paired");
        self.inner.draw_paired(fig, pairs, color);
    }

    fn draw_triples(&mut self, fig: &mut Figure, triples: &[TripleSeries], color: Option<&ColorChannel>) {
        self.calls.push("draw_triples");
        self.inner.draw_triples(fig, triples, color);
    }

    fn draw_histograms(&mut self, fig: &mut Figure, hist: &Histogram) {
        self.calls.push("draw_histograms");
        self.inner.draw_histograms(fig, hist);
    }

    fn update_line(&mut self, fig: &mut Figure, ydata: &[f64]) {
        self.calls.push("update_line");
        self.inner.update_line(fig, ydata);
    }

    fn redraw(&mut self, fig: &mut Figure) {
        self.calls.push("redraw");
        self.inner.redraw(fig);
    }
}
