//! Drawing verbs the core issues, and the retained figure they draw into.
//!
//! The core never touches a window. It calls a [`Renderer`] with an explicit
//! render context ([`Figure`]) owned by the caller; the egui front end later
//! paints that figure.

pub mod figure;

pub use figure::{Bounds, Colorbar, Figure, FigureRenderer, Mark};

use crate::layout::{ColorChannel, Histogram, PairSeries, PlotLayout, ResolvedLayout, TripleSeries, XAxis};

/// Drawing verbs expected from a rendering backend.
pub trait Renderer {
    /// A batch of 1-D series, optionally against a shared x-axis and
    /// optionally colored by an auxiliary channel.
    fn draw_series(
        &mut self,
        fig: &mut Figure,
        x: Option<&XAxis>,
        series: &[Vec<f64>],
        labels: &[String],
        color: Option<&ColorChannel>,
    );

    fn draw_paired(&mut self, fig: &mut Figure, pairs: &[PairSeries], color: Option<&ColorChannel>);

    fn draw_triples(
        &mut self,
        fig: &mut Figure,
        triples: &[TripleSeries],
        color: Option<&ColorChannel>,
    );

    fn draw_histograms(&mut self, fig: &mut Figure, hist: &Histogram);

    /// Replace the y-data of the single rolling line.
    fn update_line(&mut self, fig: &mut Figure, ydata: &[f64]);

    fn redraw(&mut self, fig: &mut Figure);
}

/// Issue the drawing calls for a resolved layout.
pub fn render_layout<R: Renderer + ?Sized>(renderer: &mut R, fig: &mut Figure, resolved: &ResolvedLayout) {
    let color = resolved.color.as_ref();
    match &resolved.layout {
        PlotLayout::OneD { x, series, labels } => {
            renderer.draw_series(fig, x.as_ref(), series, labels, color)
        }
        PlotLayout::Paired2D { pairs } => renderer.draw_paired(fig, pairs, color),
        PlotLayout::Triples3D { triples } => renderer.draw_triples(fig, triples, color),
        PlotLayout::Histogram { buckets } => renderer.draw_histograms(fig, buckets),
    }
    renderer.redraw(fig);
}
