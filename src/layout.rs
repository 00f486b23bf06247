//! Layout resolution: decide how the columns of a matrix are drawn.
//!
//! ```text
//!   matrix + metadata + flags
//!        │
//!        ├─ color column?  → extracted into the color channel
//!        ├─ histogram?     → Histogram (bypasses geometry)
//!        ├─ 3-D?           → Triples3D  (cols % 3 == 0)
//!        ├─ paired?        → Paired2D   (cols % 2 == 0)
//!        ├─ x / time?      → OneD with shared x-axis (cols >= 2)
//!        └─ otherwise      → OneD, one series per column
//! ```

use chrono::{DateTime, Utc};

use crate::data::model::{ColumnMetadata, SampleMatrix};
use crate::error::{PlotError, Result};
use crate::options::ModeFlags;

// ---------------------------------------------------------------------------
// Layout types
// ---------------------------------------------------------------------------

/// Shared x-axis of a batch of 1-D series.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    Values(Vec<f64>),
    Time(Vec<DateTime<Utc>>),
}

impl XAxis {
    pub fn len(&self) -> usize {
        match self {
            XAxis::Values(v) => v.len(),
            XAxis::Time(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric positions; times become Unix seconds.
    pub fn positions(&self) -> Vec<f64> {
        match self {
            XAxis::Values(v) => v.clone(),
            XAxis::Time(t) => t
                .iter()
                .map(|dt| dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripleSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub label: String,
}

/// Per-column bucket counts over shared, equal-width edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending edges.
    pub edges: Vec<f64>,
    /// One count vector (length `bins`) per column.
    pub counts: Vec<Vec<usize>>,
    pub labels: Vec<String>,
}

impl Histogram {
    pub fn bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn bucket_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if self.bins() > 0 => (hi - lo) / self.bins() as f64,
            _ => 0.0,
        }
    }
}

/// Auxiliary per-row values that color the drawn samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorChannel {
    pub values: Vec<f64>,
    pub label: String,
}

impl ColorChannel {
    /// Finite (min, max) of the channel, if any value is finite.
    pub fn range(&self) -> Option<(f64, f64)> {
        finite_range(self.values.iter().copied())
    }
}

/// The render request produced by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotLayout {
    OneD {
        x: Option<XAxis>,
        series: Vec<Vec<f64>>,
        labels: Vec<String>,
    },
    Paired2D {
        pairs: Vec<PairSeries>,
    },
    Triples3D {
        triples: Vec<TripleSeries>,
    },
    Histogram {
        buckets: Histogram,
    },
}

impl PlotLayout {
    pub fn kind(&self) -> &'static str {
        match self {
            PlotLayout::OneD { x: None, .. } => "1-D",
            PlotLayout::OneD { x: Some(XAxis::Values(_)), .. } => "1-D with x-axis",
            PlotLayout::OneD { x: Some(XAxis::Time(_)), .. } => "1-D with time axis",
            PlotLayout::Paired2D { .. } => "paired 2-D",
            PlotLayout::Triples3D { .. } => "3-D",
            PlotLayout::Histogram { .. } => "histogram",
        }
    }

    /// Number of independently drawn series.
    pub fn series_count(&self) -> usize {
        match self {
            PlotLayout::OneD { series, .. } => series.len(),
            PlotLayout::Paired2D { pairs } => pairs.len(),
            PlotLayout::Triples3D { triples } => triples.len(),
            PlotLayout::Histogram { buckets } => buckets.counts.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    pub layout: PlotLayout,
    pub color: Option<ColorChannel>,
    /// Labels of the consumed columns, one per drawn series.
    pub labels: Vec<String>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the plot geometry. The first matching rule wins; see the module
/// docs for the order.
pub fn resolve(
    mut matrix: SampleMatrix,
    mut metadata: ColumnMetadata,
    flags: &ModeFlags,
) -> Result<ResolvedLayout> {
    metadata.labels.resize(matrix.cols(), String::new());

    let color = match metadata.color_column {
        Some(c) if c >= matrix.cols() => {
            return Err(PlotError::InvalidOption(format!(
                "color column {} is out of range for {} column(s)",
                c + 1,
                matrix.cols()
            )))
        }
        Some(c) => {
            let values = matrix.remove_column(c);
            let label = metadata.remove_column(c).unwrap_or_default();
            Some(ColorChannel { values, label })
        }
        None => None,
    };

    let cols = matrix.cols();

    let (layout, labels) = if flags.histogram > 0 {
        if color.is_some() {
            log::warn!("Histogram plots ignore the color column");
        }
        let buckets = histogram(&matrix, &metadata.labels, flags.histogram);
        let labels = buckets.labels.clone();
        (PlotLayout::Histogram { buckets }, labels)
    } else if flags.three_d {
        if cols == 0 || cols % 3 != 0 {
            return Err(PlotError::ShapeMismatch {
                mode: "3-D",
                columns: cols,
                requirement: "a column count divisible by 3",
            });
        }
        let triples: Vec<TripleSeries> = (0..cols)
            .step_by(3)
            .map(|c| TripleSeries {
                x: matrix.column(c),
                y: matrix.column(c + 1),
                z: matrix.column(c + 2),
                label: group_label(&metadata, c..c + 3),
            })
            .collect();
        let labels = triples.iter().map(|t| t.label.clone()).collect();
        (PlotLayout::Triples3D { triples }, labels)
    } else if flags.paired {
        if cols == 0 || cols % 2 != 0 {
            return Err(PlotError::ShapeMismatch {
                mode: "paired 2-D",
                columns: cols,
                requirement: "an even column count",
            });
        }
        let pairs: Vec<PairSeries> = (0..cols)
            .step_by(2)
            .map(|c| PairSeries {
                x: matrix.column(c),
                y: matrix.column(c + 1),
                label: group_label(&metadata, c..c + 2),
            })
            .collect();
        let labels = pairs.iter().map(|p| p.label.clone()).collect();
        (PlotLayout::Paired2D { pairs }, labels)
    } else if flags.x_column || flags.time {
        if cols < 2 {
            return Err(PlotError::ShapeMismatch {
                mode: if flags.time { "time-axis" } else { "x-column" },
                columns: cols,
                requirement: "at least 2 columns",
            });
        }
        let xc = metadata.x_column.filter(|&c| c < cols).unwrap_or(0);
        let xs = matrix.remove_column(xc);
        metadata.remove_column(xc);
        let x = if flags.time {
            XAxis::Time(to_times(&xs)?)
        } else {
            XAxis::Values(xs)
        };
        let labels = metadata.labels.clone();
        (
            PlotLayout::OneD {
                x: Some(x),
                series: matrix.columns(),
                labels: labels.clone(),
            },
            labels,
        )
    } else {
        let labels = metadata.labels.clone();
        (
            PlotLayout::OneD {
                x: None,
                series: matrix.columns(),
                labels: labels.clone(),
            },
            labels,
        )
    };

    log::debug!(
        "resolved {} layout with {} series{}",
        layout.kind(),
        layout.series_count(),
        if color.is_some() { " and a color channel" } else { "" }
    );

    let color = if matches!(layout, PlotLayout::Histogram { .. }) {
        None
    } else {
        color
    };
    Ok(ResolvedLayout {
        layout,
        color,
        labels,
    })
}

/// Label for a group of columns: the non-empty labels joined with '/'.
fn group_label(metadata: &ColumnMetadata, cols: std::ops::Range<usize>) -> String {
    cols.map(|c| metadata.label(c))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn to_times(values: &[f64]) -> Result<Vec<DateTime<Utc>>> {
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return Err(PlotError::InvalidTimestamp(v));
            }
            let secs = v.floor();
            let nanos = ((v - secs) * 1e9).round().min(999_999_999.0) as u32;
            DateTime::from_timestamp(secs as i64, nanos).ok_or(PlotError::InvalidTimestamp(v))
        })
        .collect()
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Bucket every column over the shared observed range. A degenerate range
/// `v` is widened to `[v - 0.5, v + 0.5]`; the last bucket is closed.
pub fn histogram(matrix: &SampleMatrix, labels: &[String], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let (lo, hi) = match finite_range(matrix.values().iter().copied()) {
        Some((lo, hi)) if lo < hi => (lo, hi),
        Some((v, _)) => (v - 0.5, v + 0.5),
        None => (0.0, 1.0),
    };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let counts = matrix
        .columns()
        .iter()
        .map(|col| {
            let mut counts = vec![0usize; bins];
            for &v in col.iter().filter(|v| v.is_finite()) {
                let idx = (((v - lo) / width) as usize).min(bins - 1);
                counts[idx] += 1;
            }
            counts
        })
        .collect();

    let mut labels = labels.to_vec();
    labels.resize(matrix.cols(), String::new());

    Histogram {
        edges,
        counts,
        labels,
    }
}
