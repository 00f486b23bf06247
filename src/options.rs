//! Plot configuration.
//!
//! `PlotOptions` is the single configuration value threaded through the
//! loader, transform pipeline, layout resolver and streaming engine. The
//! binary builds it from command-line flags; library users build it directly
//! (every group has a `Default`).

use std::fmt;
use std::str::FromStr;

use crate::error::{PlotError, Result};

/// Placeholder in the title that is replaced by the input's file name.
pub const FILE_PLACEHOLDER: &str = "{file}";

// ---------------------------------------------------------------------------
// Option groups
// ---------------------------------------------------------------------------

/// How delimited text is turned into rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Single-byte field delimiter; `None` splits on runs of whitespace.
    pub delimiter: Option<u8>,
    /// Lines starting with this prefix are skipped.
    pub comment: String,
    /// Leading rows skipped unconditionally.
    pub skip_rows: usize,
    /// First data row holds column labels.
    pub header: bool,
    /// 1-based column subset, in output order.
    pub columns: Option<Vec<usize>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            comment: "#".to_string(),
            skip_rows: 0,
            header: false,
            columns: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    pub transpose: bool,
    /// Moving-average window; 1 disables smoothing.
    pub smooth: usize,
    /// Resampling ratio in (0, 1].
    pub downsample: Option<f64>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            transpose: false,
            smooth: 1,
            downsample: None,
        }
    }
}

/// Geometry flags consumed by the layout resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeFlags {
    pub three_d: bool,
    pub paired: bool,
    /// Use a column (the first, unless metadata says otherwise) as the x-axis.
    pub x_column: bool,
    /// Read the x-axis as Unix timestamps.
    pub time: bool,
    /// Every column is an independent 1-D series.
    pub one_d: bool,
    /// Histogram bucket count; 0 disables the histogram override.
    pub histogram: usize,
    /// 1-based color column.
    pub color_column: Option<usize>,
}

/// Rendering hints carried through the core untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderHints {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub legend: Vec<String>,
    pub marker: MarkerStyle,
    pub log_x: bool,
    pub log_y: bool,
    pub colormap: String,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            legend: Vec::new(),
            marker: MarkerStyle::default(),
            log_x: false,
            log_y: false,
            colormap: "viridis".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotOptions {
    pub load: LoadOptions,
    pub preprocess: PreprocessOptions,
    pub mode: ModeFlags,
    pub hints: RenderHints,
    /// Rolling buffer capacity; presence selects rolling mode.
    pub rolling: Option<usize>,
}

impl PlotOptions {
    /// Check value ranges. Combinations are resolved later (first match wins).
    pub fn validate(&self) -> Result<()> {
        if self.preprocess.smooth == 0 {
            return Err(PlotError::InvalidOption(
                "smoothing window must be at least 1".into(),
            ));
        }
        if let Some(r) = self.preprocess.downsample {
            if !(r > 0.0 && r <= 1.0) {
                return Err(PlotError::InvalidOption(format!(
                    "downsample ratio must be in (0, 1], got {r}"
                )));
            }
        }
        if self.rolling == Some(0) {
            return Err(PlotError::InvalidOption(
                "rolling buffer size must be positive".into(),
            ));
        }
        if self.mode.color_column == Some(0) {
            return Err(PlotError::InvalidOption(
                "color column is 1-based".into(),
            ));
        }
        if let Some(cols) = &self.load.columns {
            if cols.is_empty() || cols.contains(&0) {
                return Err(PlotError::InvalidOption(
                    "column subset must be non-empty and 1-based".into(),
                ));
            }
        }
        if self.load.comment.is_empty() {
            return Err(PlotError::InvalidOption(
                "comment marker must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling.is_some()
    }

    /// Title with the file-name placeholder substituted.
    pub fn title_for(&self, source_name: &str) -> String {
        self.hints.title.replace(FILE_PLACEHOLDER, source_name)
    }
}

// ---------------------------------------------------------------------------
// Marker style
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Point,
    Circle,
    Cross,
    Plus,
    Asterisk,
    Square,
    Triangle,
    Diamond,
}

/// Line/marker style parsed from a compact format string such as `-`, `o`
/// or `-o` (a dash draws connecting lines, one symbol picks the marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    pub line: bool,
    pub marker: Option<MarkerKind>,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            line: true,
            marker: None,
        }
    }
}

impl FromStr for MarkerStyle {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        let mut style = MarkerStyle {
            line: false,
            marker: None,
        };
        for ch in s.chars() {
            let kind = match ch {
                '-' => {
                    style.line = true;
                    continue;
                }
                '.' => MarkerKind::Point,
                'o' => MarkerKind::Circle,
                'x' => MarkerKind::Cross,
                '+' => MarkerKind::Plus,
                '*' => MarkerKind::Asterisk,
                's' => MarkerKind::Square,
                '^' => MarkerKind::Triangle,
                'd' | 'D' => MarkerKind::Diamond,
                other => {
                    return Err(PlotError::InvalidOption(format!(
                        "unknown marker style character '{other}' in '{s}'"
                    )))
                }
            };
            if style.marker.replace(kind).is_some() {
                return Err(PlotError::InvalidOption(format!(
                    "marker style '{s}' names more than one marker"
                )));
            }
        }
        if !style.line && style.marker.is_none() {
            return Err(PlotError::InvalidOption("empty marker style".into()));
        }
        Ok(style)
    }
}

impl fmt::Display for MarkerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line {
            write!(f, "-")?;
        }
        if let Some(kind) = self.marker {
            let ch = match kind {
                MarkerKind::Point => '.',
                MarkerKind::Circle => 'o',
                MarkerKind::Cross => 'x',
                MarkerKind::Plus => '+',
                MarkerKind::Asterisk => '*',
                MarkerKind::Square => 's',
                MarkerKind::Triangle => '^',
                MarkerKind::Diamond => 'd',
            };
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}
