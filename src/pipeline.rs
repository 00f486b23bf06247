//! Static mode: load → transform → resolve → render, one input at a time.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::loader::{self, LoadedMatrix};
use crate::data::model::ColumnMetadata;
use crate::data::transform::transform;
use crate::layout::resolve;
use crate::options::PlotOptions;
use crate::render::{Figure, Renderer, render_layout};

/// Where a static plot reads its data from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

impl Source {
    /// Name substituted into the title placeholder.
    pub fn name(&self) -> String {
        match self {
            Source::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Source::Stdin => "stdin".to_string(),
        }
    }
}

/// The result of plotting one source.
#[derive(Debug)]
pub struct FigureOutcome {
    pub source: String,
    pub figure: Result<Figure>,
}

/// Plot every source in order. A failure is logged and recorded, and the
/// next source is still attempted.
pub fn plot_sources<R: Renderer + ?Sized>(
    sources: &[Source],
    opts: &PlotOptions,
    renderer: &mut R,
) -> Vec<FigureOutcome> {
    sources
        .iter()
        .map(|source| {
            let figure = match source {
                Source::File(path) => plot_file(path, opts, renderer),
                Source::Stdin => plot_reader(std::io::stdin().lock(), &source.name(), opts, renderer),
            };
            if let Err(e) = &figure {
                log::error!("Failed to plot {}: {e:#}", source.name());
            }
            FigureOutcome {
                source: source.name(),
                figure,
            }
        })
        .collect()
}

pub fn plot_file<R: Renderer + ?Sized>(path: &Path, opts: &PlotOptions, renderer: &mut R) -> Result<Figure> {
    let loaded = loader::load_file(path, &opts.load)?;
    let name = Source::File(path.to_path_buf()).name();
    plot_matrix(loaded, &name, opts, renderer)
}

pub fn plot_reader<Rd: Read, R: Renderer + ?Sized>(
    reader: Rd,
    source_name: &str,
    opts: &PlotOptions,
    renderer: &mut R,
) -> Result<Figure> {
    let loaded = loader::load_reader(reader, &opts.load)
        .with_context(|| format!("loading {source_name}"))?;
    plot_matrix(loaded, source_name, opts, renderer)
}

/// Transform, resolve and render an already loaded matrix. Every fatal
/// error surfaces before the first drawing call.
pub fn plot_matrix<R: Renderer + ?Sized>(
    loaded: LoadedMatrix,
    source_name: &str,
    opts: &PlotOptions,
    renderer: &mut R,
) -> Result<Figure> {
    let LoadedMatrix { matrix, labels, .. } = loaded;
    let cols = matrix.cols();

    let matrix = transform(matrix, &opts.preprocess, opts.mode.one_d)
        .with_context(|| format!("preprocessing {source_name}"))?;

    // Labels only survive stages that keep the column layout.
    let mut metadata = if !opts.preprocess.transpose && matrix.cols() == cols {
        ColumnMetadata::with_labels(labels)
    } else {
        ColumnMetadata::unlabeled(matrix.cols())
    };
    metadata.color_column = opts.mode.color_column.map(|c| c - 1);
    if opts.mode.x_column || opts.mode.time {
        metadata.x_column = Some(0);
    }

    let resolved = resolve(matrix, metadata, &opts.mode)
        .with_context(|| format!("resolving layout for {source_name}"))?;

    let mut fig = Figure::new(&opts.hints, opts.title_for(source_name))?;
    render_layout(renderer, &mut fig, &resolved);
    log::info!(
        "Plotted {source_name} as {} ({} series)",
        resolved.layout.kind(),
        resolved.layout.series_count()
    );
    Ok(fig)
}
