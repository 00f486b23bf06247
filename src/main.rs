mod app;
mod state;
mod ui;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use eframe::egui;

use app::PlotterApp;
use rusty_plotter::PlotError;
use rusty_plotter::options::{LoadOptions, MarkerStyle, ModeFlags, PlotOptions, PreprocessOptions, RenderHints};
use rusty_plotter::pipeline::{Source, plot_sources};
use rusty_plotter::render::{Figure, FigureRenderer};
use rusty_plotter::stream::StreamingEngine;
use state::{FigurePanel, RollingSession};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plot delimited numeric data from files or stdin")]
struct Cli {
    /// Input files (stdin when omitted)
    files: Vec<PathBuf>,

    /// Plot in 3-D (column triples)
    #[arg(short = '3')]
    three_d: bool,

    /// Plot adjacent column pairs as (x, y)
    #[arg(short = '2', long)]
    paired: bool,

    /// Use the first column for x values
    #[arg(short = 'x')]
    x_column: bool,

    /// Read the x column as Unix timestamps
    #[arg(long)]
    time: bool,

    /// Plot every column as its own series against 1..n
    #[arg(short = 'y')]
    one_d: bool,

    /// Transpose the data
    #[arg(short, long)]
    transpose: bool,

    /// Smoothing window (1 = no smoothing)
    #[arg(short = 's', default_value_t = 1)]
    smooth: usize,

    /// Downsampling ratio in (0, 1]
    #[arg(short, long)]
    downsample: Option<f64>,

    /// Plot a histogram with this many buckets
    #[arg(long, default_value_t = 0)]
    hist: usize,

    /// 1-based column that colors the samples
    #[arg(short = 'c', long = "color-col")]
    color_col: Option<usize>,

    /// 1-based columns to load, e.g. 1,3,4
    #[arg(long, value_delimiter = ',')]
    cols: Option<Vec<usize>>,

    /// Rows to skip at the start of the input
    #[arg(long, default_value_t = 0)]
    skip: usize,

    /// Comment line prefix
    #[arg(long, default_value = "#")]
    comment: String,

    /// First data row holds column labels
    #[arg(long)]
    header: bool,

    /// Column delimiter (default: whitespace)
    #[arg(long)]
    delim: Option<String>,

    /// Animated rolling plot with this buffer size
    #[arg(short, long)]
    rolling: Option<usize>,

    /// Log scale y
    #[arg(long)]
    log: bool,

    /// Log scale x
    #[arg(long)]
    logx: bool,

    /// Line style / marker, e.g. "-", ".", "-o"
    #[arg(long, default_value = "-")]
    marker: MarkerStyle,

    /// Comma separated legend labels
    #[arg(long, value_delimiter = ',')]
    legend: Vec<String>,

    /// X axis label
    #[arg(long, default_value = "")]
    xlabel: String,

    /// Y axis label
    #[arg(long, default_value = "")]
    ylabel: String,

    /// Plot title; {file} is replaced by the input name
    #[arg(long, default_value = "{file}")]
    title: String,

    /// Colormap for --color-col
    #[arg(long, default_value = "viridis")]
    cmap: String,
}

impl Cli {
    fn into_options(self) -> Result<(PlotOptions, Vec<PathBuf>)> {
        let delimiter = match self.delim.as_deref() {
            None => None,
            Some(d) if d.len() == 1 => Some(d.as_bytes()[0]),
            Some("\\t") => Some(b'\t'),
            Some(other) => bail!("delimiter must be a single byte, got '{other}'"),
        };
        let opts = PlotOptions {
            load: LoadOptions {
                delimiter,
                comment: self.comment,
                skip_rows: self.skip,
                header: self.header,
                columns: self.cols,
            },
            preprocess: PreprocessOptions {
                transpose: self.transpose,
                smooth: self.smooth,
                downsample: self.downsample,
            },
            mode: ModeFlags {
                three_d: self.three_d,
                paired: self.paired,
                x_column: self.x_column,
                time: self.time,
                one_d: self.one_d,
                histogram: self.hist,
                color_column: self.color_col,
            },
            hints: RenderHints {
                title: self.title,
                xlabel: self.xlabel,
                ylabel: self.ylabel,
                legend: self.legend,
                marker: self.marker,
                log_x: self.logx,
                log_y: self.log,
                colormap: self.cmap,
            },
            rolling: self.rolling,
        };
        opts.validate()?;
        Ok((opts, self.files))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let (opts, files) = Cli::parse().into_options()?;

    let app = if opts.is_rolling() {
        match rolling_app(&opts, &files)? {
            Some(app) => app,
            None => return Ok(()),
        }
    } else {
        static_app(&opts, &files)?
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Plotter",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}

/// Plot every input before the window opens, one after another.
fn static_app(opts: &PlotOptions, files: &[PathBuf]) -> Result<PlotterApp> {
    let sources: Vec<Source> = if files.is_empty() {
        vec![Source::Stdin]
    } else {
        files.iter().cloned().map(Source::File).collect()
    };

    let mut panels = Vec::new();
    let mut errors = Vec::new();
    for outcome in plot_sources(&sources, opts, &mut FigureRenderer) {
        match outcome.figure {
            Ok(figure) => panels.push(FigurePanel::new(outcome.source, figure)),
            Err(e) => errors.push(format!("{}: {e:#}", outcome.source)),
        }
    }
    if panels.is_empty() {
        bail!("nothing to plot:\n{}", errors.join("\n"));
    }
    Ok(PlotterApp::new_static(opts.clone(), panels, errors))
}

/// Validate the session, then hand lines from a reader thread to the UI.
/// Returns `None` when the options rule out a rolling plot.
fn rolling_app(opts: &PlotOptions, files: &[PathBuf]) -> Result<Option<PlotterApp>> {
    let engine = StreamingEngine::start(opts)?;
    if !engine.is_running() {
        log::error!("{}", PlotError::IncompatibleOptions(engine.violations().to_vec()));
        return Ok(None);
    }

    let (reader, name): (Box<dyn BufRead + Send>, String) = match files {
        [] => (Box::new(BufReader::new(std::io::stdin())), "stdin".to_string()),
        [path] => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            (Box::new(BufReader::new(file)), Source::File(path.clone()).name())
        }
        _ => bail!("rolling mode reads a single input"),
    };

    let figure = Figure::new(&opts.hints, opts.title_for(&name))?;
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        // A read error is forwarded so the engine can end the session on it.
        for line in reader.lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });

    let session = RollingSession::new(name, engine, figure, rx);
    Ok(Some(PlotterApp::new_rolling(opts.clone(), session)))
}
