use std::path::Path;
use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};

use rusty_plotter::PlotError;
use rusty_plotter::options::PlotOptions;
use rusty_plotter::pipeline::{Source, plot_file};
use rusty_plotter::render::{Figure, FigureRenderer};
use rusty_plotter::stream::{EngineState, StreamingEngine, Termination};

/// Most lines ingested per frame so the window stays responsive.
const MAX_LINES_PER_FRAME: usize = 10_000;

// ---------------------------------------------------------------------------
// Static figures
// ---------------------------------------------------------------------------

/// One plotted input.
pub struct FigurePanel {
    pub source: String,
    pub figure: Figure,
}

impl FigurePanel {
    pub fn new(source: String, figure: Figure) -> Self {
        Self { source, figure }
    }
}

// ---------------------------------------------------------------------------
// Rolling session
// ---------------------------------------------------------------------------

/// A streaming engine fed by lines arriving from a reader thread.
pub struct RollingSession {
    pub source: String,
    pub engine: StreamingEngine,
    pub figure: Figure,
    rx: Receiver<io::Result<String>>,
}

impl RollingSession {
    pub fn new(source: String, engine: StreamingEngine, figure: Figure, rx: Receiver<io::Result<String>>) -> Self {
        Self {
            source,
            engine,
            figure,
            rx,
        }
    }

    /// Ingest every line that has arrived, one full cycle per line. Returns
    /// the error that ended the session, if one did.
    pub fn pump(&mut self) -> Option<PlotError> {
        for _ in 0..MAX_LINES_PER_FRAME {
            if !self.engine.is_running() {
                return None;
            }
            let result = match self.rx.try_recv() {
                Ok(Ok(line)) => self.engine.ingest(&line, &mut FigureRenderer, &mut self.figure),
                Ok(Err(e)) => Err(self.engine.reject_unreadable(&e)),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.engine.finish();
                    return None;
                }
            };
            if let Err(e) = result {
                return Some(e);
            }
        }
        None
    }

    pub fn status(&self) -> String {
        match self.engine.state() {
            EngineState::Validating => "validating".to_string(),
            EngineState::Running => format!("streaming, {} line(s)", self.engine.lines_seen()),
            EngineState::Terminated(Termination::EndOfInput) => {
                format!("input ended after {} line(s)", self.engine.lines_seen())
            }
            EngineState::Terminated(Termination::Malformed(e)) => format!("stopped: {e}"),
            EngineState::Terminated(Termination::Incompatible(names)) => {
                format!("not started: {}", names.join(", "))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub options: PlotOptions,

    /// Static figures, in input order.
    pub panels: Vec<FigurePanel>,

    /// Index of the figure shown in the central panel.
    pub selected: usize,

    /// Present in rolling mode.
    pub rolling: Option<RollingSession>,

    /// Inputs that failed to plot.
    pub errors: Vec<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(options: PlotOptions) -> Self {
        Self {
            options,
            panels: Vec::new(),
            selected: 0,
            rolling: None,
            errors: Vec::new(),
            status_message: None,
        }
    }

    /// The figure currently shown.
    pub fn current_figure(&self) -> Option<&Figure> {
        match &self.rolling {
            Some(session) => Some(&session.figure),
            None => self.panels.get(self.selected).map(|p| &p.figure),
        }
    }

    pub fn add_panel(&mut self, panel: FigurePanel) {
        self.panels.push(panel);
        self.selected = self.panels.len() - 1;
    }

    /// Plot another file with the session's options.
    pub fn open_path(&mut self, path: &Path) {
        let source = Source::File(path.to_path_buf()).name();
        match plot_file(path, &self.options, &mut FigureRenderer) {
            Ok(figure) => {
                log::info!("Opened {}", path.display());
                self.add_panel(FigurePanel::new(source, figure));
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to plot file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.errors.push(format!("{source}: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use rusty_plotter::options::RenderHints;

    use super::*;

    fn session(lines: Vec<io::Result<String>>) -> RollingSession {
        let opts = PlotOptions {
            rolling: Some(3),
            ..Default::default()
        };
        let engine = StreamingEngine::start(&opts).unwrap();
        let figure = Figure::new(&RenderHints::default(), String::new()).unwrap();
        let (tx, rx) = mpsc::channel();
        for line in lines {
            tx.send(line).unwrap();
        }
        RollingSession::new("stdin".into(), engine, figure, rx)
    }

    #[test]
    fn pump_ends_at_end_of_input() {
        let mut s = session(vec![Ok("1".into()), Ok("2".into())]);
        assert!(s.pump().is_none());
        assert_eq!(s.engine.window(), &[1.0, 2.0, 0.0]);
        assert_eq!(s.engine.state(), &EngineState::Terminated(Termination::EndOfInput));
    }

    #[test]
    fn pump_reports_unreadable_line() {
        let bad = io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        let mut s = session(vec![Ok("1".into()), Err(bad), Ok("2".into())]);
        let err = s.pump().unwrap();
        assert!(matches!(err, PlotError::MalformedRow { line: 2, .. }));
        assert!(matches!(
            s.engine.state(),
            EngineState::Terminated(Termination::Malformed(_))
        ));
        assert_eq!(s.figure.redraws, 1);
        assert!(s.status().starts_with("stopped:"));
    }

    #[test]
    fn pump_reports_malformed_line() {
        let mut s = session(vec![Ok("1".into()), Ok("one".into())]);
        assert!(matches!(s.pump(), Some(PlotError::MalformedRow { line: 2, .. })));
    }
}
