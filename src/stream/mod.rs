//! Rolling mode: a bounded, continuously redrawn view over an unbounded
//! line stream.
//!
//! ```text
//!   start ──► Validating ──violations──► Terminated
//!                 │
//!                 ▼
//!              Running ──line──► parse ► push ► flatten ► update_line ► autoscale ► redraw
//!                 │
//!      end of input / malformed line
//!                 ▼
//!             Terminated
//! ```

pub mod buffer;
pub mod validate;

pub use buffer::RollingBuffer;
pub use validate::validate_streaming;

use std::io::BufRead;

use crate::data::loader::parse_vector;
use crate::error::{PlotError, Result};
use crate::options::PlotOptions;
use crate::render::{Figure, Renderer};

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Options incompatible with rolling mode; nothing was drawn.
    Incompatible(Vec<&'static str>),
    EndOfInput,
    Malformed(PlotError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    Validating,
    Running,
    Terminated(Termination),
}

/// Owns the rolling buffer and display window of one session.
#[derive(Debug)]
pub struct StreamingEngine {
    state: EngineState,
    buffer: RollingBuffer<Vec<f64>>,
    window: Vec<f64>,
    width: Option<usize>,
    delimiter: Option<u8>,
    lines_seen: usize,
}

impl StreamingEngine {
    /// Validate the options and start a session. Incompatible options give
    /// an engine that is already terminated; only a missing or zero buffer
    /// size is an error.
    pub fn start(opts: &PlotOptions) -> Result<Self> {
        let capacity = match opts.rolling {
            Some(n) if n > 0 => n,
            _ => {
                return Err(PlotError::InvalidOption(
                    "rolling mode needs a positive buffer size".into(),
                ))
            }
        };
        let mut engine = Self {
            state: EngineState::Validating,
            buffer: RollingBuffer::new(capacity),
            window: Vec::new(),
            width: None,
            delimiter: opts.load.delimiter,
            lines_seen: 0,
        };

        let violations = validate_streaming(opts);
        if violations.is_empty() {
            log::info!("Rolling session started with a buffer of {capacity}");
            engine.state = EngineState::Running;
        } else {
            log::warn!("{}", PlotError::IncompatibleOptions(violations.clone()));
            engine.state = EngineState::Terminated(Termination::Incompatible(violations));
        }
        Ok(engine)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Flag names that stopped the session during validation.
    pub fn violations(&self) -> &[&'static str] {
        match &self.state {
            EngineState::Terminated(Termination::Incompatible(v)) => v,
            _ => &[],
        }
    }

    /// The display window as of the last redraw.
    pub fn window(&self) -> &[f64] {
        &self.window
    }

    pub fn buffer(&self) -> &RollingBuffer<Vec<f64>> {
        &self.buffer
    }

    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// One ingest-and-redraw cycle. A line that does not parse, or whose
    /// width differs from the first line's, ends the session with
    /// `MalformedRow`. Lines arriving after termination are ignored.
    pub fn ingest<R: Renderer + ?Sized>(
        &mut self,
        line: &str,
        renderer: &mut R,
        fig: &mut Figure,
    ) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        self.lines_seen += 1;
        let line_no = self.lines_seen;

        let vector = match self.parse(line, line_no) {
            Ok(v) => v,
            Err(e) => {
                log::error!("Rolling session aborted: {e}");
                self.state = EngineState::Terminated(Termination::Malformed(e.clone()));
                return Err(e);
            }
        };

        self.buffer.push(vector);
        for (slot, value) in self.window.iter_mut().zip(self.buffer.iter().flatten()) {
            *slot = *value;
        }

        renderer.update_line(fig, &self.window);
        fig.autoscale();
        renderer.redraw(fig);
        Ok(())
    }

    fn parse(&mut self, line: &str, line_no: usize) -> Result<Vec<f64>> {
        let vector = parse_vector(line, self.delimiter, line_no)?;
        match self.width {
            None => {
                self.width = Some(vector.len());
                self.window = vec![0.0; self.buffer.capacity() * vector.len()];
            }
            Some(width) if width != vector.len() => {
                return Err(PlotError::MalformedRow {
                    line: line_no,
                    reason: format!("expected {width} value(s), found {}", vector.len()),
                });
            }
            Some(_) => {}
        }
        Ok(vector)
    }

    /// A line could not be read at all (I/O failure or invalid UTF-8). Ends
    /// the session like any other malformed line.
    pub fn reject_unreadable(&mut self, err: &std::io::Error) -> PlotError {
        self.lines_seen += 1;
        let e = PlotError::MalformedRow {
            line: self.lines_seen,
            reason: format!("unreadable line: {err}"),
        };
        log::error!("Rolling session aborted: {e}");
        self.state = EngineState::Terminated(Termination::Malformed(e.clone()));
        e
    }

    /// The input is exhausted.
    pub fn finish(&mut self) {
        if self.is_running() {
            log::info!("Rolling session ended after {} line(s)", self.lines_seen);
            self.state = EngineState::Terminated(Termination::EndOfInput);
        }
    }

    /// Drive the session from a line source until it is exhausted, blocking
    /// on each line. Returns the number of lines ingested.
    pub fn run<B, R>(&mut self, reader: B, renderer: &mut R, fig: &mut Figure) -> anyhow::Result<usize>
    where
        B: BufRead,
        R: Renderer + ?Sized,
    {
        for line in reader.lines() {
            if !self.is_running() {
                break;
            }
            let line = match line {
                Ok(line) => line,
                Err(e) => return Err(self.reject_unreadable(&e).into()),
            };
            self.ingest(&line, renderer, fig)?;
        }
        self.finish();
        Ok(self.lines_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderHints;
    use crate::render::FigureRenderer;

    fn rolling(n: usize) -> PlotOptions {
        PlotOptions {
            rolling: Some(n),
            ..Default::default()
        }
    }

    fn figure() -> Figure {
        Figure::new(&RenderHints::default(), String::new()).unwrap()
    }

    #[test]
    fn window_tracks_last_n_lines() {
        let mut engine = StreamingEngine::start(&rolling(3)).unwrap();
        let mut fig = figure();
        engine.ingest("1", &mut FigureRenderer, &mut fig).unwrap();
        assert_eq!(engine.window(), &[1.0, 0.0, 0.0]);
        for line in ["2", "3", "4"] {
            engine.ingest(line, &mut FigureRenderer, &mut fig).unwrap();
        }
        assert_eq!(engine.window(), &[2.0, 3.0, 4.0]);
        assert_eq!(fig.redraws, 4);
    }

    #[test]
    fn vectors_are_flattened_oldest_first() {
        let mut engine = StreamingEngine::start(&rolling(2)).unwrap();
        let mut fig = figure();
        for line in ["1 2", "3 4", "5 6"] {
            engine.ingest(line, &mut FigureRenderer, &mut fig).unwrap();
        }
        assert_eq!(engine.window(), &[3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn malformed_line_terminates() {
        let mut engine = StreamingEngine::start(&rolling(2)).unwrap();
        let mut fig = figure();
        engine.ingest("1", &mut FigureRenderer, &mut fig).unwrap();
        let err = engine.ingest("oops", &mut FigureRenderer, &mut fig).unwrap_err();
        assert!(matches!(err, PlotError::MalformedRow { line: 2, .. }));
        assert!(matches!(
            engine.state(),
            EngineState::Terminated(Termination::Malformed(_))
        ));
        // Later lines are ignored.
        engine.ingest("5", &mut FigureRenderer, &mut fig).unwrap();
        assert_eq!(fig.redraws, 1);
    }

    #[test]
    fn width_change_is_malformed() {
        let mut engine = StreamingEngine::start(&rolling(2)).unwrap();
        let mut fig = figure();
        engine.ingest("1 2", &mut FigureRenderer, &mut fig).unwrap();
        assert!(engine.ingest("1 2 3", &mut FigureRenderer, &mut fig).is_err());
    }

    #[test]
    fn incompatible_options_terminate_before_running() {
        let mut opts = rolling(5);
        opts.mode.three_d = true;
        let engine = StreamingEngine::start(&opts).unwrap();
        assert_eq!(engine.violations(), &["-3"]);
        assert!(!engine.is_running());
    }

    #[test]
    fn missing_capacity_is_an_error() {
        assert!(StreamingEngine::start(&PlotOptions::default()).is_err());
    }

    #[test]
    fn run_consumes_reader_and_finishes() {
        let mut engine = StreamingEngine::start(&rolling(2)).unwrap();
        let mut fig = figure();
        let seen = engine
            .run("1\n2\n3\n".as_bytes(), &mut FigureRenderer, &mut fig)
            .unwrap();
        assert_eq!(seen, 3);
        assert_eq!(engine.window(), &[2.0, 3.0]);
        assert_eq!(engine.state(), &EngineState::Terminated(Termination::EndOfInput));
    }
}
