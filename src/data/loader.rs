use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::SampleMatrix;
use crate::error::PlotError;
use crate::options::LoadOptions;

/// A loaded matrix with its header labels and the rows that were skipped.
#[derive(Debug, Clone)]
pub struct LoadedMatrix {
    pub matrix: SampleMatrix,
    /// One label per column; empty strings without a header.
    pub labels: Vec<String>,
    /// `MalformedRow` errors for every row that was dropped.
    pub skipped: Vec<PlotError>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sample matrix from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – numeric columns become matrix columns, field names labels
/// * `.json`    – `[[1, 2], [3, 4]]` or `{ "labels": [...], "rows": [[...]] }`
/// * `.csv`     – comma separated unless a delimiter is configured
/// * anything else – delimited text (whitespace unless configured)
pub fn load_file(path: &Path, opts: &LoadOptions) -> Result<LoadedMatrix> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, opts),
        "json" => load_json(path, opts),
        "csv" => load_csv(path, opts),
        _ => {
            let text = std::fs::read_to_string(path).context("reading text file")?;
            parse_text(&text, opts)
        }
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} from {} ({} row(s) skipped)",
        loaded.matrix,
        path.display(),
        loaded.skipped.len()
    );
    Ok(loaded)
}

/// Load delimited text from any reader (stdin in practice).
pub fn load_reader<R: Read>(mut reader: R, opts: &LoadOptions) -> Result<LoadedMatrix> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("reading input stream")?;
    parse_text(&text, opts)
}

/// Parse one line into a numeric vector. Used by the streaming engine, where
/// a failure is fatal rather than skipped.
pub fn parse_vector(
    line: &str,
    delimiter: Option<u8>,
    line_no: usize,
) -> std::result::Result<Vec<f64>, PlotError> {
    let fields = split_fields(line, delimiter);
    if fields.is_empty() {
        return Err(PlotError::MalformedRow {
            line: line_no,
            reason: "empty line".into(),
        });
    }
    parse_fields(&fields, line_no)
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Parse delimited text. Skip rows count raw lines (comments included);
/// comment and blank lines are ignored; malformed rows are skipped and
/// reported.
pub fn parse_text(text: &str, opts: &LoadOptions) -> Result<LoadedMatrix> {
    let mut collector = RowCollector::new(opts);

    for (idx, line) in text.lines().enumerate().skip(opts.skip_rows) {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(opts.comment.as_str()) {
            continue;
        }
        let fields = split_fields(trimmed, opts.delimiter);
        if collector.wants_header() {
            collector.header(&fields);
        } else {
            collector.push_fields(line_no, &fields);
        }
    }

    collector.finish()
}

fn split_fields(line: &str, delimiter: Option<u8>) -> Vec<&str> {
    match delimiter {
        None => line.split_whitespace().collect(),
        Some(d) => {
            let line = line.trim();
            if line.is_empty() {
                return Vec::new();
            }
            line.split(char::from(d)).map(str::trim).collect()
        }
    }
}

fn parse_fields(fields: &[&str], line_no: usize) -> std::result::Result<Vec<f64>, PlotError> {
    fields
        .iter()
        .enumerate()
        .map(|(j, tok)| {
            tok.parse::<f64>().map_err(|_| PlotError::MalformedRow {
                line: line_no,
                reason: format!("field {}: '{tok}' is not a number", j + 1),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV files go through the `csv` reader so quoted fields work. The comment
/// marker is honoured when it is a single byte. Skip rows count raw lines,
/// as for delimited text, so they are dropped before the reader sees them.
fn load_csv(path: &Path, opts: &LoadOptions) -> Result<LoadedMatrix> {
    let comment = match opts.comment.as_bytes() {
        [b] => Some(*b),
        _ => None,
    };
    let text = std::fs::read_to_string(path).context("reading CSV")?;
    let body = skip_lines(&text, opts.skip_rows);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter.unwrap_or(b','))
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(comment)
        .from_reader(body.as_bytes());

    let mut collector = RowCollector::new(opts);

    for (row_no, result) in reader.records().enumerate() {
        let line_no = opts.skip_rows + row_no + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                collector.reject(PlotError::MalformedRow {
                    line: line_no,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line_no = record
            .position()
            .map_or(line_no, |p| opts.skip_rows + p.line() as usize);
        let fields: Vec<&str> = record.iter().collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        if collector.wants_header() {
            collector.header(&fields);
        } else {
            collector.push_fields(line_no, &fields);
        }
    }

    collector.finish()
}

/// The text after the first `n` lines.
fn skip_lines(text: &str, n: usize) -> &str {
    let offset: usize = text.split_inclusive('\n').take(n).map(str::len).sum();
    &text[offset..]
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON layouts:
///
/// ```json
/// [[0.0, 1.5], [1.0, 2.5]]
/// ```
///
/// ```json
/// { "labels": ["t", "v"], "rows": [[0.0, 1.5], [1.0, 2.5]] }
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonMatrix {
    Rows(Vec<Vec<JsonValue>>),
    Labeled {
        #[serde(default)]
        labels: Vec<String>,
        rows: Vec<Vec<JsonValue>>,
    },
}

fn load_json(path: &Path, opts: &LoadOptions) -> Result<LoadedMatrix> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let parsed: JsonMatrix = serde_json::from_str(&text).context("parsing JSON")?;

    let (labels, rows) = match parsed {
        JsonMatrix::Rows(rows) => (None, rows),
        JsonMatrix::Labeled { labels, rows } => (Some(labels), rows),
    };

    let mut collector = RowCollector::new(opts);
    if let Some(labels) = labels {
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        collector.header(&refs);
    }

    for (i, row) in rows.iter().enumerate().skip(opts.skip_rows) {
        let line_no = i + 1;
        if collector.wants_header() {
            let names: Vec<String> = row.iter().map(json_label).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            collector.header(&refs);
            continue;
        }
        let values: std::result::Result<Vec<f64>, PlotError> = row
            .iter()
            .enumerate()
            .map(|(j, v)| {
                v.as_f64().ok_or_else(|| PlotError::MalformedRow {
                    line: line_no,
                    reason: format!("field {}: {v} is not a number", j + 1),
                })
            })
            .collect();
        match values {
            Ok(values) => collector.push_values(line_no, values),
            Err(e) => collector.reject(e),
        }
    }

    collector.finish()
}

fn json_label(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load the numeric columns of a Parquet file.
///
/// Float64, Float32, Int32 and Int64 columns become matrix columns (nulls
/// read as NaN) and their field names become labels. Other columns are
/// ignored.
fn load_parquet(path: &Path, opts: &LoadOptions) -> Result<LoadedMatrix> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut labels: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let numeric: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| is_numeric(f.data_type()))
            .map(|(i, _)| i)
            .collect();
        if numeric.is_empty() {
            bail!("Parquet file has no numeric columns");
        }
        if labels.is_none() {
            labels = Some(
                numeric
                    .iter()
                    .map(|&i| schema.field(i).name().clone())
                    .collect(),
            );
        }

        let columns: Vec<Vec<f64>> = numeric
            .iter()
            .map(|&i| extract_f64_column(batch.column(i)))
            .collect::<Result<_>>()?;

        for r in 0..batch.num_rows() {
            rows.push(columns.iter().map(|c| c[r]).collect());
        }
    }

    let mut collector = RowCollector::new(opts);
    if let Some(labels) = &labels {
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        collector.header(&refs);
    }
    for (i, row) in rows.into_iter().enumerate().skip(opts.skip_rows) {
        collector.push_values(i + 1, row);
    }
    collector.finish()
}

fn is_numeric(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Float64 | DataType::Float32 | DataType::Int32 | DataType::Int64
    )
}

/// Read a numeric Arrow column as `f64`, nulls becoming NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let any = col.as_any();
    let values = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect(),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, |i| i as f64))
            .collect(),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(values)
}

// ---------------------------------------------------------------------------
// Row collection shared by every format
// ---------------------------------------------------------------------------

/// Applies the column subset, fixes the row width from the first accepted
/// row, and records rejected rows instead of failing.
struct RowCollector<'a> {
    opts: &'a LoadOptions,
    header_pending: bool,
    labels: Option<Vec<String>>,
    width: Option<usize>,
    rows: usize,
    values: Vec<f64>,
    skipped: Vec<PlotError>,
}

impl<'a> RowCollector<'a> {
    fn new(opts: &'a LoadOptions) -> Self {
        Self {
            opts,
            header_pending: opts.header,
            labels: None,
            width: None,
            rows: 0,
            values: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn wants_header(&self) -> bool {
        self.header_pending
    }

    fn header(&mut self, fields: &[&str]) {
        self.header_pending = false;
        let names = match self.select(fields, 0) {
            Ok(selected) => selected.iter().map(|s| s.to_string()).collect(),
            Err(_) => fields.iter().map(|s| s.to_string()).collect(),
        };
        self.labels = Some(names);
    }

    fn push_fields(&mut self, line: usize, fields: &[&str]) {
        let parsed = self
            .select(fields, line)
            .and_then(|selected| parse_fields(&selected, line));
        match parsed {
            Ok(values) => self.accept(line, values),
            Err(e) => self.reject(e),
        }
    }

    /// Values that are already numeric still go through the column subset.
    fn push_values(&mut self, line: usize, values: Vec<f64>) {
        match self.select(&values, line) {
            Ok(selected) => self.accept(line, selected),
            Err(e) => self.reject(e),
        }
    }

    fn select<T: Copy>(&self, fields: &[T], line: usize) -> std::result::Result<Vec<T>, PlotError> {
        let Some(cols) = &self.opts.columns else {
            return Ok(fields.to_vec());
        };
        cols.iter()
            .map(|&c| {
                fields
                    .get(c.wrapping_sub(1))
                    .copied()
                    .ok_or_else(|| PlotError::MalformedRow {
                        line,
                        reason: format!("no column {c} (row has {})", fields.len()),
                    })
            })
            .collect()
    }

    fn accept(&mut self, line: usize, values: Vec<f64>) {
        let width = *self.width.get_or_insert(values.len());
        if values.len() != width {
            self.reject(PlotError::MalformedRow {
                line,
                reason: format!("expected {width} field(s), found {}", values.len()),
            });
            return;
        }
        self.values.extend(values);
        self.rows += 1;
    }

    fn reject(&mut self, err: PlotError) {
        log::warn!("Skipping row: {err}");
        self.skipped.push(err);
    }

    fn finish(self) -> Result<LoadedMatrix> {
        let Some(width) = self.width else {
            bail!("no numeric rows found");
        };
        let mut matrix = SampleMatrix::new(self.rows, width, self.values)
            .context("row buffer does not match the matrix shape")?;

        let mut labels = self.labels.unwrap_or_default();
        labels.resize(width, String::new());

        // A single row of several values is read as one sequence.
        if matrix.rows() == 1 && matrix.cols() > 1 {
            matrix = matrix.transpose();
            labels = vec![String::new()];
        }

        Ok(LoadedMatrix {
            matrix,
            labels,
            skipped: self.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> LoadOptions {
        LoadOptions::default()
    }

    #[test]
    fn parses_whitespace_rows() {
        let loaded = parse_text("1 2\n3\t4\n  5   6  \n", &opts()).unwrap();
        assert_eq!(loaded.matrix.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(loaded.matrix.cols(), 2);
        assert_eq!(loaded.labels, vec!["", ""]);
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn skips_comments_blank_lines_and_leading_rows() {
        let text = "garbage line\n# a comment\n\n1 2\n% other\n3 4\n";
        let mut o = opts();
        o.skip_rows = 1;
        o.comment = "%".into();
        let loaded = parse_text(text, &o).unwrap();
        // "# a comment" is malformed once the comment marker is '%'.
        assert_eq!(loaded.matrix.rows(), 2);
        assert_eq!(loaded.skipped.len(), 1);
    }

    #[test]
    fn malformed_rows_are_reported_not_fatal() {
        let loaded = parse_text("1 2\n3 x\n5 6\n7\n", &opts()).unwrap();
        assert_eq!(loaded.matrix.values(), &[1.0, 2.0, 5.0, 6.0]);
        assert_eq!(loaded.skipped.len(), 2);
        assert!(matches!(
            loaded.skipped[0],
            PlotError::MalformedRow { line: 2, .. }
        ));
        assert!(matches!(
            loaded.skipped[1],
            PlotError::MalformedRow { line: 4, .. }
        ));
    }

    #[test]
    fn header_and_column_subset() {
        let mut o = opts();
        o.header = true;
        o.delimiter = Some(b',');
        o.columns = Some(vec![3, 1]);
        let loaded = parse_text("a, b, c\n1, 2, 3\n4, 5, 6\n", &o).unwrap();
        assert_eq!(loaded.labels, vec!["c", "a"]);
        assert_eq!(loaded.matrix.values(), &[3.0, 1.0, 6.0, 4.0]);
    }

    #[test]
    fn single_row_becomes_sequence() {
        let loaded = parse_text("1 2 3 4\n", &opts()).unwrap();
        assert!(loaded.matrix.is_1d());
        assert_eq!(loaded.matrix.rows(), 4);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_text("# only comments\n", &opts()).is_err());
    }

    #[test]
    fn parse_vector_is_strict() {
        assert_eq!(parse_vector("1.5 2", None, 1).unwrap(), vec![1.5, 2.0]);
        assert_eq!(parse_vector("1;2", Some(b';'), 1).unwrap(), vec![1.0, 2.0]);
        assert!(parse_vector("1 two", None, 7).is_err());
        assert!(matches!(
            parse_vector("   ", None, 3),
            Err(PlotError::MalformedRow { line: 3, .. })
        ));
    }
}
