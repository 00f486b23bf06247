use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use proptest::prelude::*;
use rusty_plotter::PlotError;
use rusty_plotter::data::loader::{load_file, parse_text};
use rusty_plotter::data::model::SampleMatrix;
use rusty_plotter::options::LoadOptions;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_whitespace_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "data.dat", "# t v\n0 1.5\n1   2.5\n\n2\t3.5\n");

    let loaded = load_file(&path, &LoadOptions::default()).unwrap();

    assert_eq!(loaded.matrix.rows(), 3);
    assert_eq!(loaded.matrix.cols(), 2);
    assert_eq!(loaded.matrix.column(1), vec![1.5, 2.5, 3.5]);
    assert!(loaded.skipped.is_empty());
}

#[test]
fn test_malformed_rows_are_skipped_and_reported() {
    let loaded = parse_text("1 2\n3 x\n5 6\n7\n", &LoadOptions::default()).unwrap();

    assert_eq!(loaded.matrix.rows(), 2);
    let lines: Vec<usize> = loaded
        .skipped
        .iter()
        .map(|e| match e {
            PlotError::MalformedRow { line, .. } => *line,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(lines, vec![2, 4]);
}

#[test]
fn test_skip_rows_counts_raw_lines() {
    let opts = LoadOptions {
        skip_rows: 2,
        ..Default::default()
    };

    let loaded = parse_text("garbage\n# comment\n1\n2\n", &opts).unwrap();

    assert_eq!(loaded.matrix.column(0), vec![1.0, 2.0]);
}

#[test]
fn test_custom_delimiter_and_comment() {
    let opts = LoadOptions {
        delimiter: Some(b';'),
        comment: "%".into(),
        ..Default::default()
    };

    let loaded = parse_text("% header\n1;2\n3;4\n", &opts).unwrap();

    assert_eq!(loaded.matrix.row(1), &[3.0, 4.0]);
}

#[test]
fn test_column_subset_reorders() {
    let opts = LoadOptions {
        header: true,
        columns: Some(vec![3, 1]),
        ..Default::default()
    };

    let loaded = parse_text("a b c\n1 2 3\n4 5 6\n", &opts).unwrap();

    assert_eq!(loaded.labels, vec!["c", "a"]);
    assert_eq!(loaded.matrix.row(0), &[3.0, 1.0]);
}

#[test]
fn test_only_comments_is_an_error() {
    assert!(parse_text("# nothing here\n\n", &LoadOptions::default()).is_err());
}

#[test]
fn test_csv_with_header_and_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "data.csv", "\"time\",\"value\"\n0,\"1.5\"\n1, 2.5\n");
    let opts = LoadOptions {
        header: true,
        ..Default::default()
    };

    let loaded = load_file(&path, &opts).unwrap();

    assert_eq!(loaded.labels, vec!["time", "value"]);
    assert_eq!(loaded.matrix.column(1), vec![1.5, 2.5]);
}

#[test]
fn test_csv_skip_counts_raw_lines_like_text() {
    let dir = tempfile::tempdir().unwrap();
    let contents = "# exported\ngarbage,row\n1,2\n3,4\n";
    let csv = write(&dir, "data.csv", contents);
    let txt = write(&dir, "data.txt", contents);
    let opts = LoadOptions {
        skip_rows: 2,
        ..Default::default()
    };
    let text_opts = LoadOptions {
        delimiter: Some(b','),
        ..opts.clone()
    };

    let from_csv = load_file(&csv, &opts).unwrap();
    let from_text = load_file(&txt, &text_opts).unwrap();

    assert_eq!(from_csv.matrix, from_text.matrix);
    assert_eq!(from_csv.matrix.column(0), vec![1.0, 3.0]);
    assert!(from_csv.skipped.is_empty());
}

#[test]
fn test_json_rows_and_labeled_layouts() {
    let dir = tempfile::tempdir().unwrap();
    let plain = write(&dir, "plain.json", "[[0, 1.5], [1, 2.5]]");
    let labeled = write(
        &dir,
        "labeled.json",
        r#"{ "labels": ["t", "v"], "rows": [[0, 1.5], [1, "bad"], [2, 3.5]] }"#,
    );

    let plain = load_file(&plain, &LoadOptions::default()).unwrap();
    assert_eq!(plain.matrix.row(1), &[1.0, 2.5]);

    let labeled = load_file(&labeled, &LoadOptions::default()).unwrap();
    assert_eq!(labeled.labels, vec!["t", "v"]);
    assert_eq!(labeled.matrix.column(0), vec![0.0, 2.0]);
    assert_eq!(labeled.skipped.len(), 1);
}

#[test]
fn test_parquet_numeric_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.parquet");
    let schema = Arc::new(Schema::new(vec![
        Field::new("t", DataType::Int32, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("v", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(vec![0, 1, 2])),
        Arc::new(StringArray::from(vec!["a", "b", "c"])),
        Arc::new(Float64Array::from(vec![Some(1.5), None, Some(3.5)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let loaded = load_file(&path, &LoadOptions::default()).unwrap();

    assert_eq!(loaded.labels, vec!["t", "v"]);
    assert_eq!(loaded.matrix.column(0), vec![0.0, 1.0, 2.0]);
    assert!(loaded.matrix.get(1, 1).is_nan());
}

proptest! {
    #[test]
    fn prop_transpose_is_an_involution(
        rows in 1usize..8,
        cols in 1usize..8,
        seed in prop::collection::vec(-1e6f64..1e6, 64),
    ) {
        let data = seed[..rows * cols].to_vec();
        let matrix = SampleMatrix::new(rows, cols, data).unwrap();
        let transposed = matrix.transpose();
        prop_assert_eq!(transposed.rows(), cols);
        prop_assert_eq!(transposed.cols(), rows);
        prop_assert_eq!(transposed.transpose(), matrix);
    }
}
