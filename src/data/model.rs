use std::fmt;

// ---------------------------------------------------------------------------
// SampleMatrix – the 2-D numeric array being visualised
// ---------------------------------------------------------------------------

/// Row-major matrix of samples: rows are observations, columns variables.
/// A matrix with a single column is the 1-D sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl SampleMatrix {
    /// Build from a flat row-major buffer. Returns `None` if the buffer
    /// length does not match the shape.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (rows * cols == data.len()).then_some(Self { rows, cols, data })
    }

    /// Build from equally long rows. Returns `None` on ragged input.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let data = rows.iter().flatten().copied().collect();
        Some(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// A 1-D sequence (one column).
    pub fn from_sequence(values: Vec<f64>) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values,
        }
    }

    /// Build from columns of equal length.
    pub fn from_columns(columns: &[Vec<f64>]) -> Option<Self> {
        let rows = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != rows) {
            return None;
        }
        let cols = columns.len();
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            data.extend(columns.iter().map(|c| c[r]));
        }
        Some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_1d(&self) -> bool {
        self.cols == 1
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Copy of one column.
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    pub fn columns(&self) -> Vec<Vec<f64>> {
        (0..self.cols).map(|c| self.column(c)).collect()
    }

    /// Flat row-major values.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            data.extend((0..self.rows).map(|r| self.get(r, c)));
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Remove a column in place and return its values.
    pub fn remove_column(&mut self, col: usize) -> Vec<f64> {
        let removed = self.column(col);
        let cols = self.cols;
        let mut idx = 0;
        self.data.retain(|_| {
            let keep = idx % cols != col;
            idx += 1;
            keep
        });
        self.cols -= 1;
        if self.cols == 0 {
            self.rows = 0;
        }
        removed
    }

    /// Fresh matrix holding the given columns (0-based), in the given order.
    pub fn select_columns(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(self.rows * indices.len());
        for r in 0..self.rows {
            let row = self.row(r);
            data.extend(indices.iter().map(|&c| row[c]));
        }
        Self {
            rows: self.rows,
            cols: indices.len(),
            data,
        }
    }
}

impl fmt::Display for SampleMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} matrix", self.rows, self.cols)
    }
}

// ---------------------------------------------------------------------------
// ColumnMetadata – labels and special column indices
// ---------------------------------------------------------------------------

/// Per-column labels plus the optional x-axis and color columns (0-based).
/// Kept in sync with the matrix whenever a column is removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMetadata {
    pub labels: Vec<String>,
    pub x_column: Option<usize>,
    pub color_column: Option<usize>,
}

impl ColumnMetadata {
    /// Empty labels for `cols` columns.
    pub fn unlabeled(cols: usize) -> Self {
        Self {
            labels: vec![String::new(); cols],
            ..Default::default()
        }
    }

    pub fn with_labels(labels: Vec<String>) -> Self {
        Self {
            labels,
            ..Default::default()
        }
    }

    pub fn label(&self, col: usize) -> &str {
        self.labels.get(col).map_or("", String::as_str)
    }

    /// Drop a column's label and shift the special indices to follow it.
    pub fn remove_column(&mut self, col: usize) -> Option<String> {
        let removed = (col < self.labels.len()).then(|| self.labels.remove(col));
        self.x_column = shift_index(self.x_column, col);
        self.color_column = shift_index(self.color_column, col);
        removed
    }
}

fn shift_index(index: Option<usize>, removed: usize) -> Option<usize> {
    match index {
        Some(i) if i == removed => None,
        Some(i) if i > removed => Some(i - 1),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SampleMatrix {
        SampleMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn shape_and_access() {
        let m = sample();
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.get(1, 2), 6.0);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.column(1), vec![2.0, 5.0]);
        assert!(!m.is_1d());
        assert!(SampleMatrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_none());
        assert!(SampleMatrix::new(2, 2, vec![1.0]).is_none());
    }

    #[test]
    fn transpose_swaps_axes() {
        let t = sample().transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert_eq!(t.row(2), &[3.0, 6.0]);
        assert_eq!(t.transpose(), sample());
    }

    #[test]
    fn remove_column_keeps_remaining_order() {
        let mut m = sample();
        assert_eq!(m.remove_column(1), vec![2.0, 5.0]);
        assert_eq!(m.values(), &[1.0, 3.0, 4.0, 6.0]);
        assert_eq!(m.cols(), 2);
    }

    #[test]
    fn from_columns_matches_from_rows() {
        let cols = sample().columns();
        assert_eq!(SampleMatrix::from_columns(&cols).unwrap(), sample());
        assert_eq!(sample().select_columns(&[2, 0]).row(1), &[6.0, 4.0]);
    }

    #[test]
    fn metadata_indices_follow_removed_columns() {
        let mut meta = ColumnMetadata::with_labels(vec!["a".into(), "b".into(), "c".into()]);
        meta.x_column = Some(2);
        meta.color_column = Some(0);

        assert_eq!(meta.remove_column(0).as_deref(), Some("a"));
        assert_eq!(meta.labels, vec!["b", "c"]);
        assert_eq!(meta.x_column, Some(1));
        assert_eq!(meta.color_column, None);

        meta.remove_column(1);
        assert_eq!(meta.x_column, None);
    }
}
