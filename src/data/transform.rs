//! Preprocessing applied to a loaded matrix: transpose, smoothing,
//! downsampling. Each stage returns a fresh matrix.

use super::model::SampleMatrix;
use crate::error::{PlotError, Result};
use crate::options::PreprocessOptions;

/// Run the requested stages in their fixed order.
///
/// `one_d` is the caller's explicit declaration that every column is an
/// independent 1-D series; multi-column smoothing requires it.
pub fn transform(
    matrix: SampleMatrix,
    opts: &PreprocessOptions,
    one_d: bool,
) -> Result<SampleMatrix> {
    let mut data = matrix;
    // A sequence has no second axis to swap.
    if opts.transpose && !data.is_1d() {
        data = data.transpose();
        log::debug!("transposed to {data}");
    }
    if opts.smooth > 2 {
        data = smooth(&data, opts.smooth, one_d)?;
        log::debug!("smoothed (window {}) to {data}", opts.smooth);
    }
    if let Some(ratio) = opts.downsample {
        data = downsample(&data, ratio)?;
        log::debug!("downsampled (ratio {ratio}) to {data}");
    }
    Ok(data)
}

/// Uniform moving average. Windows of 2 or less leave the data unchanged.
pub fn smooth(matrix: &SampleMatrix, window: usize, one_d: bool) -> Result<SampleMatrix> {
    if window <= 2 {
        return Ok(matrix.clone());
    }
    if matrix.is_1d() {
        return Ok(SampleMatrix::from_sequence(convolve_valid(
            &matrix.column(0),
            window,
        )?));
    }
    if !one_d {
        return Err(PlotError::UnsupportedShape(format!(
            "smoothing {} columns needs the 1-D interpretation flag",
            matrix.cols()
        )));
    }

    let pad = window / 2;
    if matrix.rows() < 2 * pad + 1 {
        return Err(PlotError::UnsupportedShape(format!(
            "{} rows is too short for smoothing window {window}",
            matrix.rows()
        )));
    }
    let columns: Vec<Vec<f64>> = matrix
        .columns()
        .iter()
        .map(|col| convolve_trimmed(col, window))
        .collect();
    SampleMatrix::from_columns(&columns)
        .ok_or_else(|| PlotError::UnsupportedShape("ragged smoothed columns".into()))
}

/// "Valid" convolution: one output per full window, `len - w + 1` values.
fn convolve_valid(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if values.len() < window {
        return Err(PlotError::UnsupportedShape(format!(
            "sequence of {} values is shorter than smoothing window {window}",
            values.len()
        )));
    }
    let w = window as f64;
    Ok(values.windows(window).map(|win| win.iter().sum::<f64>() / w).collect())
}

/// Centered ("same") convolution with `w/2` samples trimmed from both ends,
/// so every remaining value averages a full window and stays aligned with
/// its row.
fn convolve_trimmed(values: &[f64], window: usize) -> Vec<f64> {
    let pad = window / 2;
    let offset = (window - 1) / 2;
    let w = window as f64;
    (pad..values.len() - pad)
        .map(|i| {
            let end = i + offset;
            let start = end + 1 - window;
            values[start..=end].iter().sum::<f64>() / w
        })
        .collect()
}

/// Resample a 1-D sequence to `round(len * ratio)` points by linear
/// interpolation at evenly spaced, deduplicated integer positions.
pub fn downsample(matrix: &SampleMatrix, ratio: f64) -> Result<SampleMatrix> {
    if !matrix.is_1d() {
        return Err(PlotError::UnsupportedShape(format!(
            "downsampling needs a single sequence, got {} columns",
            matrix.cols()
        )));
    }
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(PlotError::InvalidOption(format!(
            "downsample ratio must be in (0, 1], got {ratio}"
        )));
    }

    let values = matrix.column(0);
    let len = values.len();
    let new_len = (len as f64 * ratio).round() as usize;

    let mut positions: Vec<usize> = linspace(0.0, len as f64, new_len)
        .map(|p| p as usize)
        .collect();
    positions.dedup();

    Ok(SampleMatrix::from_sequence(
        positions.into_iter().map(|p| interp(&values, p as f64)).collect(),
    ))
}

/// `n` evenly spaced values over `[start, stop]`, both ends included.
fn linspace(start: f64, stop: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (stop - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| start + step * i as f64)
}

/// Linear interpolation over indices `0..len`, clamped at both ends.
fn interp(values: &[f64], at: f64) -> f64 {
    let last = values.len() - 1;
    if at <= 0.0 {
        return values[0];
    }
    if at >= last as f64 {
        return values[last];
    }
    let lo = at.floor() as usize;
    let frac = at - lo as f64;
    values[lo] + (values[lo + 1] - values[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(values: &[f64]) -> SampleMatrix {
        SampleMatrix::from_sequence(values.to_vec())
    }

    #[test]
    fn small_windows_are_identity() {
        let m = SampleMatrix::from_rows(&[vec![1.0, 5.0], vec![2.0, 7.0]]).unwrap();
        assert_eq!(smooth(&m, 1, false).unwrap(), m);
        assert_eq!(smooth(&m, 2, false).unwrap(), m);
    }

    #[test]
    fn valid_smoothing_shortens_by_window_minus_one() {
        let out = smooth(&seq(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3, false).unwrap();
        assert_eq!(out.values(), &[2.0, 3.0, 4.0]);

        let out = smooth(&seq(&[1.0, 2.0, 3.0, 4.0, 5.0]), 4, false).unwrap();
        assert_eq!(out.values(), &[2.5, 3.5]);
    }

    #[test]
    fn multi_column_smoothing_needs_declaration() {
        let m = SampleMatrix::from_columns(&[
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![10.0, 20.0, 30.0, 40.0, 50.0],
        ])
        .unwrap();
        assert!(matches!(
            smooth(&m, 3, false),
            Err(PlotError::UnsupportedShape(_))
        ));

        let out = smooth(&m, 3, true).unwrap();
        assert_eq!(out.rows(), 3);
        assert_eq!(out.column(0), vec![2.0, 3.0, 4.0]);
        assert_eq!(out.column(1), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn even_window_trims_aligned_rows() {
        let m = SampleMatrix::from_columns(&[
            vec![0.0, 4.0, 8.0, 12.0, 16.0, 20.0],
            vec![1.0; 6],
        ])
        .unwrap();
        let out = smooth(&m, 4, true).unwrap();
        // pad = 2: rows 2 and 3 survive, averaging rows 0..=3 and 1..=4.
        assert_eq!(out.column(0), vec![6.0, 10.0]);
        assert_eq!(out.column(1), vec![1.0, 1.0]);
    }

    #[test]
    fn smoothing_too_short_input_fails() {
        assert!(smooth(&seq(&[1.0, 2.0]), 3, false).is_err());
    }

    #[test]
    fn downsample_full_ratio_preserves_length() {
        let values: Vec<f64> = (0..10).map(|i| i as f64 * 2.0).collect();
        let out = downsample(&seq(&values), 1.0).unwrap();
        assert_eq!(out.rows(), values.len());
        assert_eq!(out.values()[..9], values[..9]);
    }

    #[test]
    fn downsample_halves_sequence() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let out = downsample(&seq(&values), 0.5).unwrap();
        // positions 0, 2.5, 5, 7.5, 10 truncated to 0, 2, 5, 7, 10 (clamped to 9)
        assert_eq!(out.values(), &[0.0, 2.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn downsample_rejects_multi_column() {
        let m = SampleMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(matches!(
            downsample(&m, 0.5),
            Err(PlotError::UnsupportedShape(_))
        ));
    }

    #[test]
    fn transposing_a_sequence_keeps_it() {
        let opts = PreprocessOptions {
            transpose: true,
            ..Default::default()
        };
        let out = transform(seq(&[1.0, 2.0, 3.0]), &opts, false).unwrap();
        assert_eq!(out.cols(), 1);
        assert_eq!(out.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn stages_run_in_order() {
        // A single row transposes into a sequence, which can then be smoothed
        // and downsampled.
        let row = SampleMatrix::from_rows(&[vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]]).unwrap();
        let opts = PreprocessOptions {
            transpose: true,
            smooth: 3,
            downsample: Some(0.6),
        };
        let out = transform(row, &opts, false).unwrap();
        // smoothed: [2, 3, 4, 5, 6]; 3 points over [0, 5] -> 0, 2, 5 (clamped)
        assert_eq!(out.values(), &[2.0, 4.0, 6.0]);
    }
}
