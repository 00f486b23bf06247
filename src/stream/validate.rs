use crate::options::{LoadOptions, PlotOptions};

type Check = fn(&PlotOptions) -> bool;

/// Options that make no sense for an unbounded stream, by flag name.
const STREAM_INCOMPATIBLE: &[(&str, Check)] = &[
    ("-t/--transpose", |o| o.preprocess.transpose),
    ("-3", |o| o.mode.three_d),
    ("-2/--paired", |o| o.mode.paired),
    ("-x", |o| o.mode.x_column),
    ("--time", |o| o.mode.time),
    ("-y", |o| o.mode.one_d),
    ("--hist", |o| o.mode.histogram > 0),
    ("-s > 1", |o| o.preprocess.smooth > 1),
    ("-d/--downsample", |o| o.preprocess.downsample.is_some()),
    ("--cols", |o| o.load.columns.is_some()),
    ("--skip", |o| o.load.skip_rows > 0),
    ("--comment", |o| o.load.comment != LoadOptions::default().comment),
    ("-c/--color-col", |o| o.mode.color_column.is_some()),
    ("--header", |o| o.load.header),
];

/// Names of every requested option that rolling mode cannot honour.
pub fn validate_streaming(opts: &PlotOptions) -> Vec<&'static str> {
    STREAM_INCOMPATIBLE
        .iter()
        .filter(|(_, violated)| violated(opts))
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_compatible() {
        assert!(validate_streaming(&PlotOptions::default()).is_empty());
    }

    #[test]
    fn reports_every_violation_in_table_order() {
        let mut opts = PlotOptions::default();
        opts.preprocess.transpose = true;
        opts.mode.histogram = 10;
        opts.load.comment = "%".into();
        assert_eq!(
            validate_streaming(&opts),
            vec!["-t/--transpose", "--hist", "--comment"]
        );
    }

    #[test]
    fn smoothing_window_of_one_is_allowed() {
        let mut opts = PlotOptions::default();
        opts.preprocess.smooth = 1;
        assert!(validate_streaming(&opts).is_empty());
        opts.preprocess.smooth = 2;
        assert_eq!(validate_streaming(&opts), vec!["-s > 1"]);
    }
}
