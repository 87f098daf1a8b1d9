//! Utilities for test harnesses that drive the generator.

use std::path::PathBuf;

use ftlog::{
    appender::{FileAppender, Period},
    LevelFilter, LoggerGuard,
};

/// Configures the logger to write to `./logs/<file_name>.log`.
///
/// Logs from the appender itself go to a sibling `.err.log` file.
///
/// # Errors
///
/// - If a logs directory could not be located/created.
/// - If the logger could not be initialized.
pub fn configure_logger(file_name: &str, level: LevelFilter) -> Result<(LoggerGuard, PathBuf), String> {
    let root_dir = PathBuf::from(".").canonicalize().map_err(|e| e.to_string())?;
    let logs_dir = root_dir.join("logs");
    if !logs_dir.exists() {
        std::fs::create_dir(&logs_dir).map_err(|e| e.to_string())?;
    }
    let log_path = logs_dir.join(format!("{file_name}.log"));

    let writer = FileAppender::builder().path(&log_path).rotate(Period::Day).build();

    let err_path = log_path.with_extension("err.log");

    let guard = ftlog::Builder::new()
        .max_log_level(level)
        // `None` would write to stderr
        .root(writer)
        .filter("ftlog::appender", "ftlog-appender", LevelFilter::Warn)
        .appender("ftlog-appender", FileAppender::new(err_path))
        .try_init()
        .map_err(|e| e.to_string())?;

    Ok((guard, log_path))
}

/// Counts the stored entries of each feature vector that fall inside
/// `positions`, summed over all samples.
///
/// Dividing by `samples.len() * positions.len()` gives the empirical sparsity
/// of those positions.
#[must_use]
pub fn count_nonzero_in(samples: &[crate::Sample], positions: core::ops::Range<usize>) -> usize {
    samples
        .iter()
        .map(|s| s.features.indices().iter().filter(|i| positions.contains(i)).count())
        .sum()
}
