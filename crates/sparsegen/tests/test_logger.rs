//! Tests that generation logs through the configured logger.

use ftlog::LevelFilter;
use sparsegen::utils::configure_logger;
use sparsegen::{Contamination, Regime, SampleGenerator, Task};

#[test]
fn logs_to_file() -> Result<(), String> {
    let (guard, log_path) = configure_logger("sparsegen-test", LevelFilter::Debug)?;

    let regime = Regime::new(Task::PoissonRegression, Contamination::Outlier);
    let generator = SampleGenerator::new(regime, 3, 0.2, 16)?;
    let samples = generator.generate_partitioned(40, 4);
    assert_eq!(samples.len(), 40);

    drop(guard);

    // Rotated appenders add a timestamp to the file name.
    let logs_dir = log_path.parent().ok_or("The log path has no parent")?;
    let found = std::fs::read_dir(logs_dir)
        .map_err(|e| e.to_string())?
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().starts_with("sparsegen-test"));
    assert!(found, "No log file in {logs_dir:?}");

    Ok(())
}
