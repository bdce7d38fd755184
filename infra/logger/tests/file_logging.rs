use arbor_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logger_writes_into_the_log_directory() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let log_dir = tmp.path().join("logs");

    let logger = Logger::builder()
        .name("arbor-file-logging")
        .console(false)
        .level(LevelFilter::INFO)
        .path(&log_dir)
        .max_files(1)
        .init()?;
    assert!(logger.guard().is_some());

    tracing::info!(feature = "Configuration cache", "incubating feature used");
    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("a .log file should exist");

    let contents = fs::read_to_string(log_file)?;
    assert!(contents.contains("incubating feature used"));
    Ok(())
}
