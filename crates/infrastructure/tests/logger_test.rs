use ember_dns_infrastructure::logging::{LogLevel, LogRecord, Logger};
use std::sync::Arc;
use tempfile::tempdir;

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn records_are_written_in_the_expected_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("server.log");

    let logger = Logger::new(path.clone(), LogLevel::Debug);
    logger.log(LogLevel::Info, "server started");
    logger.log(LogLevel::Error, "something failed");
    logger.shutdown();

    let lines = read_lines(&path);
    // shutdown() itself appends a final INFO wake-up record.
    assert_eq!(lines.len(), 3);

    let parts: Vec<&str> = lines[0].splitn(4, " - ").collect();
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[1], "ember-dns");
    assert_eq!(parts[2], "INFO");
    assert_eq!(parts[3], "server started");
    // Timestamp shaped like 2026-08-02T12:34:56Z.
    let stamp = parts[0].as_bytes();
    assert_eq!(stamp.len(), 20);
    assert_eq!(stamp[4], b'-');
    assert_eq!(stamp[10], b'T');
    assert_eq!(stamp[19], b'Z');

    assert!(lines[1].contains(" - ERROR - something failed"));
}

#[test]
fn configured_level_filters_less_severe_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("server.log");

    let logger = Logger::new(path.clone(), LogLevel::Error);
    logger.log(LogLevel::Warning, "kept: warning outranks error");
    logger.log(LogLevel::Error, "kept: at the configured level");
    logger.log(LogLevel::Info, "dropped");
    logger.log(LogLevel::Debug, "dropped");
    logger.shutdown();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("WARNING"));
    assert!(lines[1].contains("ERROR"));
}

#[test]
fn no_admitted_record_is_lost_at_shutdown() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("server.log");

    let logger = Logger::new(path.clone(), LogLevel::Debug);
    for i in 0..500 {
        logger.log(LogLevel::Debug, format!("record {i}"));
    }
    logger.shutdown();

    let lines = read_lines(&path);
    let records: Vec<&String> = lines.iter().filter(|l| l.contains("record ")).collect();
    assert_eq!(records.len(), 500);
    // Single-producer order is preserved through the queue and the sink.
    for (i, line) in records.iter().enumerate() {
        assert!(line.ends_with(&format!("record {i}")));
    }
}

#[test]
fn producers_on_many_threads_never_lose_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("server.log");

    let logger = Arc::new(Logger::new(path.clone(), LogLevel::Debug));
    let mut producers = Vec::new();
    for t in 0..4 {
        let logger = Arc::clone(&logger);
        producers.push(std::thread::spawn(move || {
            for i in 0..250 {
                logger.log(LogLevel::Info, format!("thread {t} record {i}"));
            }
        }));
    }
    for producer in producers {
        producer.join().unwrap();
    }
    logger.shutdown();

    let lines = read_lines(&path);
    assert_eq!(lines.iter().filter(|l| l.contains("record")).count(), 1_000);
}

#[test]
fn pre_stamped_records_pass_through_submit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("server.log");

    let logger = Logger::new(path.clone(), LogLevel::Info);
    logger.submit(LogRecord::new(LogLevel::Info, "batched".into()));
    logger.submit(LogRecord::new(LogLevel::Debug, "filtered".into()));
    logger.shutdown();

    let lines = read_lines(&path);
    assert!(lines.iter().any(|l| l.ends_with("batched")));
    assert!(!lines.iter().any(|l| l.ends_with("filtered")));
}
