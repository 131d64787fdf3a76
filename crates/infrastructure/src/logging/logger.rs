//! Asynchronous file log sink.
//!
//! Producers enqueue records into the lock-free queue and unpark the single
//! consumer thread; they never touch file I/O. The consumer appends one
//! formatted line per record. A write failure is reported on stdout and
//! drops that record only.

use crate::sync::LockFreeQueue;
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle, Thread};
use std::time::Duration;

const PROJECT_NAME: &str = "ember-dns";
const SEPARATOR: &str = " - ";
const CONSUMER_PARK_TIMEOUT: Duration = Duration::from_millis(50);

/// Severity, most to least severe. A configured level admits records whose
/// level index is less than or equal to it, so `Warning` admits only
/// warnings and `Debug` admits everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Warning = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<LogLevel, String> {
        match s.to_ascii_lowercase().as_str() {
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// One record, owned by the producer until enqueued.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: String) -> LogRecord {
        LogRecord {
            level,
            message,
            timestamp: Utc::now(),
        }
    }
}

pub struct Logger {
    queue: Arc<LockFreeQueue<LogRecord>>,
    keep_processing: Arc<AtomicBool>,
    consumer: Mutex<Option<JoinHandle<()>>>,
    consumer_thread: Thread,
    level: LogLevel,
    path: PathBuf,
}

impl Logger {
    /// Spawns the consumer thread and returns the sink. Prefer the global
    /// accessors below outside of tests.
    pub fn new(path: PathBuf, level: LogLevel) -> Logger {
        let queue = Arc::new(LockFreeQueue::new());
        let keep_processing = Arc::new(AtomicBool::new(true));

        let consumer_queue = Arc::clone(&queue);
        let consumer_keep = Arc::clone(&keep_processing);
        let consumer_path = path.clone();
        let handle = thread::Builder::new()
            .name("log-sink".into())
            .spawn(move || consume(&consumer_queue, &consumer_keep, &consumer_path))
            .expect("failed to spawn log consumer thread");
        let consumer_thread = handle.thread().clone();

        Logger {
            queue,
            keep_processing,
            consumer: Mutex::new(Some(handle)),
            consumer_thread,
            level,
            path,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Non-blocking: stamps the message and hands it to the consumer. The
    /// record is also forwarded to `tracing` for stdout diagnostics.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.submit(LogRecord::new(level, message.into()));
    }

    /// Enqueues an already-stamped record, subject to level admission.
    pub fn submit(&self, record: LogRecord) {
        if record.level > self.level {
            return;
        }
        match record.level {
            LogLevel::Warning => tracing::warn!("{}", record.message),
            LogLevel::Error => tracing::error!("{}", record.message),
            LogLevel::Info => tracing::info!("{}", record.message),
            LogLevel::Debug => tracing::debug!("{}", record.message),
        }
        self.queue.enqueue(record);
        self.consumer_thread.unpark();
    }

    /// Stops the consumer and drains every admitted record: clears the run
    /// flag, enqueues a final wake-up record, joins the consumer, then
    /// writes anything that slipped in during the join. Idempotent.
    pub fn shutdown(&self) {
        let handle = match self.consumer.lock() {
            Ok(mut consumer) => consumer.take(),
            Err(_) => None,
        };
        let Some(handle) = handle else { return };

        self.keep_processing.store(false, Ordering::Release);
        self.submit(LogRecord::new(LogLevel::Info, "logger shutdown".into()));
        self.consumer_thread.unpark();
        let _ = handle.join();

        let mut file = None;
        while let Some(record) = self.queue.dequeue() {
            write_record(&mut file, &self.path, &record);
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn consume(queue: &LockFreeQueue<LogRecord>, keep_processing: &AtomicBool, path: &Path) {
    let mut file = None;
    while keep_processing.load(Ordering::Acquire) {
        match queue.dequeue() {
            Some(record) => write_record(&mut file, path, &record),
            None => thread::park_timeout(CONSUMER_PARK_TIMEOUT),
        }
    }
    while let Some(record) = queue.dequeue() {
        write_record(&mut file, path, &record);
    }
}

fn write_record(file: &mut Option<File>, path: &Path, record: &LogRecord) {
    if file.is_none() {
        match OpenOptions::new().append(true).create(true).open(path) {
            Ok(opened) => *file = Some(opened),
            Err(e) => {
                println!("logger: failed to open {}: {e}", path.display());
                return;
            }
        }
    }
    if let Some(out) = file {
        if let Err(e) = out.write_all(format_record(record).as_bytes()) {
            println!("logger: failed to write {}: {e}", path.display());
            // Reopen on the next record.
            *file = None;
        }
    }
}

fn format_record(record: &LogRecord) -> String {
    format!(
        "{}{SEPARATOR}{PROJECT_NAME}{SEPARATOR}{}{SEPARATOR}{}\n",
        record.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
        record.level,
        record.message,
    )
}

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Installs the process-wide sink. A no-op if a sink already exists (the
/// first caller wins, including a lazy default).
pub fn init(path: PathBuf, level: LogLevel) {
    let _ = GLOBAL.set(Logger::new(path, level));
}

/// The process-wide sink, lazily created with defaults on first use.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(|| Logger::new(PathBuf::from("ember-dns.log"), LogLevel::Debug))
}

pub fn warning(message: impl Into<String>) {
    global().log(LogLevel::Warning, message);
}

pub fn error(message: impl Into<String>) {
    global().log(LogLevel::Error, message);
}

pub fn info(message: impl Into<String>) {
    global().log(LogLevel::Info, message);
}

pub fn debug(message: impl Into<String>) {
    global().log(LogLevel::Debug, message);
}

/// Drains the process-wide sink. Called once during graceful teardown.
pub fn shutdown() {
    if let Some(logger) = GLOBAL.get() {
        logger.shutdown();
    }
}
