pub mod logger;

pub use logger::{debug, error, global, info, init, shutdown, warning, LogLevel, LogRecord, Logger};
