use ember_dns_infrastructure::logging::{self, LogLevel};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Installs the stdout diagnostics subscriber and the asynchronous file
/// sink. The file sink applies the exact WARNING>ERROR>INFO>DEBUG admission
/// order on its own; the tracing filter is the closest stdout equivalent.
pub fn init_logging(log_file: PathBuf, level: LogLevel) {
    let filter = match level {
        LogLevel::Warning => "warn",
        LogLevel::Error => "error",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    logging::init(log_file, level);
}
