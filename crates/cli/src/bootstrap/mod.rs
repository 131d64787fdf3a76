mod logging;
mod signals;

pub use logging::init_logging;
pub use signals::{install_signal_handlers, shutdown_flag};
