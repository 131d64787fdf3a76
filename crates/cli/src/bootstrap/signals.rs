//! Shutdown signal handling. The handler only flips a flag; the listener
//! loop observes it and returns, so destructors (cache persistence, logger
//! drain) run on the normal exit path.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_shutdown(_sig: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

pub fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN
}

pub fn install_signal_handlers() -> anyhow::Result<()> {
    for sig in [libc::SIGINT, libc::SIGTERM] {
        let previous = unsafe { libc::signal(sig, handle_shutdown as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            anyhow::bail!("failed to install handler for signal {sig}");
        }
    }
    Ok(())
}
