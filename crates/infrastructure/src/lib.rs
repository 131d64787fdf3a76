pub mod dns;
pub mod logging;
pub mod server;
pub mod sync;

pub use dns::DnsCache;
pub use server::UdpListener;
pub use sync::{LockFreeQueue, ThreadPool};
