use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

/// Upstream resolver used when none is given on the command line.
pub const DEFAULT_UPSTREAM: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 53));

/// Runtime configuration assembled by the CLI crate.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// UDP port the listener binds on 0.0.0.0.
    pub port: u16,
    /// Hosts file the cache hydrates from and may persist to.
    pub hosts_path: PathBuf,
    /// Resolver that cache misses are forwarded to.
    pub upstream: SocketAddr,
    /// Worker-pool size override; `None` means one worker per core.
    pub workers: Option<usize>,
}

impl ServerConfig {
    pub fn new(port: u16, hosts_path: PathBuf, upstream: SocketAddr) -> Self {
        ServerConfig {
            port,
            hosts_path,
            upstream,
            workers: None,
        }
    }
}
