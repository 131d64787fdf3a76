//! UDP listener: owns the listen socket, receives datagrams, hands owned
//! request snapshots to the worker pool. Never parses a datagram itself.

use super::{handler, RequestData};
use crate::dns::codec::MAX_MESSAGE_SIZE;
use crate::dns::DnsCache;
use crate::logging;
use crate::sync::ThreadPool;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How often the receive loop wakes to check the shutdown flag.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(500);

const RECV_BUFFER_SIZE: usize = 1 << 20;

pub struct UdpListener {
    socket: Arc<UdpSocket>,
    upstream: SocketAddr,
}

impl UdpListener {
    /// Binds 0.0.0.0:`port`. Port 0 binds an ephemeral port (used by the
    /// tests); `local_addr` reports the effective one.
    pub fn bind(port: u16, upstream: SocketAddr) -> io::Result<UdpListener> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_recv_buffer_size(RECV_BUFFER_SIZE)?;
        socket.bind(&addr.into())?;

        let socket: UdpSocket = socket.into();
        socket.set_read_timeout(Some(SHUTDOWN_POLL_INTERVAL))?;
        Ok(UdpListener {
            socket: Arc::new(socket),
            upstream,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive loop. Each datagram is copied into a fresh owned buffer and
    /// submitted to the pool; receive errors are logged and the loop keeps
    /// going. Returns once `shutdown` is observed set.
    pub fn run(&self, pool: &ThreadPool, cache: Arc<DnsCache>, shutdown: &AtomicBool) {
        let mut recv_buf = [0u8; MAX_MESSAGE_SIZE];
        while !shutdown.load(Ordering::Acquire) {
            match self.socket.recv_from(&mut recv_buf) {
                Ok((len, client)) => {
                    let mut buffer = Box::new([0u8; MAX_MESSAGE_SIZE]);
                    buffer[..len].copy_from_slice(&recv_buf[..len]);
                    let data = RequestData {
                        socket: Arc::clone(&self.socket),
                        buffer,
                        len,
                        client,
                        upstream: self.upstream,
                    };
                    let cache = Arc::clone(&cache);
                    pool.submit(move || handler::handle_request(data, &cache));
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    // Shutdown-poll tick, not a receive failure.
                }
                Err(e) => {
                    logging::error(format!("error receiving request: {e}"));
                }
            }
        }
    }
}
