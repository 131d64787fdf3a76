//! Per-request exchange with the forward server.

use crate::dns::codec::MAX_MESSAGE_SIZE;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

/// Receive timeout on the upstream socket; the only timeout in the request
/// path.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends `query` to `upstream` from a fresh ephemeral-port socket and
/// returns the single reply datagram. The socket is closed when this
/// returns, success or not.
pub fn exchange(query: &[u8], upstream: SocketAddr) -> io::Result<Vec<u8>> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.set_read_timeout(Some(UPSTREAM_TIMEOUT))?;
    socket.send_to(query, upstream)?;

    let mut buf = [0u8; MAX_MESSAGE_SIZE];
    let (len, from) = socket.recv_from(&mut buf)?;
    if from.ip() != upstream.ip() {
        tracing::warn!(
            expected = %upstream,
            received_from = %from,
            "upstream reply from unexpected source"
        );
    }
    Ok(buf[..len].to_vec())
}
