pub mod handler;
pub mod listener;
pub mod upstream;

pub use listener::UdpListener;

use crate::dns::codec::MAX_MESSAGE_SIZE;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

/// Everything a worker needs to serve one request. The buffer is an owned
/// copy of the datagram; the listener's receive buffer is never shared with
/// workers.
pub struct RequestData {
    /// The listen socket, used only to send the reply.
    pub socket: Arc<UdpSocket>,
    pub buffer: Box<[u8; MAX_MESSAGE_SIZE]>,
    pub len: usize,
    pub client: SocketAddr,
    pub upstream: SocketAddr,
}

impl RequestData {
    pub fn datagram(&self) -> &[u8] {
        &self.buffer[..self.len]
    }
}
