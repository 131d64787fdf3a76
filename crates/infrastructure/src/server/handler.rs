//! Per-request state machine: parse, cache lookup, forward-or-serve,
//! reply. Errors of any kind collapse to a header-only response carrying
//! the classified RCODE and the original id.

use super::upstream;
use super::RequestData;
use crate::dns::codec::{DnsQuery, DnsResponse};
use crate::dns::{unix_time_secs, DnsCache};
use crate::logging::{self, LogLevel, LogRecord};
use ember_dns_domain::{DnsEntry, DnsError};
use std::net::{Ipv4Addr, SocketAddr};

/// Entry point executed on a pool worker. Never panics on protocol or I/O
/// failures; every outcome ends with at most one datagram to the client.
pub fn handle_request(data: RequestData, cache: &DnsCache) {
    let mut log = RequestLog::new(&data);
    match process(&data, cache, &mut log) {
        Ok(reply) => {
            if let Err(e) = data.socket.send_to(&reply, data.client) {
                log.error(format!("failed to send response to client: {e}"));
            }
        }
        Err(err) => {
            log.error(format!("request failed: {err}"));
            let reply = DnsResponse::error(err.rcode(), err.id()).encode();
            if let Err(e) = data.socket.send_to(&reply, data.client) {
                log.error(format!("failed to send error response to client: {e}"));
            }
        }
    }
}

fn process(
    data: &RequestData,
    cache: &DnsCache,
    log: &mut RequestLog,
) -> Result<Vec<u8>, DnsError> {
    let query = DnsQuery::parse(data.datagram())?;
    log.debug(query.to_string());

    let now = unix_time_secs();
    match cache.lookup(query.name()) {
        Some(entry) if entry.is_fresh(now) => {
            log.info("serving entry from cache");
            let address = cached_address(&entry, query.id())?;
            Ok(DnsResponse::answer(&query, address).encode())
        }
        _ => {
            log.info("resolving entry via forward server");
            let response = forward(&query, data.upstream)?;
            log.debug(response.to_string());

            let record = response
                .answer_record()
                .ok_or_else(|| DnsError::ServerFailure {
                    id: query.id(),
                    detail: "forward server reply carried no usable answer".into(),
                })?;
            cache.upsert(
                record.name.clone(),
                DnsEntry::resolved(record.address.to_string(), now),
            );
            Ok(response.encode())
        }
    }
}

fn forward(query: &DnsQuery, upstream_addr: SocketAddr) -> Result<DnsResponse, DnsError> {
    let reply = upstream::exchange(&query.encode(), upstream_addr).map_err(|e| {
        DnsError::ServerFailure {
            id: query.id(),
            detail: format!("forward server exchange failed: {e}"),
        }
    })?;
    DnsResponse::parse(&reply).map_err(|e| DnsError::ServerFailure {
        id: query.id(),
        detail: format!("invalid reply from forward server: {e}"),
    })
}

fn cached_address(entry: &DnsEntry, id: u16) -> Result<Ipv4Addr, DnsError> {
    entry
        .address
        .parse()
        .map_err(|_| DnsError::ServerFailure {
            id,
            detail: format!("cached address {:?} is not an IPv4 address", entry.address),
        })
}

/// Collects a request's log records and flushes them as one contiguous
/// batch, headed by the arrival record, when the request is done.
struct RequestLog {
    client: SocketAddr,
    size: usize,
    pending: Vec<LogRecord>,
}

impl RequestLog {
    fn new(data: &RequestData) -> RequestLog {
        RequestLog {
            client: data.client,
            size: data.len,
            pending: Vec::new(),
        }
    }

    fn debug(&mut self, message: String) {
        self.pending.push(LogRecord::new(LogLevel::Debug, message));
    }

    fn info(&mut self, message: impl Into<String>) {
        self.pending
            .push(LogRecord::new(LogLevel::Info, message.into()));
    }

    fn error(&mut self, message: String) {
        self.pending.push(LogRecord::new(LogLevel::Error, message));
    }
}

impl Drop for RequestLog {
    fn drop(&mut self) {
        logging::info(format!(
            "received request from {}, size: {}",
            self.client, self.size
        ));
        let sink = logging::global();
        for record in self.pending.drain(..) {
            sink.submit(record);
        }
    }
}
