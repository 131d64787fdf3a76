use super::header::{DnsHeader, HEADER_SIZE};
use super::name::{read_name, write_name};
use super::{read_u16, write_u16};
use ember_dns_domain::{query_shape_supported, DnsError, Opcode};
use std::fmt;

/// The question section of an accepted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    /// Queried domain, lowercased, labels joined with `.`.
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

/// A parsed client query. Construction validates the whole acceptance
/// contract, so a `DnsQuery` value is always answerable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    header: DnsHeader,
    record: QueryRecord,
}

impl DnsQuery {
    /// Parses and validates a client datagram.
    ///
    /// FORMAT: zero id, QR set, or a malformed question section.
    /// NOTIMPL: qdcount != 1, a non-standard opcode, or a QTYPE/QCLASS
    /// outside {A, ANY} x {IN, ANY}.
    pub fn parse(packet: &[u8]) -> Result<DnsQuery, DnsError> {
        let header = DnsHeader::parse(packet).map_err(|_| DnsError::Format { id: 0 })?;
        if header.id == 0 || header.qr != 0 {
            return Err(DnsError::Format { id: header.id });
        }

        let (name, pos) =
            read_name(packet, HEADER_SIZE).map_err(|_| DnsError::Format { id: header.id })?;
        let qtype = read_u16(packet, pos).map_err(|_| DnsError::Format { id: header.id })?;
        let qclass = read_u16(packet, pos + 2).map_err(|_| DnsError::Format { id: header.id })?;

        let supported = header.qdcount == 1
            && header.opcode == Opcode::Standard as u8
            && query_shape_supported(qtype, qclass);
        if !supported {
            return Err(DnsError::NotImplemented { id: header.id });
        }

        Ok(DnsQuery {
            header,
            record: QueryRecord {
                name,
                qtype,
                qclass,
            },
        })
    }

    /// Re-emits the query for the upstream leg. The additional section is
    /// dropped; the header otherwise round-trips.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.record.name.len() + 6);
        let mut header = self.header;
        header.arcount = 0;
        header.emit(&mut buf);
        write_name(&mut buf, &self.record.name);
        write_u16(&mut buf, self.record.qtype);
        write_u16(&mut buf, self.record.qclass);
        buf
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn header(&self) -> &DnsHeader {
        &self.header
    }

    pub fn record(&self) -> &QueryRecord {
        &self.record
    }
}

impl fmt::Display for DnsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "query id={:#06x} qname={} qtype={} qclass={} rd={}",
            self.header.id, self.record.name, self.record.qtype, self.record.qclass, self.header.rd
        )
    }
}
