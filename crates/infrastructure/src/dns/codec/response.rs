use super::header::{DnsHeader, HEADER_SIZE};
use super::name::{name_pointer, read_name, skip_name, write_name};
use super::query::DnsQuery;
use super::{read_u16, write_u16, write_u32, WireError};
use ember_dns_domain::{Rcode, CACHE_TTL_SECS};
use std::fmt;
use std::net::Ipv4Addr;

/// Octets to skip between the answer NAME and its RDATA: TYPE, CLASS, TTL
/// and RDLENGTH.
const ANSWER_FIXED_FIELDS: usize = 10;
const RDATA_LEN: u16 = 4;

/// The single answer bound to a response: question fields mirrored into the
/// answer slot plus the resolved address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub name: String,
    pub rtype: u16,
    pub rclass: u16,
    pub ttl: u32,
    pub rdlength: u16,
    pub address: Ipv4Addr,
}

/// A response to be emitted to a client, or one parsed from the upstream
/// resolver. Error responses carry no record and emit as a bare header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsResponse {
    header: DnsHeader,
    record: Option<ResponseRecord>,
}

impl DnsResponse {
    /// Header-only error response echoing the offending request id.
    pub fn error(rcode: Rcode, id: u16) -> DnsResponse {
        DnsResponse {
            header: DnsHeader {
                id,
                qr: 1,
                rcode: rcode as u8,
                ..DnsHeader::default()
            },
            record: None,
        }
    }

    /// Successful response binding `address` to the query's question.
    pub fn answer(query: &DnsQuery, address: Ipv4Addr) -> DnsResponse {
        let question = query.record();
        DnsResponse {
            header: DnsHeader {
                id: query.id(),
                qr: 1,
                rcode: Rcode::NoError as u8,
                qdcount: 1,
                ancount: 1,
                ..DnsHeader::default()
            },
            record: Some(ResponseRecord {
                name: question.name.clone(),
                rtype: question.qtype,
                rclass: question.qclass,
                ttl: CACHE_TTL_SECS as u32,
                rdlength: RDATA_LEN,
                address,
            }),
        }
    }

    /// Parses a reply from the forward server: header checks, the question
    /// section, then exactly one answer whose NAME may be a compression
    /// pointer or an in-line name. Only the first 4 RDATA octets are read;
    /// the wire TTL is discarded in favor of the fixed cache TTL, and the
    /// counts are normalized to the single answer that will be re-emitted.
    pub fn parse(packet: &[u8]) -> Result<DnsResponse, WireError> {
        let header = DnsHeader::parse(packet)?;
        if header.id == 0 {
            return Err(WireError::ZeroId);
        }
        if header.qr != 1 {
            return Err(WireError::NotAResponse);
        }
        if Rcode::from_wire(header.rcode) != Some(Rcode::NoError) {
            return Err(WireError::ErrorRcode(header.rcode));
        }
        if header.ancount == 0 {
            return Err(WireError::NoAnswers);
        }

        let (name, pos) = read_name(packet, HEADER_SIZE)?;
        if name.is_empty() {
            return Err(WireError::EmptyName);
        }
        let rtype = read_u16(packet, pos)?;
        let rclass = read_u16(packet, pos + 2)?;

        let answer = skip_name(packet, pos + 4)?;
        let rdata = answer + ANSWER_FIXED_FIELDS;
        let octets = packet
            .get(rdata..rdata + RDATA_LEN as usize)
            .ok_or(WireError::Truncated(packet.len()))?;
        let address = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);

        Ok(DnsResponse {
            header: DnsHeader {
                id: header.id,
                qr: 1,
                rcode: Rcode::NoError as u8,
                qdcount: 1,
                ancount: 1,
                ..DnsHeader::default()
            },
            record: Some(ResponseRecord {
                name,
                rtype,
                rclass,
                ttl: CACHE_TTL_SECS as u32,
                rdlength: RDATA_LEN,
                address,
            }),
        })
    }

    /// Emits the wire form. The answer NAME is a compression pointer to the
    /// question name directly after the header.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + 32);
        self.header.emit(&mut buf);
        if let Some(record) = &self.record {
            write_name(&mut buf, &record.name);
            write_u16(&mut buf, record.rtype);
            write_u16(&mut buf, record.rclass);

            write_u16(&mut buf, name_pointer(HEADER_SIZE as u8));
            write_u16(&mut buf, record.rtype);
            write_u16(&mut buf, record.rclass);
            write_u32(&mut buf, record.ttl);
            write_u16(&mut buf, record.rdlength);
            buf.extend_from_slice(&record.address.octets());
        }
        buf
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    pub fn rcode(&self) -> u8 {
        self.header.rcode
    }

    pub fn header(&self) -> &DnsHeader {
        &self.header
    }

    pub fn answer_record(&self) -> Option<&ResponseRecord> {
        self.record.as_ref()
    }
}

impl fmt::Display for DnsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(record) => write!(
                f,
                "response id={:#06x} name={} type={} class={} ttl={} rdata={}",
                self.header.id, record.name, record.rtype, record.rclass, record.ttl, record.address
            ),
            None => write!(
                f,
                "response id={:#06x} rcode={} (no answer)",
                self.header.id, self.header.rcode
            ),
        }
    }
}
