//! Wire-level protocol vocabulary shared by the codec and the request
//! pipeline (RFC 1035 §4.1).

/// QTYPE for an A record.
pub const QTYPE_A: u16 = 0x01;
/// QTYPE wildcard (`*`).
pub const QTYPE_ANY: u16 = 0xFF;
/// QCLASS for the Internet class.
pub const QCLASS_IN: u16 = 0x01;
/// QCLASS wildcard.
pub const QCLASS_ANY: u16 = 0xFF;

/// TTL applied to every cached entry and every emitted answer, in seconds.
/// Upstream TTLs are deliberately not preserved.
pub const CACHE_TTL_SECS: u64 = 60;

/// 4-bit response code carried in the DNS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Rcode {
    NoError = 0,
    Format = 1,
    ServerFail = 2,
    NameError = 3,
    NotImpl = 4,
    Refused = 5,
}

impl Rcode {
    pub fn from_wire(value: u8) -> Option<Rcode> {
        match value {
            0 => Some(Rcode::NoError),
            1 => Some(Rcode::Format),
            2 => Some(Rcode::ServerFail),
            3 => Some(Rcode::NameError),
            4 => Some(Rcode::NotImpl),
            5 => Some(Rcode::Refused),
            _ => None,
        }
    }
}

/// 4-bit operation code. Only `Standard` queries are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Standard = 0,
    Reverse = 1,
    Status = 2,
}

/// True for the QTYPE/QCLASS combinations this server answers.
pub fn query_shape_supported(qtype: u16, qclass: u16) -> bool {
    matches!(qtype, QTYPE_A | QTYPE_ANY) && matches!(qclass, QCLASS_IN | QCLASS_ANY)
}
