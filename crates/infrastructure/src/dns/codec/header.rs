use super::{read_u16, write_u16, WireError};

/// Fixed wire size of the DNS header.
pub const HEADER_SIZE: usize = 12;

/// RFC 1035 §4.1.1 header. Flag fields hold the already-shifted values; the
/// reserved Z field is neither read nor written and stays zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub qr: u8,
    pub opcode: u8,
    pub aa: u8,
    pub tc: u8,
    pub rd: u8,
    pub ra: u8,
    pub z: u8,
    pub rcode: u8,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl DnsHeader {
    pub const MASK_QR: u16 = 0x8000;
    pub const MASK_OPCODE: u16 = 0x7800;
    pub const MASK_AA: u16 = 0x0400;
    pub const MASK_TC: u16 = 0x0200;
    pub const MASK_RD: u16 = 0x0100;
    pub const MASK_RA: u16 = 0x0080;
    pub const MASK_Z: u16 = 0x0070;
    pub const MASK_RCODE: u16 = 0x000F;

    pub fn parse(buf: &[u8]) -> Result<DnsHeader, WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::Truncated(buf.len()));
        }
        let flags = read_u16(buf, 2)?;
        Ok(DnsHeader {
            id: read_u16(buf, 0)?,
            qr: ((flags & Self::MASK_QR) >> 15) as u8,
            opcode: ((flags & Self::MASK_OPCODE) >> 11) as u8,
            aa: ((flags & Self::MASK_AA) >> 10) as u8,
            tc: ((flags & Self::MASK_TC) >> 9) as u8,
            rd: ((flags & Self::MASK_RD) >> 8) as u8,
            ra: ((flags & Self::MASK_RA) >> 7) as u8,
            z: 0,
            rcode: (flags & Self::MASK_RCODE) as u8,
            qdcount: read_u16(buf, 4)?,
            ancount: read_u16(buf, 6)?,
            nscount: read_u16(buf, 8)?,
            arcount: read_u16(buf, 10)?,
        })
    }

    pub fn emit(&self, buf: &mut Vec<u8>) {
        write_u16(buf, self.id);
        let flags = (u16::from(self.qr) << 15)
            | (u16::from(self.opcode) << 11)
            | (u16::from(self.aa) << 10)
            | (u16::from(self.tc) << 9)
            | (u16::from(self.rd) << 8)
            | (u16::from(self.ra) << 7)
            | u16::from(self.rcode);
        write_u16(buf, flags);
        write_u16(buf, self.qdcount);
        write_u16(buf, self.ancount);
        write_u16(buf, self.nscount);
        write_u16(buf, self.arcount);
    }
}
