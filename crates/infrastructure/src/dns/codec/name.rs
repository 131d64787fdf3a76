//! QNAME encoding and decoding: length-prefixed labels terminated by a zero
//! octet. The compression-pointer form is only recognized in the answer NAME
//! slot of upstream responses.

use super::WireError;

pub const MAX_LABEL_LEN: usize = 63;
/// Encoded name cap, including the terminating zero octet.
pub const MAX_NAME_LEN: usize = 255;
/// Top two bits of a length octet select the pointer form.
pub const POINTER_TAG: u8 = 0xC0;

/// Decodes the label sequence starting at `pos`. Labels are lowercased and
/// joined with `.`; returns the name and the offset just past the
/// terminating zero octet.
pub fn read_name(buf: &[u8], mut pos: usize) -> Result<(String, usize), WireError> {
    let mut name = String::new();
    let mut encoded_len = 0usize;
    loop {
        let len_octet = *buf.get(pos).ok_or(WireError::Truncated(pos))?;
        pos += 1;
        encoded_len += 1;
        if len_octet == 0 {
            break;
        }
        if len_octet & POINTER_TAG == POINTER_TAG {
            return Err(WireError::InvalidLabel(len_octet));
        }
        let len = len_octet as usize;
        if len > MAX_LABEL_LEN {
            return Err(WireError::InvalidLabel(len_octet));
        }
        encoded_len += len;
        if encoded_len > MAX_NAME_LEN {
            return Err(WireError::NameTooLong);
        }
        let label = buf
            .get(pos..pos + len)
            .ok_or(WireError::Truncated(buf.len()))?;
        if !name.is_empty() {
            name.push('.');
        }
        for &octet in label {
            name.push(octet.to_ascii_lowercase() as char);
        }
        pos += len;
    }
    Ok((name, pos))
}

/// Encodes `name` as labels split on `.` plus the terminating zero octet.
/// Callers pass names that came through `read_name` or the hosts file.
pub fn write_name(buf: &mut Vec<u8>, name: &str) {
    if !name.is_empty() {
        for label in name.split('.') {
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
    }
    buf.push(0);
}

/// Skips the NAME slot of an answer section: either a two-octet compression
/// pointer or an in-line label sequence. Returns the offset just past it.
pub fn skip_name(buf: &[u8], pos: usize) -> Result<usize, WireError> {
    let first = *buf.get(pos).ok_or(WireError::Truncated(pos))?;
    if first & POINTER_TAG == POINTER_TAG {
        if pos + 2 > buf.len() {
            return Err(WireError::Truncated(buf.len()));
        }
        return Ok(pos + 2);
    }
    let (_, next) = read_name(buf, pos)?;
    Ok(next)
}

/// Two-octet compression pointer to the name at `offset` from the start of
/// the message.
pub fn name_pointer(offset: u8) -> u16 {
    0xC000 | u16::from(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(name: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        write_name(&mut buf, name);
        buf
    }

    #[test]
    fn encodes_labels_with_length_prefixes() {
        assert_eq!(
            encode("example.com"),
            [
                &[7u8][..],
                b"example",
                &[3],
                b"com",
                &[0],
            ]
            .concat()
        );
    }

    #[test]
    fn round_trips_a_name() {
        let buf = encode("intranet.local");
        let (name, next) = read_name(&buf, 0).unwrap();
        assert_eq!(name, "intranet.local");
        assert_eq!(next, buf.len());
    }

    #[test]
    fn decoding_lowercases_labels() {
        let buf = encode("ExAmPle.COM");
        let (name, _) = read_name(&buf, 0).unwrap();
        assert_eq!(name, "example.com");
    }

    #[test]
    fn rejects_label_longer_than_63_octets() {
        let mut buf = vec![64u8];
        buf.extend_from_slice(&[b'a'; 64]);
        buf.push(0);
        assert_eq!(read_name(&buf, 0), Err(WireError::InvalidLabel(64)));
    }

    #[test]
    fn rejects_compression_pointer_in_a_question_name() {
        let buf = [0xC0u8, 0x0C];
        assert_eq!(read_name(&buf, 0), Err(WireError::InvalidLabel(0xC0)));
    }

    #[test]
    fn rejects_name_longer_than_255_octets() {
        // Five 62-octet labels encode to 5 * 63 + 1 = 316 octets.
        let long = vec!["a".repeat(62); 5].join(".");
        let buf = encode(&long);
        assert!(matches!(read_name(&buf, 0), Err(WireError::NameTooLong)));
    }

    #[test]
    fn rejects_truncated_label() {
        let buf = [5u8, b'a', b'b'];
        assert!(matches!(read_name(&buf, 0), Err(WireError::Truncated(_))));
    }

    #[test]
    fn rejects_missing_terminator() {
        let buf = [1u8, b'a'];
        assert!(matches!(read_name(&buf, 0), Err(WireError::Truncated(_))));
    }

    #[test]
    fn skip_name_handles_both_forms() {
        // Pointer form.
        let buf = [0xC0u8, 0x0C, 0xFF];
        assert_eq!(skip_name(&buf, 0).unwrap(), 2);
        // In-line form.
        let buf = encode("example.com");
        assert_eq!(skip_name(&buf, 0).unwrap(), buf.len());
    }

    #[test]
    fn pointer_to_the_question_name() {
        assert_eq!(name_pointer(12), 0xC00C);
    }
}
