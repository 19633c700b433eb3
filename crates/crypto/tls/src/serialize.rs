//! Wire encoding/decoding of the record header, per §6:
//!
//! ```text
//! TLS:  ContentType(1) ProtocolVersion(2) length(2)
//! DTLS: ContentType(1) ProtocolVersion(2) epoch(2) sequence_number(6) length(2)
//! ```

use crate::record::{CipherText, SequenceMeta};

/// The header fields of a wire record, decoded but not yet validated.
#[derive(Clone, Copy, Debug)]
pub struct ParsedHeader {
    pub content_type_raw: u8,
    pub version_raw: [u8; 2],
    pub epoch: Option<u16>,
    pub sequence: Option<u64>,
    pub length: u16,
}

/// Serializes a `CipherText` to wire bytes: header followed by payload.
#[must_use]
pub fn serialize(cipher_text: &CipherText) -> Vec<u8> {
    let mut out = Vec::with_capacity(13 + cipher_text.payload.len());
    out.push(cipher_text.content_type.into());
    out.push(cipher_text.version.major);
    out.push(cipher_text.version.minor);

    if let SequenceMeta::Dtls { epoch, sequence } = cipher_text.meta {
        out.extend_from_slice(&epoch.to_be_bytes());
        // 48-bit explicit sequence number: low 6 bytes of the 64-bit counter.
        out.extend_from_slice(&sequence.to_be_bytes()[2..8]);
    }

    out.extend_from_slice(&(cipher_text.payload.len() as u16).to_be_bytes());
    out.extend_from_slice(&cipher_text.payload);
    out
}

/// Parses a record header (as produced by [`crate::framer::Framer`]) into its fields. Does not
/// validate field values; see [`crate::validate`].
#[must_use]
pub fn parse_header(header: &[u8], is_dtls: bool) -> ParsedHeader {
    let content_type_raw = header[0];
    let version_raw = [header[1], header[2]];

    if is_dtls {
        let epoch = u16::from_be_bytes([header[3], header[4]]);
        let mut sequence_bytes = [0u8; 8];
        sequence_bytes[2..8].copy_from_slice(&header[5..11]);
        let sequence = u64::from_be_bytes(sequence_bytes);
        let length = u16::from_be_bytes([header[11], header[12]]);

        ParsedHeader {
            content_type_raw,
            version_raw,
            epoch: Some(epoch),
            sequence: Some(sequence),
            length,
        }
    } else {
        let length = u16::from_be_bytes([header[3], header[4]]);
        ParsedHeader {
            content_type_raw,
            version_raw,
            epoch: None,
            sequence: None,
            length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content_type::ContentType, version::ProtocolVersion};

    #[test]
    fn tls_header_matches_scenario_s1() {
        // S1 — TLS null-null round-trip: on_send_to_transport expects
        // `17 03 03 00 05` followed by `68 65 6c 6c 6f` ("hello").
        let cipher_text = CipherText::new(
            ContentType::ApplicationData,
            ProtocolVersion::TLS_1_2,
            SequenceMeta::Tls { sequence: 0 },
            b"hello".to_vec(),
        );

        let wire = serialize(&cipher_text);
        assert_eq!(wire, [0x17, 0x03, 0x03, 0x00, 0x05, 0x68, 0x65, 0x6c, 0x6c, 0x6f]);

        let header = parse_header(&wire[..5], false);
        assert_eq!(header.content_type_raw, 23);
        assert_eq!(header.version_raw, [3, 3]);
        assert_eq!(header.length, 5);
        assert!(header.epoch.is_none());
    }

    #[test]
    fn dtls_header_round_trips_epoch_and_explicit_sequence() {
        let meta = SequenceMeta::Dtls { epoch: 1, sequence: 42 };
        let cipher_text = CipherText::new(
            ContentType::Handshake,
            ProtocolVersion::DTLS_1_2,
            meta,
            vec![0xAA; 4],
        );

        let wire = serialize(&cipher_text);
        assert_eq!(wire.len(), 13 + 4);

        let header = parse_header(&wire[..13], true);
        assert_eq!(header.content_type_raw, 22);
        assert_eq!(header.version_raw, [254, 253]);
        assert_eq!(header.epoch, Some(1));
        assert_eq!(header.sequence, Some(42));
        assert_eq!(header.length, 4);
    }
}
