//! The three record stage types and the sequence/epoch metadata that travels with them.
//!
//! `PlainText`, `CompressedText` and `CipherText` each carry a content type, protocol version,
//! a mutable payload buffer, and a snapshot of the sequence/epoch metadata in effect when they
//! were constructed. Stage transitions consume the previous stage by value and move the payload
//! into the new one; no stage is reused after that.

use crate::{content_type::ContentType, version::ProtocolVersion};

/// Per-direction sequence/epoch snapshot, frozen at record-construction time.
///
/// TLS tracks only an implicit 64-bit counter (never transmitted). DTLS additionally carries
/// the 16-bit epoch and transmits both on the wire as a 48-bit explicit sequence number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceMeta {
    Tls { sequence: u64 },
    Dtls { epoch: u16, sequence: u64 },
}

impl SequenceMeta {
    #[must_use]
    pub const fn is_dtls(self) -> bool {
        matches!(self, Self::Dtls { .. })
    }

    #[must_use]
    pub const fn sequence(self) -> u64 {
        match self {
            Self::Tls { sequence } | Self::Dtls { sequence, .. } => sequence,
        }
    }

    #[must_use]
    pub const fn epoch(self) -> u16 {
        match self {
            Self::Tls { .. } => 0,
            Self::Dtls { epoch, .. } => epoch,
        }
    }

    /// The 8-byte value used as the sequence-number field in MAC input and AEAD additional
    /// data: the raw 64-bit counter for TLS, or `epoch ‖ 48-bit explicit sequence` for DTLS.
    #[must_use]
    pub fn as_mac_sequence_bytes(self) -> [u8; 8] {
        match self {
            Self::Tls { sequence } => sequence.to_be_bytes(),
            Self::Dtls { epoch, sequence } => {
                let mut bytes = [0u8; 8];
                bytes[0..2].copy_from_slice(&epoch.to_be_bytes());
                // Low 48 bits of `sequence` are the explicit sequence number.
                bytes[2..8].copy_from_slice(&sequence.to_be_bytes()[2..8]);
                bytes
            },
        }
    }
}

macro_rules! record_stage {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name {
            pub content_type: ContentType,
            pub version: ProtocolVersion,
            pub meta: SequenceMeta,
            pub payload: Vec<u8>,
        }

        impl $name {
            #[must_use]
            pub fn new(
                content_type: ContentType,
                version: ProtocolVersion,
                meta: SequenceMeta,
                payload: Vec<u8>,
            ) -> Self {
                Self {
                    content_type,
                    version,
                    meta,
                    payload,
                }
            }
        }
    };
}

record_stage!(PlainText);
record_stage!(CompressedText);
record_stage!(CipherText);

impl PlainText {
    /// Consumes the `PlainText`, handing its metadata to the compression stage along with a
    /// freshly produced payload buffer.
    #[must_use]
    pub fn into_compressed(self, payload: Vec<u8>) -> CompressedText {
        CompressedText::new(self.content_type, self.version, self.meta, payload)
    }
}

impl CompressedText {
    #[must_use]
    pub fn into_cipher(self, payload: Vec<u8>) -> CipherText {
        CipherText::new(self.content_type, self.version, self.meta, payload)
    }
}

impl CipherText {
    #[must_use]
    pub fn into_compressed(self, payload: Vec<u8>) -> CompressedText {
        CompressedText::new(self.content_type, self.version, self.meta, payload)
    }
}

impl CompressedText {
    #[must_use]
    pub fn into_plain(self, payload: Vec<u8>) -> PlainText {
        PlainText::new(self.content_type, self.version, self.meta, payload)
    }
}

/// MAC input, as used by Null-MAC and non-AEAD (CBC+HMAC) suites:
/// `sequence(8) ‖ content_type(1) ‖ version(2) ‖ length(2) ‖ payload`.
#[must_use]
pub fn mac_input(content_type: ContentType, version: ProtocolVersion, meta: SequenceMeta, payload: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(13 + payload.len());
    input.extend_from_slice(&meta.as_mac_sequence_bytes());
    input.push(content_type.into());
    input.push(version.major);
    input.push(version.minor);
    input.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    input.extend_from_slice(payload);
    input
}

/// AEAD additional data, identical layout to the MAC input except the payload itself is not
/// included (it is authenticated by the AEAD tag instead).
#[must_use]
pub fn additional_data(
    content_type: ContentType,
    version: ProtocolVersion,
    meta: SequenceMeta,
    plaintext_len: usize,
) -> [u8; 13] {
    let mut input = [0u8; 13];
    input[0..8].copy_from_slice(&meta.as_mac_sequence_bytes());
    input[8] = content_type.into();
    input[9] = version.major;
    input[10] = version.minor;
    input[11..13].copy_from_slice(&(plaintext_len as u16).to_be_bytes());
    input
}
