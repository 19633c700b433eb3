//! Protocol version field, shared by TLS and DTLS records.

use crate::{
    encoding::{self, Cursor, Decoding, Encoding},
    error::TLSError,
};

/// `(major, minor)` as carried on the wire. Fixed values only; this implementation does not
/// negotiate a version, it only ever speaks 1.2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    pub const TLS_1_2: Self = Self {
        major: 3,
        minor: 3,
    };

    pub const DTLS_1_2: Self = Self {
        major: 254,
        minor: 253,
    };

    /// Legacy DTLS 1.0. Never acted upon: recognized only so that a peer offering it can be
    /// rejected with a `protocol_version` alert rather than a generic decode error.
    pub const DTLS_1_0_LEGACY: Self = Self {
        major: 254,
        minor: 255,
    };

    #[must_use]
    pub const fn is_dtls(self) -> bool {
        self.major == 254
    }
}

impl Encoding for ProtocolVersion {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.push(self.major);
        bytes.push(self.minor);
    }
}

impl<'a> Decoding<'a> for ProtocolVersion {
    fn decode(cursor: &mut Cursor<'a>) -> encoding::Result<Self> {
        let major = cursor.decode()?;
        let minor = cursor.decode()?;
        Ok(Self { major, minor })
    }
}

impl TryFrom<[u8; 2]> for ProtocolVersion {
    type Error = TLSError;

    fn try_from(value: [u8; 2]) -> Result<Self, Self::Error> {
        let version = Self {
            major: value[0],
            minor: value[1],
        };

        match version {
            Self::TLS_1_2 | Self::DTLS_1_2 => Ok(version),
            _ => {
                log::warn!("Unsupported protocol version: {value:?}");
                Err(TLSError::UnsupportedProtocolVersion)
            },
        }
    }
}
