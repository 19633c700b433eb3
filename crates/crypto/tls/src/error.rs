//! Error kinds produced by the record protocol core.

use std::fmt;

use crate::alert::{Description, Severity};

/// Errors the record protocol core can raise.
///
/// Silent-drop conditions (DTLS replay, wrong epoch) are *not* represented here:
/// they never escape the core, see [`crate::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TLSError {
    /// A message could not be serialized (oversize payload, wrong buffer size).
    Serialize,

    /// Incoming bytes did not parse as a valid record (bad version, length, content type).
    Deserialize,

    /// The underlying cipher or MAC primitive reported a failure.
    CryptoFailure,

    /// Integrity check failed. Surfaced to the peer as fatal `bad_record_mac`.
    MacMismatch,

    /// An incoming record exceeded the maximum ciphertext size. Surfaced as fatal `record_overflow`.
    RecordOverflow,

    /// A content type appeared where it is not currently allowed.
    UnexpectedMessage,

    /// The effective plaintext budget was non-positive, or a sequence counter was exhausted.
    ConfigurationError,

    UnknownContentType,
    UnknownCipherSuite,
    UnknownCompressionMethod,
    UnsupportedProtocolVersion,
    BadMessage,
}

impl TLSError {
    /// The fatal alert this error maps to, if sending one is appropriate.
    ///
    /// Per spec, `MacMismatch`, `RecordOverflow` and `UnexpectedMessage` always produce a
    /// matching fatal alert; the remainder are reported back to the caller without one.
    #[must_use]
    pub fn fatal_alert(self) -> Option<(Severity, Description)> {
        match self {
            Self::MacMismatch => Some((Severity::Fatal, Description::BadRecordMAC)),
            Self::RecordOverflow => Some((Severity::Fatal, Description::RecordOverflow)),
            Self::UnexpectedMessage => Some((Severity::Fatal, Description::UnexpectedMessage)),
            Self::Deserialize | Self::UnknownContentType | Self::BadMessage => {
                Some((Severity::Fatal, Description::DecodeError))
            },
            Self::UnsupportedProtocolVersion => {
                Some((Severity::Fatal, Description::ProtocolVersion))
            },
            Self::UnknownCipherSuite | Self::UnknownCompressionMethod => {
                Some((Severity::Fatal, Description::HandshakeFailure))
            },
            Self::CryptoFailure => Some((Severity::Fatal, Description::InternalError)),
            Self::Serialize | Self::ConfigurationError => None,
        }
    }
}

impl fmt::Display for TLSError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for TLSError {}

impl From<std::io::Error> for TLSError {
    fn from(_: std::io::Error) -> Self {
        Self::Deserialize
    }
}
