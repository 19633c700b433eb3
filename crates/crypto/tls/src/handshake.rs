//! The bits of the Handshake sub-protocol the record layer needs to know about.
//!
//! The handshake state machine itself (ClientHello/ServerHello construction, key exchange,
//! certificate verification, ...) lives outside this crate. The record layer only needs to
//! recognize a handshake message's type byte, for two reasons: to decide whether an empty
//! handshake payload is malformed (§4.3 check 3), and to recognize a ClientHello so the DTLS
//! cookie-verify path can stash its sequence number (§4.3 checks 6-7).

use crate::enum_encoding;

enum_encoding!(
    /// TLS compression methods, [RFC 3749](https://www.rfc-editor.org/rfc/rfc3749).
    ///
    /// Only `None` is ever produced or accepted: the record layer's compression suite is the
    /// null identity (spec Non-goal), and TLS 1.3 removed the field entirely.
    pub enum CompressionMethod(u8) {
        None = 0x00,
    }
);

enum_encoding! {
    pub enum HandshakeType(u8) {
        HelloRequest = 0,
        ClientHello = 1,
        ServerHello = 2,
        HelloVerifyRequest = 3,
        Certificate = 11,
        ServerKeyExchange = 12,
        CertificateRequest = 13,
        ServerHelloDone = 14,
        CertificateVerify = 15,
        ClientKeyExchange = 16,
        Finished = 20,
        CertificateStatus = 22,
    }
}

/// Reads the one-byte [`HandshakeType`] tag off the front of a handshake message, without
/// taking ownership of or otherwise parsing the rest of the message.
///
/// Returns `None` if `payload` is empty or the first byte is not a known handshake type;
/// both are reported as `Fail`/`FatalUnexpectedMessage` by the validator, not decoded here.
#[must_use]
pub fn peek_handshake_type(payload: &[u8]) -> Option<HandshakeType> {
    use crate::encoding::{Cursor, Decoding};

    let mut cursor = Cursor::new(payload);
    cursor.decode().ok()
}

#[must_use]
pub fn is_client_hello(payload: &[u8]) -> bool {
    matches!(peek_handshake_type(payload), Some(HandshakeType::ClientHello))
}

#[must_use]
pub fn is_hello_message(payload: &[u8]) -> bool {
    matches!(
        peek_handshake_type(payload),
        Some(HandshakeType::ClientHello | HandshakeType::ServerHello | HandshakeType::HelloVerifyRequest)
    )
}
