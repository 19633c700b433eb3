//! TLS/DTLS 1.2 [RFC 5246](https://www.rfc-editor.org/rfc/rfc5246) /
//! [RFC 6347](https://www.rfc-editor.org/rfc/rfc6347) record protocol.
//!
//! This crate implements only the record layer: framing, fragmentation, compression,
//! bulk-encryption and the epoch/sequence/replay-window state machine that sits between the
//! Handshake sub-protocol and the transport. Key exchange, authentication, and certificate
//! verification are handled elsewhere and reach this crate only as already-derived key material
//! in a [`security_parameters::SecurityParameters`].

pub mod alert;
pub mod bulk_encryption;
pub mod cipher_suite;
pub mod compression;
pub mod content_type;
mod encoding;
pub mod error;
pub mod fragmenter;
pub mod framer;
pub mod handshake;
pub mod protocol;
pub mod random;
pub mod record;
pub mod security_parameters;
pub mod serialize;
pub mod sliding_window;
pub mod validate;
pub mod version;

pub use cipher_suite::{CipherSuite, CipherSuiteId};
pub use error::TLSError;
pub use protocol::{HandshakeCallback, Mode, RecordProtocol, TransportCallback};
pub use security_parameters::{ConnectionEnd, SecurityParameters};
