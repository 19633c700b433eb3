//! Per-direction, per-epoch key material and algorithm identifiers.
//!
//! Grounded on `record_protocol/security_parameters.h` from the original sources: a flat bag of
//! keys/IVs/algorithm tags, owned by the record protocol core and replaced wholesale at a
//! ChangeCipherSpec boundary. Never mutated while a record is being processed.

use crate::{cipher_suite::CipherSuiteId, handshake::CompressionMethod};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionEnd {
    Client,
    Server,
}

/// The default record size limit, `2^14` bytes, before any cipher-suite expansion.
pub const DEFAULT_RECORD_SIZE_LIMIT: usize = 1 << 14;

/// Keys, IVs and algorithm identifiers in effect for one direction (read or write) during
/// one epoch. Constructed once by [`crate::cipher_suite::CipherSuite::derive_security_parameters`]
/// and swapped in wholesale by `RecordProtocol::set_{read,write}_security_parameters`.
#[derive(Clone, Debug)]
pub struct SecurityParameters {
    pub entity: ConnectionEnd,
    pub compression_method: CompressionMethod,
    pub cipher_suite: CipherSuiteId,

    pub client_write_key: Vec<u8>,
    pub server_write_key: Vec<u8>,
    pub cipher_key_length: usize,

    pub client_write_mac_key: Vec<u8>,
    pub server_write_mac_key: Vec<u8>,
    pub mac_key_length: usize,
    pub mac_length: usize,

    pub client_write_iv: Vec<u8>,
    pub server_write_iv: Vec<u8>,
    pub record_iv_length: usize,
    pub fixed_iv_length: usize,

    /// RFC 7366 Encrypt-then-MAC, as opposed to RFC 5246's MAC-then-encrypt.
    pub encrypt_then_mac: bool,

    pub record_size_limit: usize,
}

impl SecurityParameters {
    /// The all-null parameter set used before any keying material is established: epoch 0 in
    /// DTLS, and everything sent before the first ChangeCipherSpec in TLS.
    #[must_use]
    pub fn null(entity: ConnectionEnd) -> Self {
        Self {
            entity,
            compression_method: CompressionMethod::None,
            cipher_suite: CipherSuiteId::NullWithNullNull,
            client_write_key: Vec::new(),
            server_write_key: Vec::new(),
            cipher_key_length: 0,
            client_write_mac_key: Vec::new(),
            server_write_mac_key: Vec::new(),
            mac_key_length: 0,
            mac_length: 0,
            client_write_iv: Vec::new(),
            server_write_iv: Vec::new(),
            record_iv_length: 0,
            fixed_iv_length: 0,
            encrypt_then_mac: false,
            record_size_limit: DEFAULT_RECORD_SIZE_LIMIT,
        }
    }

    #[must_use]
    pub fn write_key(&self) -> &[u8] {
        match self.entity {
            ConnectionEnd::Client => &self.client_write_key,
            ConnectionEnd::Server => &self.server_write_key,
        }
    }

    #[must_use]
    pub fn read_key(&self) -> &[u8] {
        match self.entity {
            ConnectionEnd::Client => &self.server_write_key,
            ConnectionEnd::Server => &self.client_write_key,
        }
    }

    #[must_use]
    pub fn write_mac_key(&self) -> &[u8] {
        match self.entity {
            ConnectionEnd::Client => &self.client_write_mac_key,
            ConnectionEnd::Server => &self.server_write_mac_key,
        }
    }

    #[must_use]
    pub fn read_mac_key(&self) -> &[u8] {
        match self.entity {
            ConnectionEnd::Client => &self.server_write_mac_key,
            ConnectionEnd::Server => &self.client_write_mac_key,
        }
    }

    #[must_use]
    pub fn write_iv(&self) -> &[u8] {
        match self.entity {
            ConnectionEnd::Client => &self.client_write_iv,
            ConnectionEnd::Server => &self.server_write_iv,
        }
    }

    #[must_use]
    pub fn read_iv(&self) -> &[u8] {
        match self.entity {
            ConnectionEnd::Client => &self.server_write_iv,
            ConnectionEnd::Server => &self.client_write_iv,
        }
    }
}
