//! Cipher suite identifiers and the record-expansion/bulk-encryption-family mapping.
//!
//! Per the redesign notes, the cipher suite universe is closed and small, so dispatch is a
//! plain enum `match` rather than a trait-object zoo: adding a suite means one match arm here
//! and one in [`crate::bulk_encryption`], nothing else.

use crate::{bulk_encryption::BulkEncryption, error::TLSError};

/// Cipher suite identifiers, on-wire values per §6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum CipherSuiteId {
    NullWithNullNull,
    PSK_WITH_AES_128_GCM_SHA256,
    PSK_WITH_NULL_SHA256,
    ECDHE_ECDSA_WITH_NULL_SHA1,
    ECDHE_ECDSA_WITH_AES_128_CBC_SHA256,
    ECDHE_ECDSA_WITH_AES_256_CBC_SHA384,
    ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
}

/// Which MAC/hash is used in HMAC (Null-MAC, CBC) or as the PRF/MAC hash label (GCM).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacAlgorithm {
    None,
    HmacSha1,
    HmacSha256,
    HmacSha384,
}

impl MacAlgorithm {
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::None => 0,
            Self::HmacSha1 => 20,
            Self::HmacSha256 => 32,
            Self::HmacSha384 => 48,
        }
    }
}

/// Which bulk-encryption family a suite uses. The actual stateful implementation lives in
/// [`crate::bulk_encryption`]; this is just the family tag plus its static parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkEncryptionFamily {
    NullNull,
    NullMac(MacAlgorithm),
    AesCbcHmac { key_len: usize, mac: MacAlgorithm },
    AesGcm { key_len: usize },
}

impl CipherSuiteId {
    #[must_use]
    pub const fn family(self) -> BulkEncryptionFamily {
        match self {
            Self::NullWithNullNull => BulkEncryptionFamily::NullNull,
            Self::PSK_WITH_AES_128_GCM_SHA256 => BulkEncryptionFamily::AesGcm { key_len: 16 },
            Self::PSK_WITH_NULL_SHA256 => BulkEncryptionFamily::NullMac(MacAlgorithm::HmacSha256),
            Self::ECDHE_ECDSA_WITH_NULL_SHA1 => BulkEncryptionFamily::NullMac(MacAlgorithm::HmacSha1),
            Self::ECDHE_ECDSA_WITH_AES_128_CBC_SHA256 => BulkEncryptionFamily::AesCbcHmac {
                key_len: 16,
                mac: MacAlgorithm::HmacSha256,
            },
            Self::ECDHE_ECDSA_WITH_AES_256_CBC_SHA384 => BulkEncryptionFamily::AesCbcHmac {
                key_len: 32,
                mac: MacAlgorithm::HmacSha384,
            },
            Self::ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 => BulkEncryptionFamily::AesGcm { key_len: 16 },
            Self::ECDHE_ECDSA_WITH_AES_256_GCM_SHA384 => BulkEncryptionFamily::AesGcm { key_len: 32 },
        }
    }

    /// Maximum number of bytes this suite ever adds to a plaintext fragment: IV/nonce + MAC/tag
    /// + worst-case padding. Used to size the fragmenter's effective plaintext budget.
    #[must_use]
    pub const fn record_expansion(self) -> usize {
        match self.family() {
            BulkEncryptionFamily::NullNull => 0,
            BulkEncryptionFamily::NullMac(mac) => mac.output_len(),
            BulkEncryptionFamily::AesCbcHmac { mac, .. } => 16 + mac.output_len() + 16,
            BulkEncryptionFamily::AesGcm { .. } => 8 + 16,
        }
    }
}

impl From<CipherSuiteId> for [u8; 2] {
    fn from(value: CipherSuiteId) -> Self {
        match value {
            CipherSuiteId::NullWithNullNull => [0x00, 0x00],
            CipherSuiteId::PSK_WITH_AES_128_GCM_SHA256 => [0x00, 0xA8],
            CipherSuiteId::PSK_WITH_NULL_SHA256 => [0x00, 0xB0],
            CipherSuiteId::ECDHE_ECDSA_WITH_NULL_SHA1 => [0xC0, 0x06],
            CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_CBC_SHA256 => [0xC0, 0x23],
            CipherSuiteId::ECDHE_ECDSA_WITH_AES_256_CBC_SHA384 => [0xC0, 0x24],
            CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 => [0xC0, 0x2B],
            CipherSuiteId::ECDHE_ECDSA_WITH_AES_256_GCM_SHA384 => [0xC0, 0x2C],
        }
    }
}

/// A selected suite, bundling its identifier with its bulk-encryption capability. Key exchange
/// and authentication are driven entirely by the handshake layer and have no representation
/// here — the record layer only ever needs the bulk-encryption side of a suite.
pub struct CipherSuite {
    pub id: CipherSuiteId,
    pub bulk_encryption: BulkEncryption,
}

impl CipherSuite {
    /// The cipher-suite factory (§4.7): the only place mapping a wire identifier to concrete
    /// algorithm state. Adding a suite means one match arm in [`CipherSuiteId::family`] and
    /// nothing here.
    pub fn make(id: CipherSuiteId) -> Result<Self, TLSError> {
        Ok(Self {
            id,
            bulk_encryption: BulkEncryption::new(id)?,
        })
    }
}

impl TryFrom<[u8; 2]> for CipherSuiteId {
    type Error = TLSError;

    fn try_from(value: [u8; 2]) -> Result<Self, Self::Error> {
        let suite = match value {
            [0x00, 0x00] => Self::NullWithNullNull,
            [0x00, 0xA8] => Self::PSK_WITH_AES_128_GCM_SHA256,
            [0x00, 0xB0] => Self::PSK_WITH_NULL_SHA256,
            [0xC0, 0x06] => Self::ECDHE_ECDSA_WITH_NULL_SHA1,
            [0xC0, 0x23] => Self::ECDHE_ECDSA_WITH_AES_128_CBC_SHA256,
            [0xC0, 0x24] => Self::ECDHE_ECDSA_WITH_AES_256_CBC_SHA384,
            [0xC0, 0x2B] => Self::ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            [0xC0, 0x2C] => Self::ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
            other => {
                log::warn!("Unknown cipher suite: {other:?}");
                return Err(TLSError::UnknownCipherSuite);
            },
        };
        Ok(suite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SUITES: [CipherSuiteId; 8] = [
        CipherSuiteId::NullWithNullNull,
        CipherSuiteId::PSK_WITH_AES_128_GCM_SHA256,
        CipherSuiteId::PSK_WITH_NULL_SHA256,
        CipherSuiteId::ECDHE_ECDSA_WITH_NULL_SHA1,
        CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_CBC_SHA256,
        CipherSuiteId::ECDHE_ECDSA_WITH_AES_256_CBC_SHA384,
        CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
        CipherSuiteId::ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    ];

    #[test]
    fn wire_identifiers_round_trip() {
        for suite in ALL_SUITES {
            let wire: [u8; 2] = suite.into();
            assert_eq!(CipherSuiteId::try_from(wire).unwrap(), suite);
        }
    }

    #[test]
    fn wire_identifiers_match_section_6() {
        assert_eq!(<[u8; 2]>::from(CipherSuiteId::NullWithNullNull), [0x00, 0x00]);
        assert_eq!(<[u8; 2]>::from(CipherSuiteId::PSK_WITH_AES_128_GCM_SHA256), [0x00, 0xA8]);
        assert_eq!(<[u8; 2]>::from(CipherSuiteId::PSK_WITH_NULL_SHA256), [0x00, 0xB0]);
        assert_eq!(<[u8; 2]>::from(CipherSuiteId::ECDHE_ECDSA_WITH_NULL_SHA1), [0xC0, 0x06]);
        assert_eq!(
            <[u8; 2]>::from(CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_CBC_SHA256),
            [0xC0, 0x23]
        );
        assert_eq!(
            <[u8; 2]>::from(CipherSuiteId::ECDHE_ECDSA_WITH_AES_256_CBC_SHA384),
            [0xC0, 0x24]
        );
        assert_eq!(
            <[u8; 2]>::from(CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_GCM_SHA256),
            [0xC0, 0x2B]
        );
        assert_eq!(
            <[u8; 2]>::from(CipherSuiteId::ECDHE_ECDSA_WITH_AES_256_GCM_SHA384),
            [0xC0, 0x2C]
        );
    }

    #[test]
    fn unknown_wire_identifier_is_rejected() {
        assert!(CipherSuiteId::try_from([0xFF, 0xFF]).is_err());
    }

    #[test]
    fn record_expansion_matches_table_in_4_5() {
        assert_eq!(CipherSuiteId::NullWithNullNull.record_expansion(), 0);
        assert_eq!(CipherSuiteId::ECDHE_ECDSA_WITH_NULL_SHA1.record_expansion(), 20);
        assert_eq!(CipherSuiteId::PSK_WITH_NULL_SHA256.record_expansion(), 32);
        assert_eq!(CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_CBC_SHA256.record_expansion(), 64);
        assert_eq!(CipherSuiteId::ECDHE_ECDSA_WITH_AES_256_CBC_SHA384.record_expansion(), 80);
        assert_eq!(CipherSuiteId::PSK_WITH_AES_128_GCM_SHA256.record_expansion(), 24);
        assert_eq!(CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_GCM_SHA256.record_expansion(), 24);
        assert_eq!(CipherSuiteId::ECDHE_ECDSA_WITH_AES_256_GCM_SHA384.record_expansion(), 24);
    }

    #[test]
    fn factory_builds_the_matching_bulk_encryption_family() {
        for suite in ALL_SUITES {
            assert!(CipherSuite::make(suite).is_ok());
        }
    }
}
