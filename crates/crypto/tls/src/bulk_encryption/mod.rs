//! Stage transform `CompressedText` ↔ `CipherText`.
//!
//! Grounded on `bulk_encryption/bulk_encryption_interface.h`: two initialization calls
//! (`initialize_encryptor`/`initialize_decryptor`, invoked once keying material becomes
//! available at a ChangeCipherSpec boundary) and two transform calls. Per the redesign notes,
//! dispatch is a closed enum match rather than a trait-object hierarchy, since §6 lists the
//! complete, fixed set of suites.

mod aes_gcm;
mod aes_variant;
mod cbc_hmac;
mod null_mac;
mod null_null;

use crate::{
    cipher_suite::{BulkEncryptionFamily, CipherSuiteId, MacAlgorithm},
    error::TLSError,
    random::CryptographicRand,
    record::{CipherText, CompressedText},
    security_parameters::SecurityParameters,
};

pub enum BulkEncryption {
    NullNull,
    NullMac {
        algorithm: MacAlgorithm,
        encrypt_key: Vec<u8>,
        decrypt_key: Vec<u8>,
    },
    AesCbcHmac {
        mac: MacAlgorithm,
        encrypt_key: Vec<u8>,
        decrypt_key: Vec<u8>,
        encrypt_mac_key: Vec<u8>,
        decrypt_mac_key: Vec<u8>,
        rand: CryptographicRand,
    },
    AesGcm {
        encrypt_key: Vec<u8>,
        decrypt_key: Vec<u8>,
        encrypt_fixed_iv: Vec<u8>,
        decrypt_fixed_iv: Vec<u8>,
    },
}

/// Decrypts with the null-null cipher regardless of which suite is actually negotiated. Used
/// for epoch-0 DTLS handshake records (§4.3 checks 6-7), which are always sent and received in
/// the clear no matter what the eventual suite turns out to be.
#[must_use]
pub fn decrypt_null(cipher_text: CipherText) -> CompressedText {
    null_null::decrypt(cipher_text)
}

impl BulkEncryption {
    /// Constructs the (as yet unkeyed) bulk-encryption state for a cipher suite. Keys are
    /// installed later via [`Self::initialize_encryptor`]/[`Self::initialize_decryptor`], once
    /// the handshake has derived them.
    pub fn new(id: CipherSuiteId) -> Result<Self, TLSError> {
        let state = match id.family() {
            BulkEncryptionFamily::NullNull => Self::NullNull,
            BulkEncryptionFamily::NullMac(algorithm) => Self::NullMac {
                algorithm,
                encrypt_key: Vec::new(),
                decrypt_key: Vec::new(),
            },
            BulkEncryptionFamily::AesCbcHmac { mac, .. } => Self::AesCbcHmac {
                mac,
                encrypt_key: Vec::new(),
                decrypt_key: Vec::new(),
                encrypt_mac_key: Vec::new(),
                decrypt_mac_key: Vec::new(),
                rand: CryptographicRand::new().map_err(|_| TLSError::CryptoFailure)?,
            },
            BulkEncryptionFamily::AesGcm { .. } => Self::AesGcm {
                encrypt_key: Vec::new(),
                decrypt_key: Vec::new(),
                encrypt_fixed_iv: Vec::new(),
                decrypt_fixed_iv: Vec::new(),
            },
        };
        Ok(state)
    }

    pub fn initialize_encryptor(&mut self, sp: &SecurityParameters) -> Result<(), TLSError> {
        match self {
            Self::NullNull => {},
            Self::NullMac { encrypt_key, .. } => *encrypt_key = sp.write_mac_key().to_vec(),
            Self::AesCbcHmac {
                encrypt_key,
                encrypt_mac_key,
                ..
            } => {
                *encrypt_key = sp.write_key().to_vec();
                *encrypt_mac_key = sp.write_mac_key().to_vec();
            },
            Self::AesGcm {
                encrypt_key,
                encrypt_fixed_iv,
                ..
            } => {
                *encrypt_key = sp.write_key().to_vec();
                *encrypt_fixed_iv = sp.write_iv().to_vec();
            },
        }
        Ok(())
    }

    pub fn initialize_decryptor(&mut self, sp: &SecurityParameters) -> Result<(), TLSError> {
        match self {
            Self::NullNull => {},
            Self::NullMac { decrypt_key, .. } => *decrypt_key = sp.read_mac_key().to_vec(),
            Self::AesCbcHmac {
                decrypt_key,
                decrypt_mac_key,
                ..
            } => {
                *decrypt_key = sp.read_key().to_vec();
                *decrypt_mac_key = sp.read_mac_key().to_vec();
            },
            Self::AesGcm {
                decrypt_key,
                decrypt_fixed_iv,
                ..
            } => {
                *decrypt_key = sp.read_key().to_vec();
                *decrypt_fixed_iv = sp.read_iv().to_vec();
            },
        }
        Ok(())
    }

    pub fn encrypt(&mut self, comp_text: CompressedText, sp: &SecurityParameters) -> Result<CipherText, TLSError> {
        match self {
            Self::NullNull => Ok(null_null::encrypt(comp_text)),
            Self::NullMac { algorithm, encrypt_key, .. } => {
                Ok(null_mac::encrypt(comp_text, *algorithm, encrypt_key))
            },
            Self::AesCbcHmac {
                mac,
                encrypt_key,
                encrypt_mac_key,
                rand,
                ..
            } => cbc_hmac::encrypt(comp_text, encrypt_key, *mac, encrypt_mac_key, sp.encrypt_then_mac, rand),
            Self::AesGcm {
                encrypt_key,
                encrypt_fixed_iv,
                ..
            } => aes_gcm::encrypt(comp_text, encrypt_key, encrypt_fixed_iv),
        }
    }

    pub fn decrypt(&mut self, cipher_text: CipherText, sp: &SecurityParameters) -> Result<CompressedText, TLSError> {
        match self {
            Self::NullNull => Ok(null_null::decrypt(cipher_text)),
            Self::NullMac { algorithm, decrypt_key, .. } => {
                null_mac::decrypt(cipher_text, *algorithm, decrypt_key)
            },
            Self::AesCbcHmac {
                mac,
                decrypt_key,
                decrypt_mac_key,
                ..
            } => cbc_hmac::decrypt(cipher_text, decrypt_key, *mac, decrypt_mac_key, sp.encrypt_then_mac),
            Self::AesGcm {
                decrypt_key,
                decrypt_fixed_iv,
                ..
            } => aes_gcm::decrypt(cipher_text, decrypt_key, decrypt_fixed_iv),
        }
    }
}
