//! Dispatches between the two AES key sizes this crate cares about.
//!
//! `ciphers::BlockCipher` is generic over an associated `Key` type (`[u8; 16]` vs `[u8; 32]`),
//! so a cipher-suite-keyed enum is simplest way to store "the AES instance for this record"
//! without threading a const generic through the whole bulk-encryption module.

use ciphers::{Aes128Cipher, Aes256Cipher, BlockCipher};

use crate::error::TLSError;

#[derive(Clone)]
pub enum AesVariant {
    Aes128(Aes128Cipher),
    Aes256(Aes256Cipher),
}

impl AesVariant {
    pub fn new(key: &[u8]) -> Result<Self, TLSError> {
        match key.len() {
            16 => {
                let key: [u8; 16] = key.try_into().expect("checked length");
                Ok(Self::Aes128(Aes128Cipher::new(key)))
            },
            32 => {
                let key: [u8; 32] = key.try_into().expect("checked length");
                Ok(Self::Aes256(Aes256Cipher::new(key)))
            },
            _ => Err(TLSError::CryptoFailure),
        }
    }

    pub fn encrypt_block(&mut self, block: [u8; 16]) -> [u8; 16] {
        match self {
            Self::Aes128(cipher) => cipher.encrypt_block(block),
            Self::Aes256(cipher) => cipher.encrypt_block(block),
        }
    }

    pub fn decrypt_block(&mut self, block: [u8; 16]) -> [u8; 16] {
        match self {
            Self::Aes128(cipher) => cipher.decrypt_block(block),
            Self::Aes256(cipher) => cipher.decrypt_block(block),
        }
    }
}
