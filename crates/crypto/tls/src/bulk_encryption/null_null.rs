//! Identity bulk-encryption. Used before any keying material is established: epoch 0 in DTLS,
//! and everything sent before the first ChangeCipherSpec in TLS.

use crate::record::{CipherText, CompressedText};

#[must_use]
pub fn encrypt(mut comp_text: CompressedText) -> CipherText {
    let payload = std::mem::take(&mut comp_text.payload);
    comp_text.into_cipher(payload)
}

#[must_use]
pub fn decrypt(mut cipher_text: CipherText) -> CompressedText {
    let payload = std::mem::take(&mut cipher_text.payload);
    cipher_text.into_compressed(payload)
}
