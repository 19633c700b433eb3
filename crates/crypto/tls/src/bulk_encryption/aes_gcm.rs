//! AES-GCM AEAD bulk encryption ([NIST SP 800-38D](https://doi.org/10.6028/NIST.SP.800-38D)).
//! Used by `TLS_PSK_WITH_AES_128_GCM_SHA256` and the `ECDHE_ECDSA_..._GCM_...` suites.
//!
//! The nonce is `fixed_iv (4 bytes, from the write IV) ‖ explicit_nonce (8 bytes, the current
//! sequence number)`; the additional data is the same 13-byte header used as MAC input
//! elsewhere in this module, minus the payload itself.

use super::aes_variant::AesVariant;
use crate::{
    error::TLSError,
    record::{additional_data, CipherText, CompressedText},
};

const TAG_LEN: usize = 16;
const EXPLICIT_NONCE_LEN: usize = 8;

const R: u128 = 0xE100_0000_0000_0000_0000_0000_0000_0000;

fn gf_mult(x: u128, y: u128) -> u128 {
    let mut z = 0u128;
    let mut v = y;
    for i in 0..128 {
        if (x >> (127 - i)) & 1 == 1 {
            z ^= v;
        }
        if v & 1 == 1 {
            v = (v >> 1) ^ R;
        } else {
            v >>= 1;
        }
    }
    z
}

fn block_from_slice(data: &[u8]) -> u128 {
    let mut buf = [0u8; 16];
    buf[..data.len()].copy_from_slice(data);
    u128::from_be_bytes(buf)
}

fn ghash(h: u128, aad: &[u8], ciphertext: &[u8]) -> u128 {
    let mut y = 0u128;

    for chunk in aad.chunks(16) {
        y = gf_mult(y ^ block_from_slice(chunk), h);
    }
    for chunk in ciphertext.chunks(16) {
        y = gf_mult(y ^ block_from_slice(chunk), h);
    }

    let len_block = ((aad.len() as u128 * 8) << 64) | (ciphertext.len() as u128 * 8);
    gf_mult(y ^ len_block, h)
}

fn inc32(block: [u8; 16]) -> [u8; 16] {
    let mut out = block;
    let counter = u32::from_be_bytes([block[12], block[13], block[14], block[15]]).wrapping_add(1);
    out[12..].copy_from_slice(&counter.to_be_bytes());
    out
}

fn gctr(cipher: &mut AesVariant, icb: [u8; 16], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut counter_block = icb;
    for chunk in data.chunks(16) {
        let keystream = cipher.encrypt_block(counter_block);
        for (i, &b) in chunk.iter().enumerate() {
            out.push(b ^ keystream[i]);
        }
        counter_block = inc32(counter_block);
    }
    out
}

fn j0(fixed_iv: &[u8], explicit_nonce: [u8; EXPLICIT_NONCE_LEN]) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[..4].copy_from_slice(fixed_iv);
    block[4..12].copy_from_slice(&explicit_nonce);
    block[15] = 1;
    block
}

fn constant_time_eq(a: &[u8; TAG_LEN], b: &[u8]) -> bool {
    if b.len() != TAG_LEN {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn encrypt(mut comp_text: CompressedText, key: &[u8], fixed_iv: &[u8]) -> Result<CipherText, TLSError> {
    let mut cipher = AesVariant::new(key)?;
    let h = u128::from_be_bytes(cipher.encrypt_block([0; 16]));

    let explicit_nonce = comp_text.meta.as_mac_sequence_bytes();
    let j0 = j0(fixed_iv, explicit_nonce);

    let content_type = comp_text.content_type;
    let version = comp_text.version;
    let meta = comp_text.meta;
    let plaintext = std::mem::take(&mut comp_text.payload);
    let aad = additional_data(content_type, version, meta, plaintext.len());

    let ciphertext = gctr(&mut cipher, inc32(j0), &plaintext);
    let s = ghash(h, &aad, &ciphertext);

    let keystream = cipher.encrypt_block(j0);
    let s_bytes = s.to_be_bytes();
    let mut tag = [0u8; TAG_LEN];
    for i in 0..TAG_LEN {
        tag[i] = s_bytes[i] ^ keystream[i];
    }

    let mut payload = Vec::with_capacity(EXPLICIT_NONCE_LEN + ciphertext.len() + TAG_LEN);
    payload.extend_from_slice(&explicit_nonce);
    payload.extend_from_slice(&ciphertext);
    payload.extend_from_slice(&tag);

    Ok(comp_text.into_cipher(payload))
}

pub fn decrypt(cipher_text: CipherText, key: &[u8], fixed_iv: &[u8]) -> Result<CompressedText, TLSError> {
    if cipher_text.payload.len() < EXPLICIT_NONCE_LEN + TAG_LEN {
        return Err(TLSError::MacMismatch);
    }

    let mut cipher = AesVariant::new(key)?;
    let h = u128::from_be_bytes(cipher.encrypt_block([0; 16]));

    let explicit_nonce: [u8; EXPLICIT_NONCE_LEN] = cipher_text.payload[..EXPLICIT_NONCE_LEN]
        .try_into()
        .expect("checked length");
    let j0 = j0(fixed_iv, explicit_nonce);

    let tag_start = cipher_text.payload.len() - TAG_LEN;
    let ciphertext = &cipher_text.payload[EXPLICIT_NONCE_LEN..tag_start];
    let received_tag = &cipher_text.payload[tag_start..];

    let aad = additional_data(
        cipher_text.content_type,
        cipher_text.version,
        cipher_text.meta,
        ciphertext.len(),
    );
    let s = ghash(h, &aad, ciphertext);

    let keystream = cipher.encrypt_block(j0);
    let s_bytes = s.to_be_bytes();
    let mut expected_tag = [0u8; TAG_LEN];
    for i in 0..TAG_LEN {
        expected_tag[i] = s_bytes[i] ^ keystream[i];
    }

    if !constant_time_eq(&expected_tag, received_tag) {
        return Err(TLSError::MacMismatch);
    }

    let plaintext = gctr(&mut cipher, inc32(j0), ciphertext);
    Ok(cipher_text.into_compressed(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content_type::ContentType, record::CompressedText, version::ProtocolVersion};

    fn comp_text(meta: crate::record::SequenceMeta, payload: &[u8]) -> CompressedText {
        CompressedText::new(ContentType::ApplicationData, ProtocolVersion::DTLS_1_2, meta, payload.to_vec())
    }

    #[test]
    fn round_trip_preserves_payload() {
        let key = [0x01; 16];
        let fixed_iv = [0x02; 4];
        let meta = crate::record::SequenceMeta::Dtls { epoch: 1, sequence: 0 };

        let cipher_text = encrypt(comp_text(meta, b"hello"), &key, &fixed_iv).unwrap();
        assert_eq!(cipher_text.payload.len(), EXPLICIT_NONCE_LEN + 5 + TAG_LEN);

        let decrypted = decrypt(cipher_text, &key, &fixed_iv).unwrap();
        assert_eq!(decrypted.payload, b"hello");
    }

    #[test]
    fn scenario_s4_explicit_nonce_and_length() {
        // S4 — AES-GCM send: write_epoch=1, write_seq=0, empty ApplicationData. Expected
        // explicit nonce == 8-byte encoding of epoch 1 / seq 0, payload length 24.
        let key = [0x01; 16];
        let fixed_iv = [0x02; 4];
        let meta = crate::record::SequenceMeta::Dtls { epoch: 1, sequence: 0 };

        let cipher_text = encrypt(comp_text(meta, b""), &key, &fixed_iv).unwrap();
        assert_eq!(&cipher_text.payload[..EXPLICIT_NONCE_LEN], &[0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(cipher_text.payload.len(), 24);
    }

    #[test]
    fn tampered_tag_is_rejected() {
        let key = [0x01; 16];
        let fixed_iv = [0x02; 4];
        let meta = crate::record::SequenceMeta::Dtls { epoch: 1, sequence: 0 };

        let mut cipher_text = encrypt(comp_text(meta, b"hello"), &key, &fixed_iv).unwrap();
        let last = cipher_text.payload.len() - 1;
        cipher_text.payload[last] ^= 0x01;

        let err = decrypt(cipher_text, &key, &fixed_iv).unwrap_err();
        assert_eq!(err, TLSError::MacMismatch);
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let key = [0x01; 16];
        let fixed_iv = [0x02; 4];
        let meta = crate::record::SequenceMeta::Dtls { epoch: 1, sequence: 0 };

        let mut cipher_text = encrypt(comp_text(meta, b"hello"), &key, &fixed_iv).unwrap();
        cipher_text.payload[EXPLICIT_NONCE_LEN] ^= 0x01;

        let err = decrypt(cipher_text, &key, &fixed_iv).unwrap_err();
        assert_eq!(err, TLSError::MacMismatch);
    }
}
