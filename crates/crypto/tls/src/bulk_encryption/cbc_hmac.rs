//! AES-CBC + HMAC, composed around the `encrypt_then_mac` flag (RFC 5246 §6.2.3.2 /
//! RFC 7366). Used by `TLS_ECDHE_ECDSA_WITH_AES_{128,256}_CBC_SHA{256,384}`.

use hash::{hmac, Sha256, Sha384};

use super::aes_variant::AesVariant;
use crate::{
    cipher_suite::MacAlgorithm,
    error::TLSError,
    random::CryptographicRand,
    record::{mac_input, CipherText, CompressedText},
};

const BLOCK_SIZE: usize = 16;

fn compute_mac(algorithm: MacAlgorithm, key: &[u8], input: &[u8]) -> Vec<u8> {
    match algorithm {
        MacAlgorithm::HmacSha256 => hmac::<Sha256>(key, input).to_vec(),
        MacAlgorithm::HmacSha384 => hmac::<Sha384>(key, input).to_vec(),
        MacAlgorithm::None | MacAlgorithm::HmacSha1 => {
            unreachable!("AES-CBC suites in this crate only ever pair with SHA-256 or SHA-384")
        },
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn pkcs_pad(data: &mut Vec<u8>) {
    let pad_value = (BLOCK_SIZE - (data.len() + 1) % BLOCK_SIZE) % BLOCK_SIZE;
    data.extend(std::iter::repeat(pad_value as u8).take(pad_value + 1));
}

/// Strips and validates TLS CBC padding. Returns `None` on malformed padding; callers must
/// still have computed/checked the MAC before trusting the unpadded length (RFC 7366 orders
/// MAC verification before padding is ever trusted).
fn strip_padding(data: &[u8]) -> Option<&[u8]> {
    let &pad_value = data.last()?;
    let pad_len = pad_value as usize + 1;
    if pad_len > data.len() {
        return None;
    }

    let padding = &data[data.len() - pad_len..];
    if padding.iter().any(|&b| b != pad_value) {
        return None;
    }

    Some(&data[..data.len() - pad_len])
}

fn cbc_encrypt(cipher: &mut AesVariant, iv: [u8; BLOCK_SIZE], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev = iv;
    for block in data.chunks_exact(BLOCK_SIZE) {
        let mut xored = [0u8; BLOCK_SIZE];
        for i in 0..BLOCK_SIZE {
            xored[i] = block[i] ^ prev[i];
        }
        let ciphertext_block = cipher.encrypt_block(xored);
        out.extend_from_slice(&ciphertext_block);
        prev = ciphertext_block;
    }
    out
}

fn cbc_decrypt(cipher: &mut AesVariant, iv: [u8; BLOCK_SIZE], data: &[u8]) -> Option<Vec<u8>> {
    if data.len() % BLOCK_SIZE != 0 {
        return None;
    }

    let mut out = Vec::with_capacity(data.len());
    let mut prev = iv;
    for block in data.chunks_exact(BLOCK_SIZE) {
        let block: [u8; BLOCK_SIZE] = block.try_into().ok()?;
        let decrypted = cipher.decrypt_block(block);
        let mut plain = [0u8; BLOCK_SIZE];
        for i in 0..BLOCK_SIZE {
            plain[i] = decrypted[i] ^ prev[i];
        }
        out.extend_from_slice(&plain);
        prev = block;
    }
    Some(out)
}

#[allow(clippy::too_many_arguments)]
pub fn encrypt(
    mut comp_text: CompressedText,
    key: &[u8],
    mac_algorithm: MacAlgorithm,
    mac_key: &[u8],
    encrypt_then_mac: bool,
    rand: &mut CryptographicRand,
) -> Result<CipherText, TLSError> {
    let mut cipher = AesVariant::new(key)?;

    let mut iv = [0u8; BLOCK_SIZE];
    iv[..8].copy_from_slice(&rand.next_u64().to_ne_bytes());
    iv[8..].copy_from_slice(&rand.next_u64().to_ne_bytes());

    let content_type = comp_text.content_type;
    let version = comp_text.version;
    let meta = comp_text.meta;
    let plaintext = std::mem::take(&mut comp_text.payload);

    let payload = if encrypt_then_mac {
        // RFC 7366: encrypt first, then MAC the ciphertext (IV included).
        let mut padded = plaintext;
        pkcs_pad(&mut padded);
        let ciphertext = cbc_encrypt(&mut cipher, iv, &padded);

        let mut wire = Vec::with_capacity(BLOCK_SIZE + ciphertext.len() + mac_algorithm.output_len());
        wire.extend_from_slice(&iv);
        wire.extend_from_slice(&ciphertext);

        let mac_over = mac_input(content_type, version, meta, &wire);
        let mac = compute_mac(mac_algorithm, mac_key, &mac_over);
        wire.extend_from_slice(&mac);
        wire
    } else {
        // RFC 5246: MAC the plaintext, append, then pad and encrypt the whole thing.
        let mac_over = mac_input(content_type, version, meta, &plaintext);
        let mac = compute_mac(mac_algorithm, mac_key, &mac_over);

        let mut padded = plaintext;
        padded.extend_from_slice(&mac);
        pkcs_pad(&mut padded);

        let ciphertext = cbc_encrypt(&mut cipher, iv, &padded);
        let mut wire = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
        wire.extend_from_slice(&iv);
        wire.extend_from_slice(&ciphertext);
        wire
    };

    Ok(comp_text.into_cipher(payload))
}

pub fn decrypt(
    cipher_text: CipherText,
    key: &[u8],
    mac_algorithm: MacAlgorithm,
    mac_key: &[u8],
    encrypt_then_mac: bool,
) -> Result<CompressedText, TLSError> {
    let mut cipher = AesVariant::new(key)?;
    let mac_len = mac_algorithm.output_len();

    if cipher_text.payload.len() < BLOCK_SIZE {
        return Err(TLSError::MacMismatch);
    }

    let plaintext = if encrypt_then_mac {
        if cipher_text.payload.len() < BLOCK_SIZE + mac_len {
            return Err(TLSError::MacMismatch);
        }
        let split_at = cipher_text.payload.len() - mac_len;
        let (mac_covered, received_mac) = cipher_text.payload.split_at(split_at);

        let mac_over = mac_input(cipher_text.content_type, cipher_text.version, cipher_text.meta, mac_covered);
        let expected_mac = compute_mac(mac_algorithm, mac_key, &mac_over);
        if !constant_time_eq(&expected_mac, received_mac) {
            return Err(TLSError::MacMismatch);
        }

        let iv: [u8; BLOCK_SIZE] = mac_covered[..BLOCK_SIZE].try_into().expect("checked length");
        let ciphertext = &mac_covered[BLOCK_SIZE..];
        let padded = cbc_decrypt(&mut cipher, iv, ciphertext).ok_or(TLSError::MacMismatch)?;
        strip_padding(&padded).ok_or(TLSError::MacMismatch)?.to_vec()
    } else {
        let iv: [u8; BLOCK_SIZE] = cipher_text.payload[..BLOCK_SIZE].try_into().expect("checked length");
        let ciphertext = &cipher_text.payload[BLOCK_SIZE..];
        let padded = cbc_decrypt(&mut cipher, iv, ciphertext).ok_or(TLSError::MacMismatch)?;
        let unpadded = strip_padding(&padded).ok_or(TLSError::MacMismatch)?;

        if unpadded.len() < mac_len {
            return Err(TLSError::MacMismatch);
        }
        let split_at = unpadded.len() - mac_len;
        let (plaintext, received_mac) = unpadded.split_at(split_at);

        let mac_over = mac_input(cipher_text.content_type, cipher_text.version, cipher_text.meta, plaintext);
        let expected_mac = compute_mac(mac_algorithm, mac_key, &mac_over);
        if !constant_time_eq(&expected_mac, received_mac) {
            return Err(TLSError::MacMismatch);
        }
        plaintext.to_vec()
    };

    Ok(cipher_text.into_compressed(plaintext))
}
