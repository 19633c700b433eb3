//! Null-MAC: integrity only, no confidentiality. Used by e.g.
//! `TLS_PSK_WITH_NULL_SHA256` and `TLS_ECDHE_ECDSA_WITH_NULL_SHA1`.

use hash::{hmac, Sha1, Sha256};

use crate::{
    cipher_suite::MacAlgorithm,
    error::TLSError,
    record::{mac_input, CipherText, CompressedText},
};

fn compute_mac(algorithm: MacAlgorithm, key: &[u8], input: &[u8]) -> Vec<u8> {
    match algorithm {
        MacAlgorithm::HmacSha1 => hmac::<Sha1>(key, input).to_vec(),
        MacAlgorithm::HmacSha256 => hmac::<Sha256>(key, input).to_vec(),
        MacAlgorithm::HmacSha384 | MacAlgorithm::None => {
            unreachable!("Null-MAC is only ever constructed with SHA-1 or SHA-256")
        },
    }
}

/// Constant-time comparison, so a bad tag doesn't leak the position of the first mismatching
/// byte through timing.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[must_use]
pub fn encrypt(mut comp_text: CompressedText, algorithm: MacAlgorithm, mac_key: &[u8]) -> CipherText {
    let input = mac_input(comp_text.content_type, comp_text.version, comp_text.meta, &comp_text.payload);
    let mac = compute_mac(algorithm, mac_key, &input);

    let mut payload = std::mem::take(&mut comp_text.payload);
    payload.extend_from_slice(&mac);
    comp_text.into_cipher(payload)
}

pub fn decrypt(
    cipher_text: CipherText,
    algorithm: MacAlgorithm,
    mac_key: &[u8],
) -> Result<CompressedText, TLSError> {
    let mac_len = algorithm.output_len();
    if cipher_text.payload.len() < mac_len {
        return Err(TLSError::MacMismatch);
    }

    let split_at = cipher_text.payload.len() - mac_len;
    let plaintext = &cipher_text.payload[..split_at];
    let received_mac = &cipher_text.payload[split_at..];

    let input = mac_input(cipher_text.content_type, cipher_text.version, cipher_text.meta, plaintext);
    let expected_mac = compute_mac(algorithm, mac_key, &input);

    if !constant_time_eq(&expected_mac, received_mac) {
        return Err(TLSError::MacMismatch);
    }

    let plaintext = plaintext.to_vec();
    Ok(cipher_text.into_compressed(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content_type::ContentType, record::CompressedText, version::ProtocolVersion};

    fn comp_text(payload: &[u8]) -> CompressedText {
        CompressedText::new(
            ContentType::ApplicationData,
            ProtocolVersion::TLS_1_2,
            crate::record::SequenceMeta::Tls { sequence: 0 },
            payload.to_vec(),
        )
    }

    #[test]
    fn round_trip_preserves_payload() {
        let key = [0x42; 32];
        let cipher_text = encrypt(comp_text(b"hello"), MacAlgorithm::HmacSha256, &key);
        assert_eq!(cipher_text.payload.len(), 5 + 32);

        let decrypted = decrypt(cipher_text, MacAlgorithm::HmacSha256, &key).unwrap();
        assert_eq!(decrypted.payload, b"hello");
    }

    #[test]
    fn tampered_tag_fails_verification() {
        let key = [0x42; 32];
        let mut cipher_text = encrypt(comp_text(b"hello"), MacAlgorithm::HmacSha256, &key);
        let last = cipher_text.payload.len() - 1;
        cipher_text.payload[last] ^= 0x01;

        let err = decrypt(cipher_text, MacAlgorithm::HmacSha256, &key).unwrap_err();
        assert_eq!(err, TLSError::MacMismatch);
    }

    #[test]
    fn undersize_payload_is_rejected_before_mac_check() {
        let key = [0x42; 32];
        let cipher_text = comp_text(b"ab").into_cipher(vec![0u8; 4]);
        let err = decrypt(cipher_text, MacAlgorithm::HmacSha256, &key).unwrap_err();
        assert_eq!(err, TLSError::MacMismatch);
    }
}
