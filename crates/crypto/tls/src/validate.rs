//! Header-only sanity checks on a freshly deserialized record, run before decryption, plus the
//! post-decryption checks run on the resulting `PlainText`.
//!
//! Grounded on `record_protocol_validator.h`'s `ReturnTypeValidator` enum and the
//! `validator_internal` check functions; §4.3 enumerates the checks in the order implemented
//! here.

use crate::{
    content_type::ContentType,
    error::TLSError,
    handshake,
    record::{CipherText, PlainText, SequenceMeta},
    serialize::ParsedHeader,
    sliding_window::SlidingWindow,
    version::ProtocolVersion,
};

/// Maximum ciphertext size: `2^14 + 2048`.
pub const RECORD_OVERFLOW_LIMIT: usize = (1 << 14) + 2048;

/// Maximum plaintext size: `2^14`.
pub const PLAINTEXT_SIZE_LIMIT: usize = 1 << 14;

// `FatalUnexpectedMessage` (malformed ChangeCipherSpec payload) and `Retransmit` (a
// handshake record the peer has already sent once) are both outcomes of the wider inbound
// pipeline in §4.6, not of this header-only validator: the former only becomes visible once
// the record is decrypted (see `post_validate_plain_text`, which reports it as a plain
// `TLSError::UnexpectedMessage`), and the latter requires tracking handshake message sequence
// numbers, which belongs to the handshake aggregator this crate hands records to, not to the
// record layer itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidatorOutcome {
    Failed,
    Passed,
    Drop,
    UseNullCipher,
    ContainsClientHello,
    Overflow,
}

/// Everything the validator needs to know about the connection's current state, borrowed for
/// the duration of one validation call.
pub struct ValidationContext<'a> {
    pub is_dtls: bool,
    pub current_read_epoch: u16,
    /// TLS's implicit per-direction read counter. Unused for DTLS, whose sequence number
    /// travels on the wire instead (see `header.sequence`).
    pub current_tls_read_sequence: u64,
    pub sliding_window: &'a SlidingWindow,
    pub negotiated_version: Option<ProtocolVersion>,
}

/// Runs the common and DTLS-specific pre-decryption checks (§4.3, checks 1-7) on a parsed
/// header plus its still-encrypted payload, and constructs the `CipherText` if validation
/// doesn't short-circuit.
pub fn validate_cipher_text(
    header: ParsedHeader,
    payload: Vec<u8>,
    ctx: &ValidationContext<'_>,
) -> (ValidatorOutcome, Option<CipherText>) {
    // 1. size <= 2^14 + 2048
    if payload.len() > RECORD_OVERFLOW_LIMIT {
        return (ValidatorOutcome::Overflow, None);
    }

    // 2. content type must be known
    let Ok(content_type) = ContentType::try_from(header.content_type_raw) else {
        return (ValidatorOutcome::Failed, None);
    };

    // 3. handshake records must carry a non-empty payload
    if content_type == ContentType::Handshake && payload.is_empty() {
        return (ValidatorOutcome::Failed, None);
    }

    let Ok(version) = ProtocolVersion::try_from(header.version_raw) else {
        return (ValidatorOutcome::Failed, None);
    };

    if !ctx.is_dtls {
        let meta = SequenceMeta::Tls {
            sequence: ctx.current_tls_read_sequence,
        };
        let cipher_text = CipherText::new(content_type, version, meta, payload);
        return (ValidatorOutcome::Passed, Some(cipher_text));
    }

    let epoch = header.epoch.expect("DTLS header always carries an epoch");
    let sequence = header.sequence.expect("DTLS header always carries a sequence number");

    // 4. epoch must match the current read epoch
    if epoch != ctx.current_read_epoch {
        return (ValidatorOutcome::Drop, None);
    }

    // 5. sliding window
    if !ctx.sliding_window.is_acceptable(sequence) {
        return (ValidatorOutcome::Drop, None);
    }

    let meta = SequenceMeta::Dtls { epoch, sequence };
    let cipher_text = CipherText::new(content_type, version, meta, payload);

    // 6 & 7. epoch-0 handshake records always use the null cipher; ClientHello additionally
    // needs its sequence number stashed for cookie verification.
    if epoch == 0 && content_type == ContentType::Handshake {
        if handshake::is_client_hello(&cipher_text.payload) {
            return (ValidatorOutcome::ContainsClientHello, Some(cipher_text));
        }
        return (ValidatorOutcome::UseNullCipher, Some(cipher_text));
    }

    (ValidatorOutcome::Passed, Some(cipher_text))
}

/// Runs once more, after decryption, on the resulting `PlainText`.
pub fn post_validate_plain_text(plain_text: &PlainText, ctx: &ValidationContext<'_>) -> Result<(), TLSError> {
    if plain_text.payload.len() > PLAINTEXT_SIZE_LIMIT {
        return Err(TLSError::RecordOverflow);
    }

    // Hello-family messages are exempt from the version check, to allow version negotiation.
    let is_hello = plain_text.content_type == ContentType::Handshake && handshake::is_hello_message(&plain_text.payload);

    if let Some(negotiated) = ctx.negotiated_version {
        if !is_hello && plain_text.version != negotiated {
            return Err(TLSError::UnsupportedProtocolVersion);
        }
    }

    if plain_text.content_type == ContentType::ChangeCipherSpec && plain_text.payload != [0x01] {
        return Err(TLSError::UnexpectedMessage);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tls_header(content_type: u8, length: u16) -> ParsedHeader {
        ParsedHeader {
            content_type_raw: content_type,
            version_raw: [3, 3],
            epoch: None,
            sequence: None,
            length,
        }
    }

    fn dtls_header(content_type: u8, epoch: u16, sequence: u64, length: u16) -> ParsedHeader {
        ParsedHeader {
            content_type_raw: content_type,
            version_raw: [254, 253],
            epoch: Some(epoch),
            sequence: Some(sequence),
            length,
        }
    }

    fn tls_ctx() -> ValidationContext<'static> {
        static WINDOW: SlidingWindow = SlidingWindow::new();
        ValidationContext {
            is_dtls: false,
            current_read_epoch: 0,
            current_tls_read_sequence: 0,
            sliding_window: &WINDOW,
            negotiated_version: Some(ProtocolVersion::TLS_1_2),
        }
    }

    #[test]
    fn oversize_payload_overflows_before_anything_else() {
        let header = tls_header(23, 0);
        let payload = vec![0u8; RECORD_OVERFLOW_LIMIT + 1];
        let (outcome, cipher_text) = validate_cipher_text(header, payload, &tls_ctx());
        assert_eq!(outcome, ValidatorOutcome::Overflow);
        assert!(cipher_text.is_none());
    }

    #[test]
    fn unknown_content_type_fails() {
        let header = tls_header(99, 1);
        let (outcome, _) = validate_cipher_text(header, vec![0x00], &tls_ctx());
        assert_eq!(outcome, ValidatorOutcome::Failed);
    }

    #[test]
    fn empty_handshake_payload_fails() {
        let header = tls_header(22, 0);
        let (outcome, _) = validate_cipher_text(header, Vec::new(), &tls_ctx());
        assert_eq!(outcome, ValidatorOutcome::Failed);
    }

    #[test]
    fn tls_record_passes_straight_through() {
        let header = tls_header(23, 5);
        let (outcome, cipher_text) = validate_cipher_text(header, b"hello".to_vec(), &tls_ctx());
        assert_eq!(outcome, ValidatorOutcome::Passed);
        assert!(cipher_text.is_some());
    }

    #[test]
    fn dtls_wrong_epoch_is_silently_dropped() {
        static WINDOW: SlidingWindow = SlidingWindow::new();
        let ctx = ValidationContext {
            is_dtls: true,
            current_read_epoch: 1,
            current_tls_read_sequence: 0,
            sliding_window: &WINDOW,
            negotiated_version: Some(ProtocolVersion::DTLS_1_2),
        };
        let header = dtls_header(23, 0, 0, 0);
        let (outcome, cipher_text) = validate_cipher_text(header, Vec::new(), &ctx);
        assert_eq!(outcome, ValidatorOutcome::Drop);
        assert!(cipher_text.is_none());
    }

    #[test]
    fn dtls_epoch_zero_handshake_forces_null_cipher() {
        static WINDOW: SlidingWindow = SlidingWindow::new();
        let ctx = ValidationContext {
            is_dtls: true,
            current_read_epoch: 0,
            current_tls_read_sequence: 0,
            sliding_window: &WINDOW,
            negotiated_version: Some(ProtocolVersion::DTLS_1_2),
        };
        // HandshakeType::ServerKeyExchange = 12, not a ClientHello.
        let header = dtls_header(22, 0, 3, 1);
        let (outcome, cipher_text) = validate_cipher_text(header, vec![12], &ctx);
        assert_eq!(outcome, ValidatorOutcome::UseNullCipher);
        assert!(cipher_text.is_some());
    }

    #[test]
    fn dtls_client_hello_at_epoch_zero_is_flagged_for_cookie_verify() {
        static WINDOW: SlidingWindow = SlidingWindow::new();
        let ctx = ValidationContext {
            is_dtls: true,
            current_read_epoch: 0,
            current_tls_read_sequence: 0,
            sliding_window: &WINDOW,
            negotiated_version: Some(ProtocolVersion::DTLS_1_2),
        };
        // HandshakeType::ClientHello = 1.
        let header = dtls_header(22, 0, 0, 1);
        let (outcome, cipher_text) = validate_cipher_text(header, vec![1], &ctx);
        assert_eq!(outcome, ValidatorOutcome::ContainsClientHello);
        assert_eq!(cipher_text.unwrap().meta.sequence(), 0);
    }

    #[test]
    fn post_validate_rejects_mismatched_version_for_non_hello_messages() {
        let meta = SequenceMeta::Tls { sequence: 0 };
        let plain_text = PlainText::new(ContentType::ApplicationData, ProtocolVersion::DTLS_1_2, meta, b"x".to_vec());
        let err = post_validate_plain_text(&plain_text, &tls_ctx()).unwrap_err();
        assert_eq!(err, TLSError::UnsupportedProtocolVersion);
    }

    #[test]
    fn post_validate_exempts_hello_family_from_version_check() {
        // HandshakeType::ServerHello = 2, sent while the connection still negotiates a version.
        let meta = SequenceMeta::Tls { sequence: 0 };
        let plain_text = PlainText::new(ContentType::Handshake, ProtocolVersion::DTLS_1_2, meta, vec![2]);
        assert!(post_validate_plain_text(&plain_text, &tls_ctx()).is_ok());
    }

    #[test]
    fn post_validate_rejects_malformed_change_cipher_spec_payload() {
        let meta = SequenceMeta::Tls { sequence: 0 };
        let plain_text = PlainText::new(ContentType::ChangeCipherSpec, ProtocolVersion::TLS_1_2, meta, vec![0x02]);
        let err = post_validate_plain_text(&plain_text, &tls_ctx()).unwrap_err();
        assert_eq!(err, TLSError::UnexpectedMessage);
    }

    #[test]
    fn post_validate_rejects_oversize_plaintext() {
        let meta = SequenceMeta::Tls { sequence: 0 };
        let plain_text = PlainText::new(
            ContentType::ApplicationData,
            ProtocolVersion::TLS_1_2,
            meta,
            vec![0u8; PLAINTEXT_SIZE_LIMIT + 1],
        );
        let err = post_validate_plain_text(&plain_text, &tls_ctx()).unwrap_err();
        assert_eq!(err, TLSError::RecordOverflow);
    }
}
