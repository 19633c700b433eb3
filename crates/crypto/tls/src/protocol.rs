//! `RecordProtocol`: the orchestrator and sole mutable owner of the connection's framing,
//! sequencing, and cryptographic state.
//!
//! Grounded on `record_protocol.h`'s public surface (recovered only as a listing, not full
//! content — the method set below follows the index entries and the behavior description in
//! §4.6) together with the fully recovered `record_protocol_framer.h`, `send_fragmenter.h`,
//! `security_parameters.h`, and `record_protocol_validator.h`.

use crate::{
    alert::{Alert, Description, Severity},
    bulk_encryption::{self, BulkEncryption},
    cipher_suite::{CipherSuite, CipherSuiteId},
    compression,
    content_type::ContentType,
    encoding::{Cursor, Decoding, Encoding},
    error::TLSError,
    fragmenter::Fragmenter,
    framer::{Framer, WireRecord},
    record::{CipherText, PlainText, SequenceMeta},
    security_parameters::{ConnectionEnd, SecurityParameters},
    serialize,
    sliding_window::SlidingWindow,
    validate::{self, ValidationContext, ValidatorOutcome},
    version::ProtocolVersion,
};

/// Largest TLS sequence number that may be used: `2^64 - 2`.
const TLS_SEQUENCE_LIMIT: u64 = u64::MAX - 1;

/// Largest DTLS explicit sequence number that may be used: `2^48 - 2`.
const DTLS_SEQUENCE_LIMIT: u64 = (1 << 48) - 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Tls,
    Dtls,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConnectionState {
    Uninitialized,
    Opened,
    Active,
}

/// Sink for outbound wire bytes and inbound application data.
pub trait TransportCallback {
    fn on_send_to_transport(&mut self, bytes: &[u8]);
    fn on_send_to_comm_party(&mut self, bytes: &[u8]);
}

/// Sink for everything the record layer hands up to the Handshake sub-protocol.
pub trait HandshakeCallback {
    fn on_handshake_data(&mut self, bytes: &[u8], is_retransmit: bool);
    fn on_alert_data(&mut self, bytes: &[u8]);
    fn on_change_cipher_data(&mut self, bytes: &[u8]);
    fn close_request(&mut self);
}

/// Owns every piece built so far — `SecurityParameters`, `BulkEncryption`, `Framer`,
/// `Fragmenter`, `SlidingWindow` — and drives the outbound and inbound pipelines described in
/// §4.6. Single-threaded: callers must not re-enter `handle_received_data_from_transport` from
/// within `on_send_to_transport`.
pub struct RecordProtocol {
    state: ConnectionState,
    mode: Mode,
    role: ConnectionEnd,
    connected: bool,
    negotiated_version: ProtocolVersion,

    read_security_parameters: SecurityParameters,
    write_security_parameters: SecurityParameters,
    read_bulk_encryption: BulkEncryption,
    write_bulk_encryption: BulkEncryption,

    read_epoch: u16,
    write_epoch: u16,
    read_sequence: u64,
    write_sequence: u64,
    previous_read_epoch_state: Option<(u16, u64)>,
    previous_write_epoch_state: Option<(u16, u64)>,

    sliding_window: SlidingWindow,
    framer: Framer,
    fragmenter: Fragmenter,

    most_recent_client_hello_sequence: Option<u64>,

    transport_callback: Option<Box<dyn TransportCallback>>,
    handshake_callback: Option<Box<dyn HandshakeCallback>>,
}

impl Default for RecordProtocol {
    fn default() -> Self {
        Self {
            state: ConnectionState::Uninitialized,
            mode: Mode::Tls,
            role: ConnectionEnd::Client,
            connected: false,
            negotiated_version: ProtocolVersion::TLS_1_2,
            read_security_parameters: SecurityParameters::null(ConnectionEnd::Client),
            write_security_parameters: SecurityParameters::null(ConnectionEnd::Client),
            read_bulk_encryption: BulkEncryption::NullNull,
            write_bulk_encryption: BulkEncryption::NullNull,
            read_epoch: 0,
            write_epoch: 0,
            read_sequence: 0,
            write_sequence: 0,
            previous_read_epoch_state: None,
            previous_write_epoch_state: None,
            sliding_window: SlidingWindow::new(),
            framer: Framer::new(false),
            fragmenter: Fragmenter::new(ProtocolVersion::TLS_1_2),
            most_recent_client_hello_sequence: None,
            transport_callback: None,
            handshake_callback: None,
        }
    }
}

impl RecordProtocol {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_transport_callback(&mut self, callback: Box<dyn TransportCallback>) {
        self.transport_callback = Some(callback);
    }

    pub fn register_handshake_callback(&mut self, callback: Box<dyn HandshakeCallback>) {
        self.handshake_callback = Some(callback);
    }

    /// `[Uninitialized] --open(role)--> [Opened]`. Installs the null-null cipher suite on both
    /// directions and resets all sequence/epoch state.
    pub fn open(&mut self, mode: Mode, role: ConnectionEnd) {
        self.mode = mode;
        self.role = role;
        self.negotiated_version = match mode {
            Mode::Tls => ProtocolVersion::TLS_1_2,
            Mode::Dtls => ProtocolVersion::DTLS_1_2,
        };
        self.read_epoch = 0;
        self.write_epoch = 0;
        self.read_sequence = 0;
        self.write_sequence = 0;
        self.previous_read_epoch_state = None;
        self.previous_write_epoch_state = None;
        self.sliding_window = SlidingWindow::new();
        self.framer = Framer::new(matches!(mode, Mode::Dtls));
        self.fragmenter = Fragmenter::new(self.negotiated_version);
        self.most_recent_client_hello_sequence = None;
        self.reset_security_parameters();
        self.connected = false;
        self.state = ConnectionState::Opened;
    }

    /// `[Opened] --connect()--> [Active]`. Permits `ApplicationData` through the pipeline.
    pub fn connect(&mut self) -> Result<(), TLSError> {
        if self.state == ConnectionState::Uninitialized {
            return Err(TLSError::ConfigurationError);
        }
        self.connected = true;
        self.state = ConnectionState::Active;
        Ok(())
    }

    /// `[Active] --disconnect()--> [Opened]`. `ApplicationData` is rejected again afterwards.
    pub fn disconnect(&mut self) -> Result<(), TLSError> {
        if self.state == ConnectionState::Uninitialized {
            return Err(TLSError::ConfigurationError);
        }
        self.connected = false;
        self.state = ConnectionState::Opened;
        Ok(())
    }

    /// Sends a `close_notify` warning alert, notifies the handshake callback, and resets to
    /// `Uninitialized`.
    pub fn close_down(&mut self) {
        let _ = self.send_alert(Severity::Warning, Description::CloseNotify);
        if let Some(callback) = self.handshake_callback.as_mut() {
            callback.close_request();
        }
        self.cleanup();
    }

    /// Full reset to `Uninitialized`, ready for a new `open`. Registered callbacks are kept —
    /// they belong to the embedder, not to one connection lifetime.
    pub fn cleanup(&mut self) {
        self.state = ConnectionState::Uninitialized;
        self.connected = false;
        self.read_epoch = 0;
        self.write_epoch = 0;
        self.read_sequence = 0;
        self.write_sequence = 0;
        self.previous_read_epoch_state = None;
        self.previous_write_epoch_state = None;
        self.sliding_window = SlidingWindow::new();
        self.framer = Framer::new(false);
        self.fragmenter = Fragmenter::new(ProtocolVersion::TLS_1_2);
        self.most_recent_client_hello_sequence = None;
        self.reset_security_parameters();
    }

    /// Restores the null-null cipher suite on both directions without touching epoch/sequence
    /// state.
    pub fn reset_security_parameters(&mut self) {
        self.read_security_parameters = SecurityParameters::null(self.role);
        self.write_security_parameters = SecurityParameters::null(self.role);
        self.read_bulk_encryption = BulkEncryption::NullNull;
        self.write_bulk_encryption = BulkEncryption::NullNull;
    }

    pub fn set_read_security_parameters(&mut self, sp: SecurityParameters) -> Result<(), TLSError> {
        let mut bulk_encryption = BulkEncryption::new(sp.cipher_suite)?;
        bulk_encryption.initialize_decryptor(&sp)?;
        self.read_security_parameters = sp;
        self.read_bulk_encryption = bulk_encryption;
        Ok(())
    }

    pub fn set_write_security_parameters(&mut self, sp: SecurityParameters) -> Result<(), TLSError> {
        let mut bulk_encryption = BulkEncryption::new(sp.cipher_suite)?;
        bulk_encryption.initialize_encryptor(&sp)?;
        self.write_security_parameters = sp;
        self.write_bulk_encryption = bulk_encryption;
        Ok(())
    }

    /// Bumps the read epoch and resets the read sequence counter and sliding window, stashing
    /// the previous state for one level of [`Self::decrease_read_epoch`] rollback.
    pub fn increase_read_epoch(&mut self) -> Result<(), TLSError> {
        let next_epoch = self.read_epoch.checked_add(1).ok_or(TLSError::ConfigurationError)?;
        self.previous_read_epoch_state = Some((self.read_epoch, self.read_sequence));
        self.read_epoch = next_epoch;
        self.read_sequence = 0;
        self.sliding_window = SlidingWindow::new();
        Ok(())
    }

    /// Restores the read epoch/sequence pair saved by the last `increase_read_epoch`. Used only
    /// during Handshake-driven retransmit recovery; the sliding window itself is not restored
    /// and simply starts fresh, since anything accepted under the rolled-back epoch is still
    /// authoritative by virtue of having already been MAC-verified.
    pub fn decrease_read_epoch(&mut self) -> Result<(), TLSError> {
        let (epoch, sequence) = self
            .previous_read_epoch_state
            .take()
            .ok_or(TLSError::ConfigurationError)?;
        self.read_epoch = epoch;
        self.read_sequence = sequence;
        self.sliding_window = SlidingWindow::new();
        Ok(())
    }

    pub fn increase_write_epoch(&mut self) -> Result<(), TLSError> {
        let next_epoch = self.write_epoch.checked_add(1).ok_or(TLSError::ConfigurationError)?;
        self.previous_write_epoch_state = Some((self.write_epoch, self.write_sequence));
        self.write_epoch = next_epoch;
        self.write_sequence = 0;
        Ok(())
    }

    pub fn decrease_write_epoch(&mut self) -> Result<(), TLSError> {
        let (epoch, sequence) = self
            .previous_write_epoch_state
            .take()
            .ok_or(TLSError::ConfigurationError)?;
        self.write_epoch = epoch;
        self.write_sequence = sequence;
        Ok(())
    }

    /// DTLS server cookie-verify: make the next outbound record (the ServerHello) continue the
    /// sequence stream of the ClientHello that triggered it.
    pub fn use_most_recent_client_hello_sequence_number(&mut self) {
        if let Some(sequence) = self.most_recent_client_hello_sequence {
            self.write_sequence = sequence;
        }
    }

    /// The cipher-suite factory (§4.7).
    pub fn on_cipher_suite_selected(&mut self, id: CipherSuiteId) -> Result<CipherSuite, TLSError> {
        CipherSuite::make(id)
    }

    fn sequence_limit(&self) -> u64 {
        match self.mode {
            Mode::Tls => TLS_SEQUENCE_LIMIT,
            Mode::Dtls => DTLS_SEQUENCE_LIMIT,
        }
    }

    fn current_write_meta(&self) -> SequenceMeta {
        match self.mode {
            Mode::Tls => SequenceMeta::Tls {
                sequence: self.write_sequence,
            },
            Mode::Dtls => SequenceMeta::Dtls {
                epoch: self.write_epoch,
                sequence: self.write_sequence,
            },
        }
    }

    fn allows_outbound(&self, content_type: ContentType) -> bool {
        match content_type {
            ContentType::ApplicationData => self.connected,
            _ => true,
        }
    }

    /// Advances the write sequence counter, or sends a warning `close_notify` and fails once the
    /// cap defined in §3 is about to be exceeded.
    fn advance_write_sequence(&mut self) -> Result<(), TLSError> {
        if self.write_sequence >= self.sequence_limit() {
            if let Some(callback) = self.handshake_callback.as_mut() {
                callback.close_request();
            }
            return Err(TLSError::ConfigurationError);
        }
        self.write_sequence += 1;
        Ok(())
    }

    /// Outbound pipeline (§4.6): Fragmenter → Compression → BulkEncryption → Serializer →
    /// transport callback, once per fragment.
    pub fn send_message(&mut self, content_type: ContentType, bytes: &[u8]) -> Result<(), TLSError> {
        if !self.allows_outbound(content_type) {
            return Err(TLSError::UnexpectedMessage);
        }

        let record_expansion = self.write_security_parameters.cipher_suite.record_expansion();
        let budget = self
            .write_security_parameters
            .record_size_limit
            .min(validate::PLAINTEXT_SIZE_LIMIT);
        let effective_budget = budget
            .checked_sub(record_expansion)
            .filter(|budget| *budget > 0)
            .ok_or(TLSError::ConfigurationError)?;

        self.fragmenter.set_data_and_record_size(bytes, effective_budget);

        while let Some(plain_text) = self.fragmenter.next_plaintext(content_type, self.current_write_meta()) {
            let compressed = compression::compress(plain_text);
            let cipher_text = self
                .write_bulk_encryption
                .encrypt(compressed, &self.write_security_parameters)?;
            let wire = serialize::serialize(&cipher_text);

            if let Some(callback) = self.transport_callback.as_mut() {
                callback.on_send_to_transport(&wire);
            }

            self.advance_write_sequence()?;
        }

        Ok(())
    }

    pub fn send_alert(&mut self, severity: Severity, description: Description) -> Result<(), TLSError> {
        let alert = Alert { severity, description };
        self.send_message(ContentType::Alert, &alert.as_bytes())
    }

    /// DTLS server only. Sent in the clear, un-compressed, regardless of the currently
    /// negotiated parameters, and — per RFC 6347 §4.2.1 — never advances the write sequence
    /// counter, since the cookie-verify exchange is stateless.
    pub fn send_hello_verify_request(&mut self, bytes: &[u8]) -> Result<(), TLSError> {
        if self.mode != Mode::Dtls || self.role != ConnectionEnd::Server {
            return Err(TLSError::ConfigurationError);
        }

        let meta = SequenceMeta::Dtls {
            epoch: 0,
            sequence: self.write_sequence,
        };
        let cipher_text = CipherText::new(ContentType::Handshake, self.negotiated_version, meta, bytes.to_vec());
        let wire = serialize::serialize(&cipher_text);

        if let Some(callback) = self.transport_callback.as_mut() {
            callback.on_send_to_transport(&wire);
        }

        Ok(())
    }

    /// Inbound pipeline (§4.6): feeds the Framer and processes every complete record it yields.
    pub fn handle_received_data_from_transport(&mut self, bytes: &[u8]) -> Result<(), TLSError> {
        self.framer.add_data(bytes);

        while let Some(wire_record) = self.framer.next_record() {
            self.process_wire_record(wire_record)?;
        }

        Ok(())
    }

    fn validation_context(&self) -> ValidationContext<'_> {
        ValidationContext {
            is_dtls: self.mode == Mode::Dtls,
            current_read_epoch: self.read_epoch,
            current_tls_read_sequence: self.read_sequence,
            sliding_window: &self.sliding_window,
            negotiated_version: Some(self.negotiated_version),
        }
    }

    /// Advances the TLS implicit read counter once a record has been fully processed under it.
    /// DTLS has no equivalent counter to advance here: its sequence number travels on the wire
    /// and anti-replay is tracked by the sliding window instead.
    fn advance_read_sequence(&mut self) -> Result<(), TLSError> {
        if self.mode == Mode::Dtls {
            return Ok(());
        }
        if self.read_sequence >= self.sequence_limit() {
            if let Some(callback) = self.handshake_callback.as_mut() {
                callback.close_request();
            }
            return Err(TLSError::ConfigurationError);
        }
        self.read_sequence += 1;
        Ok(())
    }

    fn process_wire_record(&mut self, record: WireRecord) -> Result<(), TLSError> {
        let header = serialize::parse_header(&record.header, self.mode == Mode::Dtls);
        let ctx = self.validation_context();
        let (outcome, cipher_text) = validate::validate_cipher_text(header, record.payload, &ctx);

        match outcome {
            ValidatorOutcome::Failed => Err(TLSError::Deserialize),
            ValidatorOutcome::Overflow => {
                self.fail_connection(TLSError::RecordOverflow);
                Err(TLSError::RecordOverflow)
            },
            ValidatorOutcome::Drop => Ok(()),
            ValidatorOutcome::Passed => {
                self.process_cipher_text(cipher_text.expect("Passed always carries a CipherText"), false)
            },
            ValidatorOutcome::UseNullCipher => {
                self.process_cipher_text(cipher_text.expect("UseNullCipher always carries a CipherText"), true)
            },
            ValidatorOutcome::ContainsClientHello => {
                let cipher_text = cipher_text.expect("ContainsClientHello always carries a CipherText");
                self.most_recent_client_hello_sequence = Some(cipher_text.meta.sequence());
                self.process_cipher_text(cipher_text, true)
            },
        }
    }

    fn process_cipher_text(&mut self, cipher_text: CipherText, force_null_cipher: bool) -> Result<(), TLSError> {
        let compressed = if force_null_cipher {
            bulk_encryption::decrypt_null(cipher_text)
        } else {
            match self.read_bulk_encryption.decrypt(cipher_text, &self.read_security_parameters) {
                Ok(compressed) => compressed,
                Err(err) => {
                    self.fail_connection(err);
                    return Err(err);
                },
            }
        };

        let plain_text = compression::decompress(compressed);

        let ctx = self.validation_context();
        if let Err(err) = validate::post_validate_plain_text(&plain_text, &ctx) {
            self.fail_connection(err);
            return Err(err);
        }

        // Sliding window only advances once the record has actually been MAC-verified, i.e.
        // once decryption and post-validation both succeeded. Likewise, the TLS implicit read
        // counter only advances past a record once it has been fully verified under it.
        match plain_text.meta {
            SequenceMeta::Dtls { sequence, .. } => self.sliding_window.accept(sequence),
            SequenceMeta::Tls { .. } => self.advance_read_sequence()?,
        }

        self.dispatch(plain_text)
    }

    fn dispatch(&mut self, plain_text: PlainText) -> Result<(), TLSError> {
        match plain_text.content_type {
            ContentType::ChangeCipherSpec => {
                if let Some(callback) = self.handshake_callback.as_mut() {
                    callback.on_change_cipher_data(&plain_text.payload);
                }
                Ok(())
            },
            ContentType::Alert => {
                let mut cursor = Cursor::new(&plain_text.payload);
                let alert: Alert = cursor.decode().map_err(TLSError::from)?;

                if alert.severity == Severity::Fatal {
                    if let Some(callback) = self.handshake_callback.as_mut() {
                        callback.close_request();
                    }
                    self.cleanup();
                } else if let Some(callback) = self.handshake_callback.as_mut() {
                    callback.on_alert_data(&plain_text.payload);
                }
                Ok(())
            },
            ContentType::Handshake => {
                // Retransmit detection requires tracking handshake message sequence numbers,
                // which belongs to the handshake aggregator this crate hands records to.
                if let Some(callback) = self.handshake_callback.as_mut() {
                    callback.on_handshake_data(&plain_text.payload, false);
                }
                Ok(())
            },
            ContentType::ApplicationData => {
                if self.connected {
                    if let Some(callback) = self.transport_callback.as_mut() {
                        callback.on_send_to_comm_party(&plain_text.payload);
                    }
                    Ok(())
                } else {
                    self.fail_connection(TLSError::UnexpectedMessage);
                    Err(TLSError::UnexpectedMessage)
                }
            },
        }
    }

    /// Sends the matching fatal alert (if any) and notifies the handshake callback, per the
    /// propagation policy in §7.
    fn fail_connection(&mut self, err: TLSError) {
        if let Some((severity, description)) = err.fatal_alert() {
            let _ = self.send_alert(severity, description);
        }
        if let Some(callback) = self.handshake_callback.as_mut() {
            callback.close_request();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{cipher_suite::CipherSuiteId, security_parameters::SecurityParameters};

    #[derive(Default, Clone)]
    struct RecordingTransport {
        sent: Rc<RefCell<Vec<Vec<u8>>>>,
        received: Rc<RefCell<Vec<Vec<u8>>>>,
    }

    impl TransportCallback for RecordingTransport {
        fn on_send_to_transport(&mut self, bytes: &[u8]) {
            self.sent.borrow_mut().push(bytes.to_vec());
        }

        fn on_send_to_comm_party(&mut self, bytes: &[u8]) {
            self.received.borrow_mut().push(bytes.to_vec());
        }
    }

    #[derive(Default, Clone)]
    struct RecordingHandshake {
        handshake_data: Rc<RefCell<Vec<(Vec<u8>, bool)>>>,
        alerts: Rc<RefCell<Vec<Vec<u8>>>>,
        change_cipher: Rc<RefCell<Vec<Vec<u8>>>>,
        closed: Rc<RefCell<bool>>,
    }

    impl HandshakeCallback for RecordingHandshake {
        fn on_handshake_data(&mut self, bytes: &[u8], is_retransmit: bool) {
            self.handshake_data.borrow_mut().push((bytes.to_vec(), is_retransmit));
        }

        fn on_alert_data(&mut self, bytes: &[u8]) {
            self.alerts.borrow_mut().push(bytes.to_vec());
        }

        fn on_change_cipher_data(&mut self, bytes: &[u8]) {
            self.change_cipher.borrow_mut().push(bytes.to_vec());
        }

        fn close_request(&mut self) {
            *self.closed.borrow_mut() = true;
        }
    }

    fn wired(mode: Mode, role: ConnectionEnd) -> (RecordProtocol, RecordingTransport, RecordingHandshake) {
        let mut protocol = RecordProtocol::new();
        let transport = RecordingTransport::default();
        let handshake = RecordingHandshake::default();
        protocol.register_transport_callback(Box::new(transport.clone()));
        protocol.register_handshake_callback(Box::new(handshake.clone()));
        protocol.open(mode, role);
        (protocol, transport, handshake)
    }

    #[test]
    fn s1_tls_null_null_round_trip() {
        let (mut client, client_transport, _) = wired(Mode::Tls, ConnectionEnd::Client);
        client.connect().unwrap();
        client.send_message(ContentType::ApplicationData, b"hello").unwrap();

        let sent = client_transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], [0x17, 0x03, 0x03, 0x00, 0x05, 0x68, 0x65, 0x6c, 0x6c, 0x6f]);

        let (mut server, _, server_handshake) = wired(Mode::Tls, ConnectionEnd::Server);
        server.connect().unwrap();
        let server_transport = RecordingTransport::default();
        server.register_transport_callback(Box::new(server_transport.clone()));
        let _ = &server_handshake;

        server.handle_received_data_from_transport(&sent[0]).unwrap();
        assert_eq!(server_transport.received.borrow()[0], b"hello");
    }

    #[test]
    fn s2_dtls_epoch_zero_client_hello_is_dispatched_and_stashed() {
        let (mut server, server_transport, server_handshake) = wired(Mode::Dtls, ConnectionEnd::Server);

        // HandshakeType::ClientHello = 1, epoch 0, sequence 0.
        let mut wire = vec![22, 254, 253, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        wire.push(1); // payload: ClientHello tag byte
        server.handle_received_data_from_transport(&wire).unwrap();

        let handshake_data = server_handshake.handshake_data.borrow();
        assert_eq!(handshake_data.len(), 1);
        assert_eq!(handshake_data[0].1, false);

        // Cookie-verify: the next outbound record should continue the ClientHello's sequence.
        server.use_most_recent_client_hello_sequence_number();
        server.send_hello_verify_request(b"cookie").unwrap();
        let sent = server_transport.sent.borrow();
        // epoch(2) + explicit sequence(6) at offset 3..11; sequence should still be 0.
        assert_eq!(&sent[0][3..11], &[0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn s4_aes_gcm_send_uses_epoch_and_sequence_as_explicit_nonce() {
        let (mut client, transport, _) = wired(Mode::Dtls, ConnectionEnd::Client);
        client.increase_write_epoch().unwrap();

        let mut sp = SecurityParameters::null(ConnectionEnd::Client);
        sp.cipher_suite = CipherSuiteId::ECDHE_ECDSA_WITH_AES_128_GCM_SHA256;
        sp.client_write_key = vec![0x01; 16];
        sp.client_write_iv = vec![0x02; 4];
        client.set_write_security_parameters(sp).unwrap();
        client.connect().unwrap();

        client.send_message(ContentType::ApplicationData, b"").unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        // DTLS header is 13 bytes; payload is explicit_nonce(8) || tag(16) for an empty record.
        let payload = &sent[0][13..];
        assert_eq!(payload.len(), 24);
        assert_eq!(&payload[..8], &[0, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn s5_record_overflow_triggers_fatal_alert_and_close() {
        let (mut server, server_transport, server_handshake) = wired(Mode::Tls, ConnectionEnd::Server);
        server.connect().unwrap();

        // length field 0x5001 = 20481 > 2^14 + 2048 = 18432.
        let mut wire = vec![23, 3, 3, 0x50, 0x01];
        wire.extend(std::iter::repeat(0u8).take(20481));
        server.handle_received_data_from_transport(&wire).unwrap_err();

        let sent = server_transport.sent.borrow();
        assert_eq!(sent[0][0], 21); // ContentType::Alert
        assert_eq!(&sent[0][5..7], &[2, 22]); // fatal, record_overflow
        assert!(*server_handshake.closed.borrow());
    }

    #[test]
    fn s6_mac_failure_triggers_fatal_alert_and_close() {
        let (mut server, server_transport, server_handshake) = wired(Mode::Dtls, ConnectionEnd::Server);
        server.increase_read_epoch().unwrap();

        let mut sp = SecurityParameters::null(ConnectionEnd::Server);
        sp.cipher_suite = CipherSuiteId::PSK_WITH_NULL_SHA256;
        sp.client_write_mac_key = vec![0x09; 32];
        server.set_read_security_parameters(sp).unwrap();
        server.connect().unwrap();

        // Build a record with a 32-byte all-zero tag that will never match the real HMAC.
        let mut wire = vec![23, 254, 253, 0, 1, 0, 0, 0, 0, 0, 0];
        let payload_len = 32u16;
        wire.extend_from_slice(&payload_len.to_be_bytes());
        wire.extend(std::iter::repeat(0u8).take(32));

        server.handle_received_data_from_transport(&wire).unwrap_err();

        // Fatal alerts are themselves sent under the connection's current (DTLS) mode, so the
        // alert record still carries the 13-byte DTLS header ahead of its 2-byte payload.
        let sent = server_transport.sent.borrow();
        assert_eq!(&sent[0][13..15], &[2, 20]); // fatal, bad_record_mac
        assert!(*server_handshake.closed.borrow());
    }

    #[test]
    fn unconnected_application_data_is_rejected_both_ways() {
        let (mut client, _, _) = wired(Mode::Tls, ConnectionEnd::Client);
        assert_eq!(
            client.send_message(ContentType::ApplicationData, b"x").unwrap_err(),
            TLSError::UnexpectedMessage
        );

        let (mut server, server_transport, server_handshake) = wired(Mode::Tls, ConnectionEnd::Server);
        let wire = [23, 3, 3, 0, 1, 0x61];
        server.handle_received_data_from_transport(&wire).unwrap_err();
        assert_eq!(&server_transport.sent.borrow()[0][5..7], &[2, 10]); // fatal, unexpected_message
        assert!(*server_handshake.closed.borrow());
    }

    #[test]
    fn hello_verify_request_never_advances_the_write_sequence() {
        let (mut server, transport, _) = wired(Mode::Dtls, ConnectionEnd::Server);
        server.send_hello_verify_request(b"cookie1").unwrap();
        server.send_hello_verify_request(b"cookie2").unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(&sent[0][3..11], &[0u8; 8]);
        assert_eq!(&sent[1][3..11], &[0u8; 8]);
    }

    #[test]
    fn epoch_increase_then_decrease_is_visible_on_the_wire() {
        let (mut client, transport, _) = wired(Mode::Dtls, ConnectionEnd::Client);
        client.connect().unwrap();

        client.send_alert(Severity::Warning, Description::CloseNotify).unwrap();
        assert_eq!(transport.sent.borrow()[0][3..5], [0, 0]); // epoch 0

        client.increase_write_epoch().unwrap();
        client.send_alert(Severity::Warning, Description::CloseNotify).unwrap();
        assert_eq!(transport.sent.borrow()[1][3..5], [0, 1]); // epoch 1

        client.decrease_write_epoch().unwrap();
        client.send_alert(Severity::Warning, Description::CloseNotify).unwrap();
        assert_eq!(transport.sent.borrow()[2][3..5], [0, 0]); // epoch restored to 0
    }

    #[test]
    fn tls_read_sequence_advances_across_successive_records_under_a_keyed_suite() {
        // Regression test: the TLS implicit read counter must advance per decoded record, or
        // every record past the first fails MAC verification against a receiver stuck at
        // sequence 0 while the sender's MAC input correctly advances.
        let (mut client, client_transport, _) = wired(Mode::Tls, ConnectionEnd::Client);
        let mut write_sp = SecurityParameters::null(ConnectionEnd::Client);
        write_sp.cipher_suite = CipherSuiteId::PSK_WITH_NULL_SHA256;
        write_sp.client_write_mac_key = vec![0x07; 32];
        client.set_write_security_parameters(write_sp).unwrap();
        client.connect().unwrap();
        client.send_message(ContentType::ApplicationData, b"first").unwrap();
        client.send_message(ContentType::ApplicationData, b"second").unwrap();

        let (mut server, server_transport, _) = wired(Mode::Tls, ConnectionEnd::Server);
        let mut read_sp = SecurityParameters::null(ConnectionEnd::Server);
        read_sp.cipher_suite = CipherSuiteId::PSK_WITH_NULL_SHA256;
        read_sp.client_write_mac_key = vec![0x07; 32];
        server.set_read_security_parameters(read_sp).unwrap();
        server.connect().unwrap();

        for wire in client_transport.sent.borrow().iter() {
            server.handle_received_data_from_transport(wire).unwrap();
        }

        let received = server_transport.received.borrow();
        assert_eq!(received[0], b"first");
        assert_eq!(received[1], b"second");
    }

    #[test]
    fn sequence_advances_by_one_per_sent_record() {
        let (mut client, transport, _) = wired(Mode::Dtls, ConnectionEnd::Client);
        client.connect().unwrap();

        for _ in 0..3 {
            client.send_alert(Severity::Warning, Description::CloseNotify).unwrap();
        }

        let sent = transport.sent.borrow();
        let sequence_at = |i: usize| u64::from_be_bytes({
            let mut buf = [0u8; 8];
            buf[2..8].copy_from_slice(&sent[i][5..11]);
            buf
        });
        assert_eq!(sequence_at(0), 0);
        assert_eq!(sequence_at(1), 1);
        assert_eq!(sequence_at(2), 2);
    }
}
