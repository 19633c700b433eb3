//! Splits outbound user data into per-record `PlainText`s respecting the effective plaintext
//! budget computed by the record protocol core.
//!
//! Grounded on `send_fragmenter.h`: `SetDataAndRecordSize` primes the fragmenter with a source
//! view and a budget; `GetNextPlainText` then slices at most one budget's worth of bytes per
//! call. TLS and DTLS differ only in what metadata gets stamped onto each `PlainText`, so this
//! stays one type parameterized over [`crate::record::SequenceMeta`] rather than two classes.

use crate::{
    content_type::ContentType,
    record::{PlainText, SequenceMeta},
    version::ProtocolVersion,
};

pub struct Fragmenter {
    data: Vec<u8>,
    offset: usize,
    budget: usize,
    version: ProtocolVersion,
    emitted_empty_application_data: bool,
}

impl Fragmenter {
    #[must_use]
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            data: Vec::new(),
            offset: 0,
            budget: 0,
            version,
            emitted_empty_application_data: false,
        }
    }

    pub fn set_data_and_record_size(&mut self, data: &[u8], budget: usize) {
        self.data = data.to_vec();
        self.offset = 0;
        self.budget = budget;
        self.emitted_empty_application_data = false;
    }

    /// Returns the next `PlainText`, tagged with `content_type` and `meta`, or `None` once the
    /// source is exhausted — except for `ApplicationData`, where exactly one empty record is
    /// emitted if the source was empty to begin with (RFC 5246 permits zero-length fragments).
    pub fn next_plaintext(&mut self, content_type: ContentType, meta: SequenceMeta) -> Option<PlainText> {
        let remaining = self.data.len() - self.offset;

        if remaining == 0 {
            if content_type == ContentType::ApplicationData && !self.emitted_empty_application_data {
                self.emitted_empty_application_data = true;
                return Some(PlainText::new(content_type, self.version, meta, Vec::new()));
            }
            return None;
        }

        let take = remaining.min(self.budget.max(1));
        let chunk = self.data[self.offset..self.offset + take].to_vec();
        self.offset += take;

        Some(PlainText::new(content_type, self.version, meta, chunk))
    }
}
