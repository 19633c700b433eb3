//! Stage transform `PlainText` ↔ `CompressedText`.
//!
//! Only the null identity compression is implemented (spec Non-goal: no real compression
//! algorithm). This stays a distinct pipeline stage anyway so a real implementation could be
//! plugged in later without reshaping the rest of the pipeline.

use crate::record::{CompressedText, PlainText};

#[must_use]
pub fn compress(mut plain_text: PlainText) -> CompressedText {
    let payload = std::mem::take(&mut plain_text.payload);
    plain_text.into_compressed(payload)
}

#[must_use]
pub fn decompress(mut comp_text: CompressedText) -> PlainText {
    let payload = std::mem::take(&mut comp_text.payload);
    comp_text.into_plain(payload)
}
