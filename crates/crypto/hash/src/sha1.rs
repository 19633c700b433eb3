//! SHA-1 ([RFC 3174](https://www.rfc-editor.org/rfc/rfc3174)) hash implementation
//!
//! Note that this is not entirely spec-compliant. We do not support hashing
//! data with a length that isn't a multiple of 8 bits.

use crate::{CryptographicHashAlgorithm, HashAlgorithm};

const PADDING: [u8; 64] = [
    0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const SHA1_INITIAL: [u32; 5] = [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];

/// SHA-1 Hasher, as defined in [RFC 3174](https://www.rfc-editor.org/rfc/rfc3174)
///
/// Only relied on here for interop with legacy cipher suites (`NULL_SHA1`-style MACs);
/// do not use for anything that needs actual collision resistance.
#[derive(Clone, Copy, Debug)]
pub struct Sha1 {
    state: [u32; 5],
    buffer: [u8; 64],
    buffer_ptr: usize,
    num_bytes_consumed: u64,
}

impl Default for Sha1 {
    fn default() -> Self {
        Self {
            state: SHA1_INITIAL,
            buffer: [0; 64],
            buffer_ptr: 0,
            num_bytes_consumed: 0,
        }
    }
}

impl HashAlgorithm for Sha1 {
    const BLOCK_SIZE_IN: usize = 64;
    const BLOCK_SIZE_OUT: usize = 20;

    fn update(&mut self, data: &[u8]) {
        let bytes_to_fill = 64 - self.buffer_ptr;
        if data.len() < bytes_to_fill {
            self.buffer[self.buffer_ptr..self.buffer_ptr + data.len()].copy_from_slice(data);
            self.buffer_ptr += data.len();
            return;
        }

        self.buffer[self.buffer_ptr..].copy_from_slice(&data[..bytes_to_fill]);
        self.step();

        let chunks = data[bytes_to_fill..].chunks_exact(64);
        let remaining_bytes = chunks.remainder();
        for chunk in chunks {
            self.buffer.copy_from_slice(chunk);
            self.step();
        }

        self.buffer[..remaining_bytes.len()].copy_from_slice(remaining_bytes);
        self.buffer_ptr = remaining_bytes.len();
    }

    fn finish(mut self) -> [u8; Self::BLOCK_SIZE_OUT] {
        let length: u64 = (self.num_bytes_consumed + self.buffer_ptr as u64) * 8;

        let needed_bytes = 64 - self.buffer_ptr;
        self.buffer[self.buffer_ptr..].copy_from_slice(&PADDING[..needed_bytes]);

        if needed_bytes <= 8 {
            self.step();
            self.buffer[..56].fill(0);
        }

        self.buffer[56..64].copy_from_slice(&length.to_be_bytes());
        self.step();

        let mut hash = [0; 20];
        hash[0..4].copy_from_slice(&self.state[0].to_be_bytes());
        hash[4..8].copy_from_slice(&self.state[1].to_be_bytes());
        hash[8..12].copy_from_slice(&self.state[2].to_be_bytes());
        hash[12..16].copy_from_slice(&self.state[3].to_be_bytes());
        hash[16..20].copy_from_slice(&self.state[4].to_be_bytes());
        hash
    }
}

impl CryptographicHashAlgorithm for Sha1 {}

impl Sha1 {
    fn step(&mut self) {
        let mut w = [0u32; 80];
        for (index, word_bytes) in self.buffer.chunks_exact(4).enumerate() {
            w[index] = u32::from_be_bytes(word_bytes.try_into().unwrap());
        }

        for t in 16..80 {
            w[t] = (w[t - 3] ^ w[t - 8] ^ w[t - 14] ^ w[t - 16]).rotate_left(1);
        }

        let mut a = self.state[0];
        let mut b = self.state[1];
        let mut c = self.state[2];
        let mut d = self.state[3];
        let mut e = self.state[4];

        for (t, &word) in w.iter().enumerate() {
            let (f, k) = match t {
                0..=19 => ((b & c) | (!b & d), 0x5A827999),
                20..=39 => (b ^ c ^ d, 0x6ED9EBA1),
                40..=59 => ((b & c) | (b & d) | (c & d), 0x8F1BBCDC),
                _ => (b ^ c ^ d, 0xCA62C1D6),
            };

            let temp = a
                .rotate_left(5)
                .wrapping_add(f)
                .wrapping_add(e)
                .wrapping_add(k)
                .wrapping_add(word);

            e = d;
            d = c;
            c = b.rotate_left(30);
            b = a;
            a = temp;
        }

        self.state[0] = self.state[0].wrapping_add(a);
        self.state[1] = self.state[1].wrapping_add(b);
        self.state[2] = self.state[2].wrapping_add(c);
        self.state[3] = self.state[3].wrapping_add(d);
        self.state[4] = self.state[4].wrapping_add(e);

        self.num_bytes_consumed += 64;
        self.buffer_ptr = 0;
    }
}
