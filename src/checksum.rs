//! Streaming modular checksum stamped into every entry header.
//!
//! Two running sums modulo 65521: `a` starts at 1 and accumulates each byte,
//! `b` starts at 0 and accumulates `a`. The result is `(b << 16) | a`.

const MODULUS: u32 = 65521;

/// Largest run of bytes that can be summed before `b` may overflow a `u32`.
const MAX_RUN: usize = 5552;

/// Incremental checksum state
#[derive(Debug, Clone, Copy)]
pub struct Checksum {
    a: u32,
    b: u32,
}

impl Checksum {
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Feed more bytes into the checksum
    pub fn update(&mut self, bytes: &[u8]) {
        for run in bytes.chunks(MAX_RUN) {
            for &byte in run {
                self.a += byte as u32;
                self.b += self.a;
            }
            self.a %= MODULUS;
            self.b %= MODULUS;
        }
    }

    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot checksum over a byte span
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut state = Checksum::new();
    state.update(bytes);
    state.finish()
}
