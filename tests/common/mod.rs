#![allow(dead_code)]

use std::io::{self, Read};

/// Install `env_logger` once, `RUST_LOG=s3prep=trace` shows the part logs
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic bytes that do not repeat on part boundaries
#[allow(clippy::cast_possible_truncation)]
pub fn sample_data(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// A pipe-like reader returning a different amount of bytes on every read
pub struct Uneven<R> {
    inner: R,
    step: usize,
}

impl<R> Uneven<R> {
    pub const fn new(inner: R) -> Self {
        Self { inner, step: 0 }
    }
}

impl<R: Read> Read for Uneven<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.step = self.step % 7 + 1;
        let len = buf.len().min(self.step * 97);
        match buf.get_mut(..len) {
            Some(buf) => self.inner.read(buf),
            None => Ok(0),
        }
    }
}
