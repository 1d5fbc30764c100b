use base64ct::{Base64, Encoding};
use ring::digest;
use std::fmt::Write;

/// `SHA256` of `input`, defined for empty input
#[must_use]
pub fn sha256_digest(input: impl AsRef<[u8]>) -> [u8; 32] {
    let mut out = [0_u8; 32];
    out.copy_from_slice(digest::digest(&digest::SHA256, input.as_ref()).as_ref());
    out
}

/// `MD5` of `input`, defined for empty input
#[must_use]
pub fn md5_digest(input: impl AsRef<[u8]>) -> [u8; 16] {
    let mut context = md5::Context::new();
    context.consume(input);
    context.finalize().0
}

#[must_use]
pub fn base64_encode(input: impl AsRef<[u8]>) -> String {
    Base64::encode_string(input.as_ref())
}

#[must_use]
pub fn write_hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut s, byte| {
            let _ = write!(s, "{byte:02x}");
            s
        })
}
