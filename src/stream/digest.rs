//! Running digests of the part being filled

use ring::digest::{Context, SHA256};

/// `MD5` and `SHA256` state over the bytes of one part
///
/// Both hashes see exactly the same bytes, a new state is created for every
/// part.
pub struct PartDigest {
    md5: md5::Context,
    sha256: Context,
    length: u64,
}

/// Finalized digests of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digests {
    pub md5: [u8; 16],
    pub sha256: [u8; 32],
    pub length: u64,
}

impl Default for PartDigest {
    fn default() -> Self {
        Self {
            md5: md5::Context::new(),
            sha256: Context::new(&SHA256),
            length: 0,
        }
    }
}

impl PartDigest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.md5.consume(bytes);
        self.sha256.update(bytes);
        self.length += bytes.len() as u64;
    }

    /// Bytes consumed so far
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.length
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[must_use]
    pub fn finish(self) -> Digests {
        let mut sha256 = [0_u8; 32];
        sha256.copy_from_slice(self.sha256.finish().as_ref());

        Digests {
            md5: self.md5.finalize().0,
            sha256,
            length: self.length,
        }
    }
}

impl std::fmt::Debug for PartDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartDigest")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
