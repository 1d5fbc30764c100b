use crate::{
    s3::tools::{base64_encode, write_hex_bytes},
    stream::digest::Digests,
};
use std::{
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};
use tempfile::NamedTempFile;

/// One part of an upload
///
/// The bytes live in a temporary file positioned at offset 0, the file is
/// removed when the record is dropped. A `size` of 0 marks the end of the
/// stream.
#[derive(Debug)]
pub struct PartRecord {
    data: NamedTempFile,
    content_digest: [u8; 16],
    secure_digest: [u8; 32],
    size: u64,
}

impl PartRecord {
    pub(crate) fn new(data: NamedTempFile, digests: Digests) -> Self {
        Self {
            data,
            content_digest: digests.md5,
            secure_digest: digests.sha256,
            size: digests.length,
        }
    }

    /// `MD5` of the part
    #[must_use]
    pub const fn content_digest(&self) -> &[u8; 16] {
        &self.content_digest
    }

    /// `SHA256` of the part
    #[must_use]
    pub const fn secure_digest(&self) -> &[u8; 32] {
        &self.secure_digest
    }

    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Value for the `Content-MD5` header
    #[must_use]
    pub fn content_md5(&self) -> String {
        base64_encode(self.content_digest)
    }

    /// Value for the `x-amz-content-sha256` header
    #[must_use]
    pub fn sha256_hex(&self) -> String {
        write_hex_bytes(&self.secure_digest)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.data.path()
    }

    pub fn data(&mut self) -> &mut NamedTempFile {
        &mut self.data
    }

    /// Hand the temporary file over, it is still removed once dropped
    #[must_use]
    pub fn into_file(self) -> NamedTempFile {
        self.data
    }
}

impl Read for PartRecord {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl Seek for PartRecord {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.data.seek(pos)
    }
}
