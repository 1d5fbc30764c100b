//! Split a stream into multipart parts
//!
//! Every call to [`PartSplitter::next_part`] reads the stream in small
//! increments until the part is full or the stream ends. Each increment is
//! written to a temporary file and folded into both digests, nothing else is
//! kept between calls. The splitter must be driven from one thread, the
//! returned parts are independent and can be uploaded concurrently.

use crate::{
    error::{Error, Result},
    s3::limits::READ_SIZE_BYTES,
    stream::{digest::PartDigest, part::PartRecord},
};
use std::{
    io::{self, ErrorKind, Read, Seek, Write},
    iter::FusedIterator,
    path::{Path, PathBuf},
};
use tempfile::{Builder, NamedTempFile};

const TMP_PREFIX: &str = "s3prep-";
const TMP_SUFFIX: &str = ".part";

#[derive(Debug)]
pub struct PartSplitter<R> {
    reader: R,
    part_size: u64,
    read_size: usize,
    tmp_dir: Option<PathBuf>,
}

impl<R: Read> PartSplitter<R> {
    /// # Errors
    ///
    /// Will return `Error::InvalidArgument` if `part_size` is 0
    pub fn new(reader: R, part_size: u64) -> Result<Self> {
        if part_size == 0 {
            return Err(Error::invalid_argument("part_size", "must be greater than 0"));
        }

        Ok(Self {
            reader,
            part_size,
            read_size: READ_SIZE_BYTES,
            tmp_dir: None,
        })
    }

    /// Bytes requested from the stream per read, 1 KiB by default
    ///
    /// # Errors
    ///
    /// Will return `Error::InvalidArgument` if `read_size` is 0
    pub fn with_read_size(mut self, read_size: usize) -> Result<Self> {
        if read_size == 0 {
            return Err(Error::invalid_argument("read_size", "must be greater than 0"));
        }
        self.read_size = read_size;
        Ok(self)
    }

    /// Directory for the part files, the OS temp dir by default
    #[must_use]
    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = Some(tmp_dir.into());
        self
    }

    #[must_use]
    pub const fn part_size(&self) -> u64 {
        self.part_size
    }

    #[must_use]
    pub const fn read_size(&self) -> usize {
        self.read_size
    }

    #[must_use]
    pub fn tmp_dir(&self) -> Option<&Path> {
        self.tmp_dir.as_deref()
    }

    #[must_use]
    pub const fn get_ref(&self) -> &R {
        &self.reader
    }

    #[must_use]
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Iterator over the remaining parts
    #[must_use]
    pub fn parts(self) -> Parts<R> {
        Parts {
            splitter: self,
            yielded: false,
            done: false,
        }
    }

    /// Read the next part, a record with `size() == 0` means the stream is
    /// exhausted
    ///
    /// # Errors
    ///
    /// Returns the stream read error as is, or the error creating or writing
    /// the temporary file. Only `ErrorKind::Interrupted` reads are retried,
    /// following the `Read` convention. A partially written temporary file is
    /// removed when the error is returned.
    pub fn next_part(&mut self) -> io::Result<PartRecord> {
        let tmp_file = match &self.tmp_dir {
            Some(dir) => tmp_builder().tempfile_in(dir)?,
            None => tmp_builder().tempfile()?,
        };

        fill_part(&mut self.reader, tmp_file, self.part_size, self.read_size)
    }
}

fn tmp_builder() -> Builder<'static, 'static> {
    let mut builder = Builder::new();
    builder.prefix(TMP_PREFIX).suffix(TMP_SUFFIX);
    builder
}

fn fill_part<R: Read>(
    reader: &mut R,
    mut tmp_file: NamedTempFile,
    part_size: u64,
    read_size: usize,
) -> io::Result<PartRecord> {
    let mut buf = vec![0_u8; read_size];
    let mut digest = PartDigest::new();

    while digest.len() < part_size {
        // never read past the end of the part
        let remaining = part_size - digest.len();
        let want = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));

        let Some(chunk) = buf.get_mut(..want) else {
            break;
        };

        let read = match reader.read(chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        let Some(bytes) = chunk.get(..read) else {
            break;
        };

        tmp_file.write_all(bytes)?;
        digest.update(bytes);

        log::trace!("Read {} bytes, part has {} bytes", read, digest.len());
    }

    tmp_file.flush()?;
    tmp_file.rewind()?;

    let part = PartRecord::new(tmp_file, digest.finish());

    log::debug!(
        "Part ready: {} bytes, md5: {}, sha256: {}",
        part.size(),
        part.content_md5(),
        part.sha256_hex()
    );

    Ok(part)
}

/// Read one part of at most `part_size` bytes from `reader`
///
/// # Errors
///
/// Returns `ErrorKind::InvalidInput` if `part_size` is 0, otherwise the same
/// errors as [`PartSplitter::next_part`]
pub fn next_part<R: Read>(reader: &mut R, part_size: u64) -> io::Result<PartRecord> {
    if part_size == 0 {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "part_size must be greater than 0",
        ));
    }

    fill_part(reader, tmp_builder().tempfile()?, part_size, READ_SIZE_BYTES)
}

/// Parts of a stream in order
///
/// Stops after the part that reached the end of the stream. An empty stream
/// yields a single empty part so there is always something to upload. After
/// an error the iterator is done.
#[derive(Debug)]
pub struct Parts<R> {
    splitter: PartSplitter<R>,
    yielded: bool,
    done: bool,
}

impl<R> Parts<R> {
    #[must_use]
    pub fn into_inner(self) -> PartSplitter<R> {
        self.splitter
    }
}

impl<R: Read> Iterator for Parts<R> {
    type Item = io::Result<PartRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.splitter.next_part() {
            Ok(part) => {
                // a short part means the stream returned 0 bytes
                if part.size() < self.splitter.part_size {
                    self.done = true;
                }

                if part.is_empty() && self.yielded {
                    return None;
                }

                self.yielded = true;
                Some(Ok(part))
            }

            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for Parts<R> {}

impl<R: Read> IntoIterator for PartSplitter<R> {
    type Item = io::Result<PartRecord>;
    type IntoIter = Parts<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;
    use crate::s3::tools::{md5_digest, sha256_digest};
    use std::io::Cursor;

    fn read_all(part: &mut PartRecord) -> Vec<u8> {
        let mut buf = Vec::new();
        part.read_to_end(&mut buf).unwrap();
        buf
    }

    /// Returns at most `max` bytes per read
    struct Trickle<R> {
        inner: R,
        max: usize,
    }

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(self.max);
            self.inner.read(&mut buf[..len])
        }
    }

    /// Fails after `ok` bytes
    struct Broken {
        ok: usize,
    }

    impl Read for Broken {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.ok == 0 {
                return Err(io::Error::new(ErrorKind::ConnectionReset, "reset by peer"));
            }
            let len = buf.len().min(self.ok);
            buf[..len].fill(b'x');
            self.ok -= len;
            Ok(len)
        }
    }

    /// Interrupted on every other read
    struct Interrupting<R> {
        inner: R,
        interrupt: bool,
    }

    impl<R: Read> Read for Interrupting<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_zero_part_size() {
        assert!(matches!(
            PartSplitter::new(Cursor::new(Vec::<u8>::new()), 0),
            Err(Error::InvalidArgument { name: "part_size", .. })
        ));

        let err = next_part(&mut Cursor::new(b"abc"), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_zero_read_size() {
        let splitter = PartSplitter::new(Cursor::new(Vec::<u8>::new()), 10).unwrap();
        assert!(splitter.with_read_size(0).is_err());
    }

    #[test]
    fn test_empty_stream() {
        let mut splitter = PartSplitter::new(Cursor::new(Vec::<u8>::new()), 100).unwrap();
        let mut part = splitter.next_part().unwrap();
        assert_eq!(part.size(), 0);
        assert!(part.is_empty());
        assert_eq!(*part.content_digest(), md5_digest(b""));
        assert_eq!(*part.secure_digest(), sha256_digest(b""));
        assert!(read_all(&mut part).is_empty());

        let part = splitter.next_part().unwrap();
        assert!(part.is_empty());
    }

    #[test]
    fn test_next_part_sizes() {
        let data: Vec<u8> = (0..2_500_u32).map(|i| (i % 251) as u8).collect();
        let mut splitter = PartSplitter::new(Cursor::new(data.clone()), 1_000).unwrap();

        let mut first = splitter.next_part().unwrap();
        let mut second = splitter.next_part().unwrap();
        let mut third = splitter.next_part().unwrap();
        let last = splitter.next_part().unwrap();

        assert_eq!(first.size(), 1_000);
        assert_eq!(second.size(), 1_000);
        assert_eq!(third.size(), 500);
        assert_eq!(last.size(), 0);

        assert_eq!(read_all(&mut first), &data[..1_000]);
        assert_eq!(read_all(&mut second), &data[1_000..2_000]);
        assert_eq!(read_all(&mut third), &data[2_000..]);

        assert_eq!(*second.content_digest(), md5_digest(&data[1_000..2_000]));
        assert_eq!(*second.secure_digest(), sha256_digest(&data[1_000..2_000]));
    }

    #[test]
    fn test_part_size_not_multiple_of_read_size() {
        // 1 KiB reads must not overshoot a 1500 byte part
        let data = vec![7_u8; 4_000];
        let mut splitter = PartSplitter::new(Cursor::new(data), 1_500).unwrap();
        assert_eq!(splitter.next_part().unwrap().size(), 1_500);
        assert_eq!(splitter.next_part().unwrap().size(), 1_500);
        assert_eq!(splitter.next_part().unwrap().size(), 1_000);
        assert_eq!(splitter.next_part().unwrap().size(), 0);
    }

    #[test]
    fn test_short_reads() {
        let data: Vec<u8> = (0..777_u32).map(|i| (i % 13) as u8).collect();
        let reader = Trickle {
            inner: Cursor::new(data.clone()),
            max: 3,
        };
        let mut splitter = PartSplitter::new(reader, 500)
            .unwrap()
            .with_read_size(64)
            .unwrap();

        let mut first = splitter.next_part().unwrap();
        assert_eq!(first.size(), 500);
        assert_eq!(read_all(&mut first), &data[..500]);
        assert_eq!(*first.secure_digest(), sha256_digest(&data[..500]));

        let second = splitter.next_part().unwrap();
        assert_eq!(second.size(), 277);
        assert_eq!(*second.content_digest(), md5_digest(&data[500..]));
    }

    #[test]
    fn test_interrupted_reads_are_resumed() {
        let reader = Interrupting {
            inner: Cursor::new(b"hello world".to_vec()),
            interrupt: false,
        };
        let mut splitter = PartSplitter::new(reader, 1_024).unwrap();
        let mut part = splitter.next_part().unwrap();
        assert_eq!(read_all(&mut part), b"hello world");
    }

    #[test]
    fn test_read_error_is_returned_as_is() {
        let mut splitter = PartSplitter::new(Broken { ok: 2_048 }, 1_000).unwrap();
        assert_eq!(splitter.next_part().unwrap().size(), 1_000);
        assert_eq!(splitter.next_part().unwrap().size(), 1_000);

        let err = splitter.next_part().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionReset);
        assert_eq!(err.to_string(), "reset by peer");
    }

    #[test]
    fn test_tmp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut splitter = PartSplitter::new(Cursor::new(b"abc".to_vec()), 10)
            .unwrap()
            .with_tmp_dir(dir.path());
        assert_eq!(splitter.tmp_dir(), Some(dir.path()));

        let part = splitter.next_part().unwrap();
        assert!(part.path().starts_with(dir.path()));

        let name = part.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(TMP_PREFIX));
        assert!(name.ends_with(TMP_SUFFIX));
    }

    #[test]
    fn test_free_next_part() {
        let mut reader = Cursor::new(b"hello world".to_vec());
        let mut part = next_part(&mut reader, 5).unwrap();
        assert_eq!(read_all(&mut part), b"hello");
        assert_eq!(*part.content_digest(), md5_digest(b"hello"));

        let mut part = next_part(&mut reader, 100).unwrap();
        assert_eq!(read_all(&mut part), b" world");
        assert!(next_part(&mut reader, 100).unwrap().is_empty());
    }

    #[test]
    fn test_parts_iterator() {
        let data = vec![1_u8; 3_000];
        let sizes: Vec<u64> = PartSplitter::new(Cursor::new(data), 1_000)
            .unwrap()
            .parts()
            .map(|part| part.unwrap().size())
            .collect();
        assert_eq!(sizes, vec![1_000, 1_000, 1_000]);

        let data = vec![1_u8; 2_001];
        let sizes: Vec<u64> = PartSplitter::new(Cursor::new(data), 1_000)
            .unwrap()
            .into_iter()
            .map(|part| part.unwrap().size())
            .collect();
        assert_eq!(sizes, vec![1_000, 1_000, 1]);
    }

    #[test]
    fn test_parts_iterator_empty_stream() {
        let parts: Vec<PartRecord> = PartSplitter::new(Cursor::new(Vec::<u8>::new()), 1_000)
            .unwrap()
            .parts()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].is_empty());
    }

    #[test]
    fn test_parts_iterator_stops_after_error() {
        let mut parts = PartSplitter::new(Broken { ok: 1_500 }, 1_000)
            .unwrap()
            .parts();
        assert_eq!(parts.next().unwrap().unwrap().size(), 1_000);
        assert_eq!(
            parts.next().unwrap().unwrap_err().kind(),
            ErrorKind::ConnectionReset
        );
        assert!(parts.next().is_none());
        assert!(parts.next().is_none());
    }

    #[test]
    fn test_reader_is_handed_back() {
        let mut splitter = PartSplitter::new(Cursor::new(b"hello world".to_vec()), 4).unwrap();
        assert_eq!(splitter.get_ref().position(), 0);

        assert_eq!(splitter.next_part().unwrap().size(), 4);
        assert_eq!(splitter.get_ref().position(), 4);

        let mut parts = splitter.parts();
        assert_eq!(read_all(&mut parts.next().unwrap().unwrap()), b"o wo");

        let splitter = parts.into_inner();
        assert_eq!(splitter.part_size(), 4);

        let mut reader = splitter.into_inner();
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"rld");
    }
}
