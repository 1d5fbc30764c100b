//! Integration tests for splitting streams into multipart parts
//!
//! These tests drive the splitter the way an upload loop does: fix the part
//! size once, then take parts until the stream is exhausted.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation
)]

mod common;

use common::{Uneven, init_logger, sample_data};
use s3prep::{
    Config, PartRecord, PartSizePolicy, PartSplitter,
    s3::tools::{md5_digest, sha256_digest},
    stream::next_part,
};
use std::{
    fs,
    io::{Cursor, Read},
    thread,
};

fn collect_parts<R: Read>(reader: R, part_size: u64) -> Vec<PartRecord> {
    PartSplitter::new(reader, part_size)
        .expect("valid part size")
        .parts()
        .collect::<std::io::Result<_>>()
        .expect("parts")
}

fn concat(parts: &mut [PartRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts.iter_mut() {
        part.read_to_end(&mut out).expect("read part");
    }
    out
}

#[test]
fn test_concatenated_parts_reproduce_stream() {
    init_logger();

    for (len, part_size) in [(0, 10), (1, 10), (10, 10), (11, 10), (10_000, 1_024), (65_537, 4_096)] {
        let data = sample_data(len);
        let mut parts = collect_parts(Cursor::new(data.clone()), part_size);

        assert_eq!(concat(&mut parts), data, "len {len}, part size {part_size}");

        let (last, full) = parts.split_last().expect("at least one part");
        assert!(full.iter().all(|p| p.size() == part_size));
        assert!(last.size() <= part_size);
        assert_eq!(parts.iter().map(PartRecord::size).sum::<u64>(), len as u64);
    }
}

#[test]
fn test_digests_cover_each_part() {
    let data = sample_data(5_000);
    let parts = collect_parts(Uneven::new(Cursor::new(data.clone())), 1_500);
    assert_eq!(parts.len(), 4);

    for (part, chunk) in parts.iter().zip(data.chunks(1_500)) {
        assert_eq!(part.size(), chunk.len() as u64);
        assert_eq!(*part.content_digest(), md5_digest(chunk));
        assert_eq!(*part.secure_digest(), sha256_digest(chunk));
    }
}

#[test]
fn test_digests_are_reproducible() {
    let data = sample_data(3_333);
    let first = collect_parts(Cursor::new(data.clone()), 1_000);
    let second = collect_parts(Uneven::new(Cursor::new(data)), 1_000);

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.content_digest(), b.content_digest());
        assert_eq!(a.secure_digest(), b.secure_digest());
        assert_eq!(a.content_md5(), b.content_md5());
        assert_eq!(a.sha256_hex(), b.sha256_hex());
    }
}

#[test]
fn test_upload_loop_until_empty_part() {
    let data = sample_data(2_048);
    let mut reader = Cursor::new(data.clone());
    let mut uploaded = Vec::new();

    loop {
        let mut part = next_part(&mut reader, 1_024).expect("part");
        if part.is_empty() {
            break;
        }
        part.read_to_end(&mut uploaded).expect("read part");
    }

    assert_eq!(uploaded, data);
}

#[test]
fn test_policy_drives_splitter() {
    let policy = PartSizePolicy::new(1_024, 8_192, 10).expect("valid limits");
    let data = sample_data(50_000);

    let part_size = policy.calculate(data.len() as i64).expect("part size");
    assert_eq!(part_size, 5_000);

    let parts = collect_parts(Cursor::new(data), part_size);
    assert_eq!(parts.len(), 10);

    let part_size = policy.calculate(-1).expect("part size");
    assert_eq!(part_size, 8_192);
}

#[test]
fn test_parts_upload_concurrently() {
    let data = sample_data(9_000);
    let parts = collect_parts(Cursor::new(data.clone()), 2_000);

    let handles: Vec<_> = parts
        .into_iter()
        .map(|mut part| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                part.read_to_end(&mut buf).expect("read part");
                (buf, part.content_md5())
            })
        })
        .collect();

    let mut joined = Vec::new();
    for handle in handles {
        let (bytes, md5) = handle.join().expect("thread");
        assert_eq!(md5, s3prep::s3::tools::base64_encode(md5_digest(&bytes)));
        joined.extend(bytes);
    }
    assert_eq!(joined, data);
}

#[test]
fn test_temp_files_released() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let config = Config {
        tmp_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };

    let splitter = config
        .splitter(Cursor::new(sample_data(3_000)), 1_000)
        .expect("splitter");
    let parts: Vec<PartRecord> = splitter
        .into_iter()
        .collect::<std::io::Result<_>>()
        .expect("parts");

    assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 3);
    drop(parts);
    assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
}
