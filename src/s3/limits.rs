//! S3 multipart limits
//!
//! Defaults used by [`PartSizePolicy`](crate::s3::PartSizePolicy). Backends with
//! different quotas pass their own values to `PartSizePolicy::new` or set them
//! in the config file instead of changing these.
//!
//! # References
//! - [S3 Quotas](https://docs.aws.amazon.com/AmazonS3/latest/userguide/qfacts.html)
//! - [Multipart Upload Overview](https://docs.aws.amazon.com/AmazonS3/latest/userguide/mpuoverview.html)

/// Maximum size of a single S3 object, 5 TiB (5,497,558,138,880 bytes)
pub const MAX_OBJECT_SIZE_BYTES: u64 = 5_497_558_138_880;

/// Maximum size of a multipart part, 5 GiB (5,368,709,120 bytes)
pub const MAX_PART_SIZE_BYTES: u64 = 5_368_709_120;

/// Minimum size of a multipart part, 5 MiB (5,242,880 bytes)
///
/// The last part can be smaller than this minimum.
pub const MIN_PART_SIZE_BYTES: u64 = 5_242_880;

/// Maximum number of parts in a multipart upload, numbered 1 to 10,000
pub const MAX_PARTS_PER_UPLOAD: u64 = 10_000;

/// Divisor applied to a known length, one below [`MAX_PARTS_PER_UPLOAD`] so
/// the last part carrying the remainder still fits
pub const PART_SIZE_DIVISOR: u64 = MAX_PARTS_PER_UPLOAD - 1;

/// Size of each read while filling a part (1 KiB)
pub const READ_SIZE_BYTES: usize = 1_024;
