//! Part size for multipart uploads
//!
//! Called once per upload, the returned size is then used for every part of
//! that upload.

use crate::{
    error::{Error, Result},
    s3::limits::{MAX_PART_SIZE_BYTES, MIN_PART_SIZE_BYTES, PART_SIZE_DIVISOR},
};

/// Total length of a stream whose size is not known in advance
pub const UNKNOWN_LENGTH: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartSizePolicy {
    min_part_size: u64,
    max_part_size: u64,
    divisor: u64,
}

impl Default for PartSizePolicy {
    fn default() -> Self {
        Self {
            min_part_size: MIN_PART_SIZE_BYTES,
            max_part_size: MAX_PART_SIZE_BYTES,
            divisor: PART_SIZE_DIVISOR,
        }
    }
}

impl PartSizePolicy {
    /// Limits for backends that differ from AWS
    ///
    /// # Errors
    ///
    /// Will return `Error::InvalidArgument` if `min_part_size` is 0 or greater
    /// than `max_part_size`, or if `divisor` is 0
    pub fn new(min_part_size: u64, max_part_size: u64, divisor: u64) -> Result<Self> {
        if min_part_size == 0 {
            return Err(Error::invalid_argument("min_part_size", "must be greater than 0"));
        }

        if min_part_size > max_part_size {
            return Err(Error::invalid_argument(
                "min_part_size",
                format!("{min_part_size} is greater than max_part_size {max_part_size}"),
            ));
        }

        if divisor == 0 {
            return Err(Error::invalid_argument("part_divisor", "must be greater than 0"));
        }

        Ok(Self {
            min_part_size,
            max_part_size,
            divisor,
        })
    }

    #[must_use]
    pub const fn min_part_size(&self) -> u64 {
        self.min_part_size
    }

    #[must_use]
    pub const fn max_part_size(&self) -> u64 {
        self.max_part_size
    }

    #[must_use]
    pub const fn divisor(&self) -> u64 {
        self.divisor
    }

    /// Part size for a stream of `total_length` bytes, [`UNKNOWN_LENGTH`] when
    /// the size is not known, in that case the largest part size is used
    ///
    /// # Errors
    ///
    /// Will return `Error::InvalidArgument` if `total_length` is below -1
    pub fn calculate(&self, total_length: i64) -> Result<u64> {
        if total_length == UNKNOWN_LENGTH {
            return Ok(self.max_part_size);
        }

        let length = u64::try_from(total_length).map_err(|_| {
            Error::invalid_argument(
                "total_length",
                format!("{total_length} is negative, use -1 for an unknown length"),
            )
        })?;

        Ok(self.for_length(length))
    }

    /// Part size for a known length
    #[must_use]
    pub fn for_length(&self, length: u64) -> u64 {
        // leave room so the last part with the remainder never starves
        let proposed = length / self.divisor;

        if proposed > self.max_part_size {
            return self.max_part_size;
        }

        proposed.max(self.min_part_size)
    }
}
