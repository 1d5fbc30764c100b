//! Error types

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The endpoint is not a `scheme://host[:port]` URL with a usable host
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        endpoint: String,
        reason: EndpointReason,
    },

    /// The bucket name can not be used with virtual-hosted style requests
    #[error("invalid bucket name {bucket:?}: {reason}")]
    InvalidBucketName { bucket: String, reason: BucketReason },

    /// A value outside the domain accepted by the operation
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// A required string is empty or only whitespace
    #[error("{name} must not be empty")]
    EmptyValue { name: &'static str },

    /// Read failure of the input stream, kept as is
    #[error(transparent)]
    StreamRead(#[from] std::io::Error),

    #[error("unable to read config {}: {source}", .path.display())]
    ConfigRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("unable to parse config: {0}")]
    Config(#[from] serde_yaml_ng::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointReason {
    Malformed,
    MissingHost,
    HostTooLong,
    InvalidHost,
    ReservedSuffix,
}

impl fmt::Display for EndpointReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Malformed => "not a URL",
            Self::MissingHost => "missing host",
            Self::HostTooLong => "host longer than 255 characters",
            Self::InvalidHost => "host is not a valid DNS name",
            Self::ReservedSuffix => "only s3.amazonaws.com is allowed under amazonaws.com",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketReason {
    ContainsDot,
    Length,
    Pattern,
}

impl fmt::Display for BucketReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::ContainsDot => "dots are not allowed",
            Self::Length => "must be 3-63 characters long",
            Self::Pattern => "must match [A-Za-z][A-Za-z0-9-]+[A-Za-z0-9]",
        };
        f.write_str(reason)
    }
}

impl Error {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}
