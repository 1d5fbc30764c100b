//! Endpoint, bucket and string validation
//!
//! Bucket names follow the restricted DNS rules needed for virtual-hosted
//! style requests. Dots are valid DNS but are rejected here because
//! `bucket.with.dots.s3.amazonaws.com` does not match the wildcard TLS
//! certificate.

use crate::error::{BucketReason, EndpointReason, Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// The only host allowed under the `amazonaws.com` suffix
pub const AWS_CANONICAL_HOST: &str = "s3.amazonaws.com";

const AWS_SUFFIX: &str = "amazonaws.com";

const MAX_HOST_LENGTH: usize = 255;

// (label.)*label, labels 1-63 chars without leading or trailing hyphen
#[allow(clippy::expect_used)]
static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$")
        .expect("Invalid hostname regex pattern")
});

#[allow(clippy::expect_used)]
static BUCKET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9-]+[A-Za-z0-9]$").expect("Invalid bucket regex pattern")
});

/// An endpoint split into the parts needed to compose a target URL
///
/// `host` and `port` are kept as written (host lowercased), `url` would
/// rewrite IDNA names to punycode, decode percent escapes and drop default
/// ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: Option<String>,
}

impl Endpoint {
    pub(crate) fn parse(endpoint: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let url = Url::parse(endpoint).map_err(|e| match e {
            url::ParseError::EmptyHost => invalid(EndpointReason::MissingHost),
            _ => invalid(EndpointReason::Malformed),
        })?;

        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid(EndpointReason::MissingHost));
        }

        let authority = endpoint
            .split_once("://")
            .and_then(|(_, rest)| rest.split(['/', '?', '#']).next())
            .ok_or_else(|| invalid(EndpointReason::Malformed))?;

        // drop user info
        let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) if !port.contains(']') => (host, Some(port)),
            _ => (host_port, None),
        };

        if host.is_empty() {
            return Err(invalid(EndpointReason::MissingHost));
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_lowercase(),
            port: port.filter(|p| !p.is_empty()).map(str::to_string),
        })
    }

    /// `host[:port]`
    pub(crate) fn authority(&self) -> String {
        match &self.port {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        }
    }
}

/// Validate an endpoint of the form `scheme://host[:port]`
///
/// Returns the hostname without a trailing dot.
///
/// # Errors
///
/// Will return `Error::InvalidEndpoint` when the host is missing, longer than
/// 255 characters, not a DNS name or a host under `amazonaws.com` other than
/// `s3.amazonaws.com`
pub fn validate_endpoint(endpoint: &str) -> Result<String> {
    require_non_empty("endpoint", endpoint)?;

    let parsed = Endpoint::parse(endpoint)?;
    let invalid = |reason| Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    if parsed.host.chars().count() > MAX_HOST_LENGTH {
        return Err(invalid(EndpointReason::HostTooLong));
    }

    let host = parsed.host.strip_suffix('.').unwrap_or(parsed.host.as_str());

    if !HOSTNAME.is_match(host) {
        return Err(invalid(EndpointReason::InvalidHost));
    }

    if host.ends_with(AWS_SUFFIX) && host != AWS_CANONICAL_HOST {
        return Err(invalid(EndpointReason::ReservedSuffix));
    }

    Ok(host.to_string())
}

/// Validate a bucket name
///
/// # Errors
///
/// Will return `Error::InvalidBucketName` if the name contains a dot, is not
/// 3-63 characters long or does not match `^[A-Za-z][A-Za-z0-9-]+[A-Za-z0-9]$`
pub fn validate_bucket_name(bucket: &str) -> Result<&str> {
    let invalid = |reason| Error::InvalidBucketName {
        bucket: bucket.to_string(),
        reason,
    };

    if bucket.contains('.') {
        return Err(invalid(BucketReason::ContainsDot));
    }

    let length = bucket.chars().count();
    if !(3..=63).contains(&length) {
        return Err(invalid(BucketReason::Length));
    }

    if !BUCKET_NAME.is_match(bucket) {
        return Err(invalid(BucketReason::Pattern));
    }

    Ok(bucket)
}

/// Returns `value` unless it is empty or only whitespace
///
/// # Errors
///
/// Will return `Error::EmptyValue` naming the rejected field
pub fn require_non_empty<'a>(name: &'static str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::EmptyValue { name });
    }
    Ok(value)
}
