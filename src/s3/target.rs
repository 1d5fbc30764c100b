//! Target URL for a request
//!
//! The URL is composed as a plain string and query pairs are always sorted by
//! key, the same inputs give byte-identical URLs so a signer can canonicalize
//! over them.

use crate::{
    error::Result,
    s3::{
        encode::{encode_object_name, encode_query_value},
        names::{Endpoint, validate_bucket_name, validate_endpoint},
    },
};
use std::{collections::BTreeMap, fmt};
use url::Url;

// hosts containing this use virtual-hosted style, <bucket>.<host>
const VIRTUAL_HOST_MARKER: &str = "amazonaws.com";

/// A composed request URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetUrl(String);

impl TargetUrl {
    #[must_use]
    pub fn builder(endpoint: &str) -> TargetUrlBuilder<'_> {
        TargetUrlBuilder::new(endpoint)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// # Errors
    ///
    /// Will return `Err` if the string can not be parsed back to a `Url`
    pub fn to_url(&self) -> std::result::Result<Url, url::ParseError> {
        Url::parse(&self.0)
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TargetUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<TargetUrl> for String {
    fn from(url: TargetUrl) -> Self {
        url.0
    }
}

#[derive(Debug, Clone)]
pub struct TargetUrlBuilder<'a> {
    endpoint: &'a str,
    bucket: Option<&'a str>,
    object: Option<&'a str>,
    query: BTreeMap<&'a str, Option<&'a str>>,
}

impl<'a> TargetUrlBuilder<'a> {
    #[must_use]
    pub fn new(endpoint: &'a str) -> Self {
        Self {
            endpoint,
            bucket: None,
            object: None,
            query: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn bucket(mut self, bucket: &'a str) -> Self {
        self.bucket = Some(bucket);
        self
    }

    #[must_use]
    pub fn object(mut self, object: &'a str) -> Self {
        self.object = Some(object);
        self
    }

    /// Add a `key=value` pair, a later value for the same key replaces the first
    #[must_use]
    pub fn query(mut self, key: &'a str, value: &'a str) -> Self {
        self.query.insert(key, Some(value));
        self
    }

    /// Add a valueless `key`, for example `?acl` or `?uploads`
    #[must_use]
    pub fn flag(mut self, key: &'a str) -> Self {
        self.query.insert(key, None);
        self
    }

    #[must_use]
    pub fn query_pairs<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        self.query.extend(pairs);
        self
    }

    /// # Errors
    ///
    /// Will return `Err` if the endpoint, bucket name or object name is invalid
    pub fn build(&self) -> Result<TargetUrl> {
        validate_endpoint(self.endpoint)?;
        let endpoint = Endpoint::parse(self.endpoint)?;
        let authority = endpoint.authority();

        let mut url = match self.bucket {
            None => format!("{}://{authority}", endpoint.scheme),
            Some(bucket) => {
                validate_bucket_name(bucket)?;

                if authority.contains(VIRTUAL_HOST_MARKER) {
                    if !endpoint.host.ends_with(VIRTUAL_HOST_MARKER) {
                        log::warn!(
                            "Host {} contains {VIRTUAL_HOST_MARKER} but is not under it, using virtual-hosted style",
                            endpoint.host
                        );
                    }
                    format!("{}://{bucket}.{authority}", endpoint.scheme)
                } else {
                    format!("{}://{authority}/{bucket}", endpoint.scheme)
                }
            }
        };

        url.push('/');

        if let Some(object) = self.object {
            url.push_str(&encode_object_name(object)?);
        }

        let query = query_string(&self.query);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        log::debug!("Target URL: {url}");

        Ok(TargetUrl(url))
    }
}

fn query_string(query: &BTreeMap<&str, Option<&str>>) -> String {
    query
        .iter()
        .map(|(key, value)| match value {
            Some(value) => format!("{key}={}", encode_query_value(value)),
            None => (*key).to_string(),
        })
        .collect::<Vec<String>>()
        .join("&")
}

/// Compose the URL for `endpoint`, optional `bucket` and `object`, and optional
/// query pairs where a `None` value renders as a bare key
///
/// # Errors
///
/// Will return `Err` if the endpoint, bucket name or object name is invalid
pub fn build<'a, I>(
    endpoint: &'a str,
    bucket: Option<&'a str>,
    object: Option<&'a str>,
    query: I,
) -> Result<TargetUrl>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut builder = TargetUrlBuilder::new(endpoint).query_pairs(query);
    builder.bucket = bucket;
    builder.object = object;
    builder.build()
}
