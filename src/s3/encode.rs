//! Percent-encoding for object keys and query values

use crate::{error::Result, s3::names::require_non_empty};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

// encode every byte except the unreserved characters:
// 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
// '/' is encoded too, a key is embedded as a single path segment
pub(crate) const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode an object key for a URL path segment
///
/// # Errors
///
/// Will return `Error::EmptyValue` if the key is empty or only whitespace
pub fn encode_object_name(object_name: &str) -> Result<String> {
    require_non_empty("object name", object_name)?;
    Ok(utf8_percent_encode(object_name, UNRESERVED).to_string())
}

/// Percent-encode a query value, `/` becomes `%2F`
#[must_use]
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}
