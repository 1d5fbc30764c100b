//! Request preparation for S3 compatible object storage.
//!
//! Before a request is sent an S3 client needs three things from this crate:
//!
//! * a validated endpoint and bucket name, see [`s3::names`]
//! * a canonical target URL, see [`s3::target::build`]
//! * the upload body split into multipart parts with their `MD5` and
//!   `SHA256` digests, see [`stream::PartSplitter`]
//!
//! Transport, signing and retries belong to the caller.

pub mod config;
pub mod error;
pub mod s3;
pub mod stream;

pub use self::{
    config::Config,
    error::{BucketReason, EndpointReason, Error, Result},
    s3::{PartSizePolicy, TargetUrl},
    stream::{PartRecord, PartSplitter},
};
