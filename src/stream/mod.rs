pub mod digest;
pub mod part;
pub mod splitter;

pub use self::{
    digest::PartDigest,
    part::PartRecord,
    splitter::{PartSplitter, Parts, next_part},
};
