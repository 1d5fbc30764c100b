pub mod encode;
pub mod limits;
pub mod names;
pub mod part_size;
pub mod target;
pub mod tools;

pub use self::{part_size::PartSizePolicy, target::TargetUrl};
