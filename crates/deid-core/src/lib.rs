mod dataset;
mod error;

pub use crate::dataset::ColumnKind;
pub use crate::dataset::Dataset;
pub use crate::error::DatasetError;
