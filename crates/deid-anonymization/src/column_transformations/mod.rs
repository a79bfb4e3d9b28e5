mod generalize;
mod pseudonymize;

pub use generalize::Generalize;
pub use pseudonymize::Pseudonymize;

use crate::directive::IntervalSize;
use arrow::{array::ArrayRef, datatypes::DataType, error::ArrowError};
use deid_core::ColumnKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColumnTransformationError {
    #[error("unsupported type: {0}")]
    UnsupportedType(DataType),

    #[error("failed to downcast array")]
    DowncastFailed,

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

pub type ColumnTransformationResult<T> = Result<T, ColumnTransformationError>;

pub struct ColumnTransformationOutput {
    pub data_type: DataType,
    /// Whether the transformation can produce nulls for non-null input.
    pub nullable: bool,
}

pub trait ColumnTransformation: Send + Sync {
    fn transform_data(&self, data: ArrayRef) -> ColumnTransformationResult<ArrayRef>;
    fn output_format(&self, input: &DataType)
        -> ColumnTransformationResult<ColumnTransformationOutput>;
}

/// Picks the transformation for a column kind. Text columns ignore the interval.
pub fn transformation_for(
    kind: ColumnKind,
    interval: IntervalSize,
) -> Box<dyn ColumnTransformation> {
    match kind {
        ColumnKind::Numeric => Box::new(Generalize::new(interval)),
        ColumnKind::Text => Box::new(Pseudonymize),
    }
}
