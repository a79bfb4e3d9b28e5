use crate::column_transformations::ColumnTransformationError;
use arrow::datatypes::DataType;
use deid_core::DatasetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnonymizationError {
    #[error("invalid interval size {interval} for column {column}: must be greater than zero")]
    InvalidInterval { column: String, interval: i64 },

    #[error("column {column} has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: DataType },

    #[error(transparent)]
    Transformation(#[from] ColumnTransformationError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("anonymization task aborted: {0}")]
    TaskAborted(String),
}
