use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}
