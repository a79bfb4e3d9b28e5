mod anonymizer;
pub mod column_transformations;
mod config;
mod context;
mod directive;
mod error;
mod task;

pub use crate::anonymizer::anonymize;
pub use crate::config::{
    load_config, parse_config, AnonymizationConfig, ColumnConfiguration, ContextConfig,
};
pub use crate::context::ExecutionContext;
pub use crate::directive::{
    AnonymizationRequest, ColumnDirectives, IntervalSize, UnlistedTextPolicy,
};
pub use crate::error::AnonymizationError;
pub use crate::task::{AnonymizationOutcome, AnonymizationTask};
pub use ::config::FileFormat;
