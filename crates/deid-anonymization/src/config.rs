use crate::directive::{AnonymizationRequest, ColumnDirectives, UnlistedTextPolicy};
use ::config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::{num::NonZeroUsize, path::Path};

const DEFAULT_THREAD_NAME_PREFIX: &str = "deid-worker";

fn default_thread_name_prefix() -> String {
    String::from(DEFAULT_THREAD_NAME_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContextConfig {
    /// Defaults to one worker per logical CPU.
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name_prefix: default_thread_name_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnConfiguration {
    pub name: String,
    pub interval: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnonymizationConfig {
    pub k: NonZeroUsize,
    #[serde(default)]
    pub unlisted_text: UnlistedTextPolicy,
    #[serde(default)]
    pub columns: Vec<ColumnConfiguration>,
    #[serde(default)]
    pub context: ContextConfig,
}

impl AnonymizationConfig {
    pub fn into_parts(self) -> (AnonymizationRequest, ContextConfig) {
        let request = AnonymizationRequest::from(&self);
        (request, self.context)
    }
}

impl From<&AnonymizationConfig> for AnonymizationRequest {
    /// A column listed twice keeps its last interval.
    fn from(config: &AnonymizationConfig) -> Self {
        let directives: ColumnDirectives = config
            .columns
            .iter()
            .map(|column| (column.name.clone(), column.interval))
            .collect();

        AnonymizationRequest::new(directives, config.k).with_unlisted_text(config.unlisted_text)
    }
}

/// Reads a config file (format taken from its extension). `DEID_*`
/// environment variables override top level keys, `DEID_CONTEXT__WORKER_THREADS`
/// reaches into sections.
pub fn load_config(path: &Path) -> Result<AnonymizationConfig, ConfigError> {
    Config::builder()
        .add_source(File::from(path))
        .add_source(
            Environment::with_prefix("DEID")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

pub fn parse_config(
    contents: &str,
    format: FileFormat,
) -> Result<AnonymizationConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(contents, format))
        .build()?
        .try_deserialize()
}
