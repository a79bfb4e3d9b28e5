use crate::{
    anonymizer::{ColumnAction, ColumnPlan},
    config::ContextConfig,
    directive::AnonymizationRequest,
    error::AnonymizationError,
    task::AnonymizationTask,
};
use deid_core::Dataset;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, info_span};

/// Owns the worker pool anonymization runs on.
///
/// Contexts are created explicitly and release their workers when dropped or
/// shut down. Nothing is cached between runs, so one context can serve any
/// number of independent requests.
pub struct ExecutionContext {
    pool: rayon::ThreadPool,
}

impl ExecutionContext {
    pub fn new(config: ContextConfig) -> Result<Self, AnonymizationError> {
        let prefix = config.thread_name_prefix;
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(move |index| format!("{}-{}", prefix, index));

        if let Some(worker_threads) = config.worker_threads {
            builder = builder.num_threads(worker_threads);
        }

        let pool = builder.build()?;
        debug!(
            threads = pool.current_num_threads(),
            "execution context created"
        );

        Ok(Self { pool })
    }

    /// Runs `f` with a fresh context and releases it afterwards.
    pub fn scoped<T, F>(config: ContextConfig, f: F) -> Result<T, AnonymizationError>
    where
        F: FnOnce(&ExecutionContext) -> T,
    {
        let context = Self::new(config)?;
        let result = f(&context);
        context.shutdown();
        Ok(result)
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Same result as [`crate::anonymize`], with columns transformed in
    /// parallel on this context's workers.
    pub fn anonymize(
        &self,
        dataset: &Dataset,
        request: &AnonymizationRequest,
    ) -> Result<Dataset, AnonymizationError> {
        let span = info_span!(
            "anonymize",
            k = request.k.get(),
            columns = dataset.num_columns(),
            rows = dataset.num_rows()
        );
        let _entered = span.enter();

        let plan = ColumnPlan::resolve(&dataset.schema(), request)?;

        for column in plan.unmatched() {
            debug!(column = column.as_str(), "no such column, directive ignored");
        }

        for (index, name) in dataset.column_names().into_iter().enumerate() {
            match plan.action(index) {
                ColumnAction::Passthrough => debug!(column = name, "passthrough"),
                ColumnAction::Transform { kind, .. } => {
                    debug!(column = name, kind = ?kind, "transform")
                }
            }
        }

        let columns = self.pool.install(|| {
            (0..plan.len())
                .into_par_iter()
                .map(|index| plan.transform_column(dataset, index))
                .collect::<Result<Vec<_>, _>>()
        })?;

        let output = ColumnPlan::assemble(dataset, columns)?;
        info!("anonymization finished");

        Ok(output)
    }

    /// Runs [`ExecutionContext::anonymize`] on tokio's blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        self: &Arc<Self>,
        dataset: Dataset,
        request: AnonymizationRequest,
    ) -> AnonymizationTask {
        let context = Arc::clone(self);
        let k = request.k;
        let handle =
            tokio::task::spawn_blocking(move || context.anonymize(&dataset, &request));

        AnonymizationTask::new(handle, k)
    }

    pub fn shutdown(self) {
        drop(self)
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        debug!("execution context released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::ColumnDirectives;
    use arrow::{
        array::{Float64Array, Int32Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use std::num::NonZeroUsize;

    fn wide_dataset() -> Dataset {
        let schema = Schema::new(vec![
            Field::new("age", DataType::Int32, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("income", DataType::Float64, false),
            Field::new("city", DataType::Utf8, false),
        ]);

        Dataset::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from((0..200).collect::<Vec<i32>>())),
                Arc::new(StringArray::from(
                    (0..200).map(|i| format!("person-{}", i % 17)).collect::<Vec<_>>(),
                )),
                Arc::new(Float64Array::from(
                    (0..200).map(|i| i as f64 * 1234.5).collect::<Vec<_>>(),
                )),
                Arc::new(StringArray::from(
                    (0..200).map(|i| format!("city-{}", i % 5)).collect::<Vec<_>>(),
                )),
            ],
        )
        .unwrap()
    }

    fn request() -> AnonymizationRequest {
        AnonymizationRequest::new(
            ColumnDirectives::new().with("age", 10).with("income", 5000),
            NonZeroUsize::new(3).unwrap(),
        )
    }

    #[test]
    fn test_matches_sequential_result() {
        let dataset = wide_dataset();
        let context = ExecutionContext::new(ContextConfig {
            worker_threads: Some(4),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(context.num_threads(), 4);
        assert_eq!(
            context.anonymize(&dataset, &request()).unwrap(),
            crate::anonymize(&dataset, &request()).unwrap()
        );
    }

    #[test]
    fn test_scoped() {
        let dataset = wide_dataset();
        let output = ExecutionContext::scoped(ContextConfig::default(), |context| {
            context.anonymize(&dataset, &request())
        })
        .unwrap()
        .unwrap();

        assert_eq!(output.num_rows(), 200);
        assert_eq!(output.column_names(), dataset.column_names());
    }

    #[test]
    fn test_invalid_interval() {
        let dataset = wide_dataset();
        let context = ExecutionContext::new(ContextConfig::default()).unwrap();
        let request = AnonymizationRequest::new(
            ColumnDirectives::new().with("age", 0),
            NonZeroUsize::new(3).unwrap(),
        );

        assert!(matches!(
            context.anonymize(&dataset, &request),
            Err(AnonymizationError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_worker_thread_names() {
        let context = ExecutionContext::new(ContextConfig {
            worker_threads: Some(1),
            thread_name_prefix: String::from("test-pool"),
        })
        .unwrap();

        let name = context
            .pool
            .install(|| std::thread::current().name().map(String::from));

        assert_eq!(name.as_deref(), Some("test-pool-0"));
    }
}
