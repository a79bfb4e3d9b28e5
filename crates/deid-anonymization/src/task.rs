use crate::error::AnonymizationError;
use deid_core::Dataset;
use std::{
    future::Future,
    num::NonZeroUsize,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct AnonymizationOutcome {
    pub dataset: Dataset,
    /// The k the run was requested with. Recorded, not verified.
    pub k: NonZeroUsize,
}

/// Handle to an anonymization running in the background.
///
/// Resolves once the run has completed or failed; there are no intermediate
/// results.
pub struct AnonymizationTask {
    handle: JoinHandle<Result<Dataset, AnonymizationError>>,
    k: NonZeroUsize,
}

impl AnonymizationTask {
    pub(crate) fn new(
        handle: JoinHandle<Result<Dataset, AnonymizationError>>,
        k: NonZeroUsize,
    ) -> Self {
        Self { handle, k }
    }

    /// Only takes effect if the run has not started yet.
    pub fn abort(&self) {
        self.handle.abort()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for AnonymizationTask {
    type Output = Result<AnonymizationOutcome, AnonymizationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let k = self.k;

        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => {
                Poll::Ready(result.map(|dataset| AnonymizationOutcome { dataset, k }))
            }
            Poll::Ready(Err(error)) => {
                Poll::Ready(Err(AnonymizationError::TaskAborted(error.to_string())))
            }
        }
    }
}
