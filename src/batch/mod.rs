//! Bounded batch execution.
//!
//! Runs a list of lazily built operations with a cap on how many are
//! unresolved at once. Everything is polled on the calling task; nothing is
//! spawned, so only I/O waits overlap.

use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::debug;

/// What an operation learns about itself when it is admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub index: usize,
    pub total: usize,
    /// Operations not yet resolved, this one included.
    pub outstanding: usize,
}

/// First failure observed in a batch.
#[derive(Debug)]
pub struct BatchError<E> {
    pub index: usize,
    pub source: E,
}

impl<E: fmt::Display> fmt::Display for BatchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation #{} failed: {}", self.index, self.source)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for BatchError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoundedBatch {
    concurrency: NonZeroUsize,
}

impl BoundedBatch {
    pub fn new(concurrency: NonZeroUsize) -> Self {
        Self { concurrency }
    }

    /// Runs every operation, keeping at most `concurrency` of them in flight.
    ///
    /// Each builder is called only when its operation is admitted, so no
    /// request exists before there is room for it. Completion order is
    /// arbitrary; outputs are returned in input order.
    ///
    /// The first failure ends the batch: no further operations are admitted
    /// and the ones still in flight are dropped, which cancels them. A
    /// request already sent may still take effect on the server.
    pub async fn run<I, F, Fut, T, E>(&self, operations: I) -> Result<Vec<T>, BatchError<E>>
    where
        I: IntoIterator<Item = F>,
        I::IntoIter: ExactSizeIterator,
        F: FnOnce(Dispatch) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut queue = operations.into_iter().enumerate();
        let total = queue.len();
        let limit = self.concurrency.get();

        let mut results: Vec<Option<T>> = Vec::with_capacity(total);
        results.resize_with(total, || None);

        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < limit {
                let Some((index, build)) = queue.next() else {
                    break;
                };
                let dispatch = Dispatch {
                    index,
                    total,
                    outstanding: queue.len() + in_flight.len() + 1,
                };
                let operation = build(dispatch);
                in_flight.push(async move { (index, operation.await) });
            }

            match in_flight.next().await {
                Some((index, Ok(output))) => results[index] = Some(output),
                Some((index, Err(source))) => {
                    debug!(
                        index,
                        dropped = in_flight.len(),
                        "batch operation failed, abandoning the rest"
                    );
                    return Err(BatchError { index, source });
                }
                None => break,
            }
        }

        Ok(results.into_iter().flatten().collect())
    }
}
