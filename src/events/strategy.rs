//! Dispatch strategies: how one notification reaches its handlers.
//!
//! Every strategy shares one shape: it takes the resolved handler
//! invocations and the call's cancellation token, and yields a single
//! completion result. The sequential strategies await each handler before
//! starting the next; the concurrent ones spawn every handler onto the tokio
//! worker pool. A spawned handler's synchronous prelude runs inside its
//! task, so a panic in either phase surfaces as a join error and both kinds
//! are merged into the same aggregate by the collecting strategies.

use std::fmt;
use std::str::FromStr;

use futures::future::{select_all, try_join_all, BoxFuture};
use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use super::error::{HandlerError, PublishError};
use super::registry::HandlerFuture;

/// One handler invocation bound to one notification, not yet started.
pub(crate) struct HandlerInvocation {
    start: Box<dyn FnOnce(CancellationToken) -> HandlerFuture + Send>,
}

impl HandlerInvocation {
    pub(crate) fn new(
        start: impl FnOnce(CancellationToken) -> HandlerFuture + Send + 'static,
    ) -> Self {
        Self {
            start: Box::new(start),
        }
    }

    fn run(self, cancellation: CancellationToken) -> HandlerFuture {
        (self.start)(cancellation)
    }
}

/// A dispatcher routine; the publisher holds one per strategy.
pub(crate) type DispatchFn =
    fn(Vec<HandlerInvocation>, CancellationToken) -> BoxFuture<'static, Result<(), PublishError>>;

/// Policy selecting handler invocation order, concurrency, and failure
/// aggregation for one publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStrategy {
    /// One handler at a time, in registration order; the first failure
    /// aborts the remaining handlers and is propagated as-is.
    SequentialStopOnError,

    /// One handler at a time, in registration order; failures are collected
    /// and the call fails with an aggregate of all of them once every
    /// handler has run.
    SequentialContinueOnError,

    /// All handlers spawned at once; panics and returned errors from every
    /// handler are collected into one flat aggregate after all complete.
    ConcurrentContinueOnError,

    /// All handlers spawned at once; succeeds once every handler has
    /// succeeded, fails with the first failure the join surfaces.
    ConcurrentWaitAll,

    /// All handlers spawned at once; completes when the first handler
    /// completes, whether it succeeded or failed. The outcomes of the
    /// remaining handlers are never observed.
    ConcurrentWaitAny,

    /// All handlers spawned at once; returns immediately. No handler
    /// outcome, including a panic while a handler starts up, is ever
    /// observed. Fire-and-forget in the strictest sense.
    ConcurrentNoWait,
}

impl PublishStrategy {
    pub const ALL: [PublishStrategy; 6] = [
        PublishStrategy::SequentialStopOnError,
        PublishStrategy::SequentialContinueOnError,
        PublishStrategy::ConcurrentContinueOnError,
        PublishStrategy::ConcurrentWaitAll,
        PublishStrategy::ConcurrentWaitAny,
        PublishStrategy::ConcurrentNoWait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SequentialStopOnError => "sequential_stop_on_error",
            Self::SequentialContinueOnError => "sequential_continue_on_error",
            Self::ConcurrentContinueOnError => "concurrent_continue_on_error",
            Self::ConcurrentWaitAll => "concurrent_wait_all",
            Self::ConcurrentWaitAny => "concurrent_wait_any",
            Self::ConcurrentNoWait => "concurrent_no_wait",
        }
    }

    pub(crate) fn dispatcher(&self) -> DispatchFn {
        match self {
            Self::SequentialStopOnError => {
                |invocations, ct| Box::pin(sequential_stop_on_error(invocations, ct))
            }
            Self::SequentialContinueOnError => {
                |invocations, ct| Box::pin(sequential_continue_on_error(invocations, ct))
            }
            Self::ConcurrentContinueOnError => {
                |invocations, ct| Box::pin(concurrent_continue_on_error(invocations, ct))
            }
            Self::ConcurrentWaitAll => {
                |invocations, ct| Box::pin(concurrent_wait_all(invocations, ct))
            }
            Self::ConcurrentWaitAny => {
                |invocations, ct| Box::pin(concurrent_wait_any(invocations, ct))
            }
            Self::ConcurrentNoWait => |invocations, ct| Box::pin(concurrent_no_wait(invocations, ct)),
        }
    }
}

impl fmt::Display for PublishStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a strategy tag from configuration or user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown publish strategy: {0}")]
pub struct ParseStrategyError(pub String);

impl FromStr for PublishStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublishStrategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}

async fn sequential_stop_on_error(
    invocations: Vec<HandlerInvocation>,
    cancellation: CancellationToken,
) -> Result<(), PublishError> {
    for invocation in invocations {
        invocation.run(cancellation.clone()).await?;
    }
    Ok(())
}

async fn sequential_continue_on_error(
    invocations: Vec<HandlerInvocation>,
    cancellation: CancellationToken,
) -> Result<(), PublishError> {
    let mut failures = Vec::new();
    for invocation in invocations {
        if let Err(error) = invocation.run(cancellation.clone()).await {
            collect_flattened(&mut failures, error);
        }
    }
    into_aggregate(failures)
}

async fn concurrent_continue_on_error(
    invocations: Vec<HandlerInvocation>,
    cancellation: CancellationToken,
) -> Result<(), PublishError> {
    let tasks = spawn_all(invocations, &cancellation);

    let mut failures = Vec::new();
    for task in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => collect_flattened(&mut failures, error),
            Err(join_error) => failures.push(join_failure(join_error)),
        }
    }
    into_aggregate(failures)
}

async fn concurrent_wait_all(
    invocations: Vec<HandlerInvocation>,
    cancellation: CancellationToken,
) -> Result<(), PublishError> {
    let tasks = spawn_all(invocations, &cancellation);

    try_join_all(tasks.into_iter().map(|task| async move {
        match task.await {
            Ok(result) => result,
            Err(join_error) => Err(join_failure(join_error)),
        }
    }))
    .await
    .map(|_| ())
    .map_err(PublishError::from)
}

async fn concurrent_wait_any(
    invocations: Vec<HandlerInvocation>,
    cancellation: CancellationToken,
) -> Result<(), PublishError> {
    if invocations.is_empty() {
        return Ok(());
    }
    let tasks = spawn_all(invocations, &cancellation);

    // Whichever handler finishes first wins, failed or not. The remaining
    // handlers keep running on the pool; their outcomes are dropped.
    let _ = select_all(tasks).await;
    Ok(())
}

async fn concurrent_no_wait(
    invocations: Vec<HandlerInvocation>,
    cancellation: CancellationToken,
) -> Result<(), PublishError> {
    spawn_all(invocations, &cancellation);
    Ok(())
}

fn spawn_all(
    invocations: Vec<HandlerInvocation>,
    cancellation: &CancellationToken,
) -> Vec<JoinHandle<Result<(), HandlerError>>> {
    invocations
        .into_iter()
        .map(|invocation| tokio::spawn(invocation.run(cancellation.clone())))
        .collect()
}

fn join_failure(error: JoinError) -> HandlerError {
    if error.is_cancelled() {
        return HandlerError::Cancelled;
    }
    match error.try_into_panic() {
        Ok(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            HandlerError::Panic(message)
        }
        Err(error) => HandlerError::Message(error.to_string()),
    }
}

/// Folds one failure into the running cause list, flattening an aggregate
/// exactly one level so callers always see a flat list.
fn collect_flattened(failures: &mut Vec<HandlerError>, error: HandlerError) {
    match error {
        HandlerError::Aggregate(causes) => failures.extend(causes),
        other => failures.push(other),
    }
}

fn into_aggregate(failures: Vec<HandlerError>) -> Result<(), PublishError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(PublishError::Aggregate(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("sequential_stop_on_error", PublishStrategy::SequentialStopOnError)]
    #[test_case("sequential_continue_on_error", PublishStrategy::SequentialContinueOnError)]
    #[test_case("concurrent_continue_on_error", PublishStrategy::ConcurrentContinueOnError)]
    #[test_case("concurrent_wait_all", PublishStrategy::ConcurrentWaitAll)]
    #[test_case("concurrent_wait_any", PublishStrategy::ConcurrentWaitAny)]
    #[test_case("concurrent_no_wait", PublishStrategy::ConcurrentNoWait)]
    fn strategy_tags_round_trip(tag: &str, strategy: PublishStrategy) {
        assert_eq!(strategy.as_str(), tag);
        assert_eq!(tag.parse::<PublishStrategy>().unwrap(), strategy);
    }

    #[test]
    fn unknown_tag_is_named_in_the_parse_error() {
        let error = "parallel_whenever".parse::<PublishStrategy>().unwrap_err();
        assert_eq!(error, ParseStrategyError("parallel_whenever".to_string()));
        assert!(error.to_string().contains("parallel_whenever"));
    }

    #[test]
    fn flattening_never_nests_aggregates() {
        let mut failures = Vec::new();
        collect_flattened(&mut failures, HandlerError::message("plain"));
        collect_flattened(
            &mut failures,
            HandlerError::Aggregate(vec![
                HandlerError::message("inner-1"),
                HandlerError::message("inner-2"),
            ]),
        );

        assert_eq!(failures.len(), 3);
        assert!(failures
            .iter()
            .all(|f| !matches!(f, HandlerError::Aggregate(_))));
    }
}
