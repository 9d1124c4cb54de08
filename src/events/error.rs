//! Failure types for notification dispatch.

use super::strategy::PublishStrategy;

/// Failure of a single handler invocation.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler reported an error of its own.
    #[error("{0}")]
    Message(String),

    /// The handler panicked while starting or running.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// The handler observed its cancellation token and bailed out.
    #[error("handler was cancelled")]
    Cancelled,

    /// Multiple underlying failures, e.g. from a handler that fanned out to
    /// further handlers itself. Collecting strategies flatten this one level
    /// into their own cause list instead of nesting it.
    #[error("{} underlying handler failure(s)", .0.len())]
    Aggregate(Vec<HandlerError>),

    /// Any other error raised while handling the notification.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Failure of one publish call.
///
/// A failing publish yields exactly one value of this type; per-handler
/// errors are never streamed to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The requested strategy has no dispatcher. This is a programming
    /// error, reported before any handler is resolved or invoked, and never
    /// silently mapped to the default strategy.
    #[error("unknown publish strategy: {0}")]
    UnknownStrategy(PublishStrategy),

    /// A single handler failure propagated by a stop-on-error or wait-all
    /// dispatch.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// All failures observed by a continue-on-error dispatch. The cause list
    /// is flat: a cause that was itself an aggregate contributed its causes,
    /// not itself, so nesting never exceeds one level.
    #[error("{} notification handler(s) failed", .0.len())]
    Aggregate(Vec<HandlerError>),
}

impl From<PublishError> for HandlerError {
    /// Lets a handler forward the outcome of a nested publish as its own
    /// failure. Aggregates stay aggregates so the outer dispatch can flatten
    /// them.
    fn from(error: PublishError) -> Self {
        match error {
            PublishError::Aggregate(causes) => HandlerError::Aggregate(causes),
            PublishError::Handler(cause) => cause,
            other @ PublishError::UnknownStrategy(_) => HandlerError::Message(other.to_string()),
        }
    }
}
