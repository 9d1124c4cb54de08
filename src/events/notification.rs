//! Notification and handler contracts.

use std::any::Any;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::HandlerError;

/// Marker trait for event payloads.
///
/// A notification is an immutable value describing something that already
/// happened. It has no identity beyond its type and fields, and it is never
/// mutated after publication. Implement this explicitly for each event type
/// so the handler registry can key on the concrete type.
pub trait Notification: Any + Send + Sync + 'static {}

/// An asynchronous unit of work reacting to one notification type.
///
/// Handlers receive the cancellation token of the publish call that invoked
/// them. The publisher never cancels handlers on its own; an already
/// cancelled token is for the handler to observe and bail out on its own
/// terms, and that outcome is treated like any other handler failure.
#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync {
    async fn handle(
        &self,
        notification: &N,
        cancellation: CancellationToken,
    ) -> Result<(), HandlerError>;
}
