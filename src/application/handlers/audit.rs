//! Audit trail for domain events.

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::domain::events::{
    PostCreated, PostDeleted, TicketClosed, TicketMessagePosted, TicketOpened,
};
use crate::events::{HandlerError, NotificationHandler};

/// Writes every domain event to the log as structured JSON.
///
/// Registered for all event types, so it also serves as a liveness signal
/// for the dispatch pipeline: a missing audit line means the event never
/// reached its handlers.
pub struct AuditLogHandler;

impl AuditLogHandler {
    fn record<E: Serialize>(&self, kind: &str, event: &E) -> Result<(), HandlerError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| HandlerError::message(format!("failed to encode {kind} event: {e}")))?;
        tracing::info!(target: "modulith::audit", kind, %payload, "domain event");
        Ok(())
    }
}

#[async_trait]
impl NotificationHandler<PostCreated> for AuditLogHandler {
    async fn handle(
        &self,
        notification: &PostCreated,
        _cancellation: CancellationToken,
    ) -> Result<(), HandlerError> {
        self.record("post_created", notification)
    }
}

#[async_trait]
impl NotificationHandler<PostDeleted> for AuditLogHandler {
    async fn handle(
        &self,
        notification: &PostDeleted,
        _cancellation: CancellationToken,
    ) -> Result<(), HandlerError> {
        self.record("post_deleted", notification)
    }
}

#[async_trait]
impl NotificationHandler<TicketOpened> for AuditLogHandler {
    async fn handle(
        &self,
        notification: &TicketOpened,
        _cancellation: CancellationToken,
    ) -> Result<(), HandlerError> {
        self.record("ticket_opened", notification)
    }
}

#[async_trait]
impl NotificationHandler<TicketMessagePosted> for AuditLogHandler {
    async fn handle(
        &self,
        notification: &TicketMessagePosted,
        _cancellation: CancellationToken,
    ) -> Result<(), HandlerError> {
        self.record("ticket_message_posted", notification)
    }
}

#[async_trait]
impl NotificationHandler<TicketClosed> for AuditLogHandler {
    async fn handle(
        &self,
        notification: &TicketClosed,
        _cancellation: CancellationToken,
    ) -> Result<(), HandlerError> {
        self.record("ticket_closed", notification)
    }
}
