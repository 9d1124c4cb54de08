//! Support desk alerts.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::TicketStatus;
use crate::domain::events::{TicketMessagePosted, TicketOpened};
use crate::events::{HandlerError, NotificationHandler};

/// Alerts the support desk when a ticket needs attention.
///
/// Fires for every newly opened ticket and for messages that put a ticket
/// back into `Pending`, i.e. whenever the ball lands in support's court.
/// The alert channel is the log for now; swapping in a chat or mail client
/// only touches this handler.
pub struct SupportAlertHandler;

#[async_trait]
impl NotificationHandler<TicketOpened> for SupportAlertHandler {
    async fn handle(
        &self,
        notification: &TicketOpened,
        _cancellation: CancellationToken,
    ) -> Result<(), HandlerError> {
        tracing::info!(
            target: "modulith::support",
            ticket_id = %notification.ticket_id,
            title = %notification.title,
            "new ticket awaiting support"
        );
        Ok(())
    }
}

#[async_trait]
impl NotificationHandler<TicketMessagePosted> for SupportAlertHandler {
    async fn handle(
        &self,
        notification: &TicketMessagePosted,
        _cancellation: CancellationToken,
    ) -> Result<(), HandlerError> {
        if notification.new_status == TicketStatus::Pending {
            tracing::info!(
                target: "modulith::support",
                ticket_id = %notification.ticket_id,
                "customer replied, ticket awaiting support"
            );
        }
        Ok(())
    }
}
