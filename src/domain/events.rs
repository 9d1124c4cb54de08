//! Domain events raised by the blog and ticket modules.
//!
//! Events are immutable facts; services publish them through the
//! [`Publisher`](crate::events::Publisher) after the state change they
//! describe has been persisted.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::TicketStatus;
use crate::events::Notification;

/// A blog post was created and its image stored.
#[derive(Debug, Clone, Serialize)]
pub struct PostCreated {
    pub post_id: Uuid,
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
}

impl Notification for PostCreated {}

/// A blog post and its stored image were removed.
#[derive(Debug, Clone, Serialize)]
pub struct PostDeleted {
    pub post_id: Uuid,
}

impl Notification for PostDeleted {}

/// A support ticket was opened.
#[derive(Debug, Clone, Serialize)]
pub struct TicketOpened {
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
}

impl Notification for TicketOpened {}

/// A message was added to a ticket conversation.
#[derive(Debug, Clone, Serialize)]
pub struct TicketMessagePosted {
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    /// Status of the ticket after the message was applied.
    pub new_status: TicketStatus,
}

impl Notification for TicketMessagePosted {}

/// A ticket was closed.
#[derive(Debug, Clone, Serialize)]
pub struct TicketClosed {
    pub ticket_id: Uuid,
}

impl Notification for TicketClosed {}
