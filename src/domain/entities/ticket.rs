//! Ticket entities and repository trait.
//!
//! Maps to the `tickets` and `ticket_messages` tables in the support schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Ticket lifecycle states matching the PostgreSQL ENUM `ticket_status`.
///
/// Database definition:
/// ```sql
/// CREATE TYPE ticket_status AS ENUM ('pending', 'answered', 'closed');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Waiting for a support reply
    #[default]
    Pending,
    /// Support has replied, waiting for the customer
    Answered,
    /// Conversation finished; no further messages accepted
    Closed,
}

impl TicketStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "answered" => Self::Answered,
            "closed" => Self::Closed,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Answered => "answered",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A support ticket opened by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,

    /// User who opened the ticket
    pub user_id: Uuid,

    /// Full name of the ticket owner (1-100 characters)
    pub owner_full_name: String,

    /// Contact phone number (max 11 characters)
    pub phone_number: String,

    /// Ticket subject (1-100 characters)
    pub title: String,

    /// Opening message body
    pub text: String,

    pub status: TicketStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One message in a ticket conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: Uuid,

    pub ticket_id: Uuid,

    /// User who wrote the message
    pub user_id: Uuid,

    /// Display name of the message author (1-100 characters)
    pub user_full_name: String,

    pub text: String,

    pub created_at: DateTime<Utc>,
}

/// Repository trait for Ticket data access operations.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Find a ticket by its ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, AppError>;

    /// Messages of a ticket, oldest first.
    async fn find_messages(&self, ticket_id: Uuid) -> Result<Vec<TicketMessage>, AppError>;

    /// Create a new ticket.
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError>;

    /// Append a message and move the ticket to `status` in one transaction.
    async fn add_message(
        &self,
        message: &TicketMessage,
        status: TicketStatus,
    ) -> Result<(), AppError>;

    /// Set the ticket status.
    async fn update_status(&self, id: Uuid, status: TicketStatus) -> Result<(), AppError>;
}
