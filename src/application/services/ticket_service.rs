//! Ticket Service
//!
//! Support-ticket conversations for the ticket module.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    Ticket, TicketClosed, TicketMessage, TicketMessagePosted, TicketOpened, TicketRepository,
    TicketStatus,
};
use crate::events::{Notification, Publisher};
use crate::shared::validation::validation_message;

/// Ticket service trait
#[async_trait]
pub trait TicketService: Send + Sync {
    /// Open a new ticket, returning its ID
    async fn create_ticket(&self, command: CreateTicketCommand) -> Result<Uuid, TicketError>;

    /// Append a message to a ticket conversation
    async fn send_message(&self, command: SendTicketMessageCommand) -> Result<(), TicketError>;

    /// Close a ticket
    async fn close_ticket(&self, ticket_id: Uuid) -> Result<(), TicketError>;

    /// Get a ticket with its messages
    async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketDto, TicketError>;
}

/// Create ticket request
#[derive(Debug, Clone, Validate)]
pub struct CreateTicketCommand {
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub owner_full_name: String,

    #[validate(length(min = 1, max = 11))]
    pub phone_number: String,

    #[validate(length(min = 1, max = 100))]
    pub title: String,

    #[validate(length(min = 1))]
    pub text: String,
}

/// Send message request
#[derive(Debug, Clone, Validate)]
pub struct SendTicketMessageCommand {
    pub ticket_id: Uuid,
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub owner_full_name: String,

    #[validate(length(min = 1))]
    pub text: String,
}

/// Ticket message data transfer object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketMessageDto {
    pub ticket_id: String,
    pub user_id: String,
    pub user_full_name: String,
    pub text: String,
    pub created_at: String,
}

impl From<TicketMessage> for TicketMessageDto {
    fn from(message: TicketMessage) -> Self {
        Self {
            ticket_id: message.ticket_id.to_string(),
            user_id: message.user_id.to_string(),
            user_full_name: message.user_full_name,
            text: message.text,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Ticket data transfer object, including the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDto {
    pub id: String,
    pub user_id: String,
    pub owner_full_name: String,
    pub phone_number: String,
    pub title: String,
    pub text: String,
    pub status: String,
    pub created_at: String,
    pub messages: Vec<TicketMessageDto>,
}

impl TicketDto {
    fn from_parts(ticket: Ticket, messages: Vec<TicketMessage>) -> Self {
        Self {
            id: ticket.id.to_string(),
            user_id: ticket.user_id.to_string(),
            owner_full_name: ticket.owner_full_name,
            phone_number: ticket.phone_number,
            title: ticket.title,
            text: ticket.text,
            status: ticket.status.as_str().to_string(),
            created_at: ticket.created_at.to_rfc3339(),
            messages: messages.into_iter().map(TicketMessageDto::from).collect(),
        }
    }
}

/// Ticket service errors
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("Ticket not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// TicketService implementation
pub struct TicketServiceImpl<T>
where
    T: TicketRepository,
{
    ticket_repo: Arc<T>,
    publisher: Arc<Publisher>,
}

impl<T> TicketServiceImpl<T>
where
    T: TicketRepository,
{
    pub fn new(ticket_repo: Arc<T>, publisher: Arc<Publisher>) -> Self {
        Self {
            ticket_repo,
            publisher,
        }
    }

    fn validate<V: Validate>(command: &V) -> Result<(), TicketError> {
        command
            .validate()
            .map_err(|e| TicketError::Validation(validation_message(&e)))
    }

    /// Event publication is a side effect of an already persisted change; a
    /// failing handler must not fail the operation.
    async fn publish_event<N: Notification>(&self, event: N) {
        if let Err(error) = self.publisher.publish(event).await {
            tracing::warn!(%error, "failed to publish ticket event");
        }
    }
}

#[async_trait]
impl<T> TicketService for TicketServiceImpl<T>
where
    T: TicketRepository + 'static,
{
    async fn create_ticket(&self, command: CreateTicketCommand) -> Result<Uuid, TicketError> {
        Self::validate(&command)?;

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            user_id: command.user_id,
            owner_full_name: command.owner_full_name,
            phone_number: command.phone_number,
            title: command.title,
            text: command.text,
            status: TicketStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .ticket_repo
            .create(&ticket)
            .await
            .map_err(|e| TicketError::Internal(e.to_string()))?;

        self.publish_event(TicketOpened {
            ticket_id: created.id,
            user_id: created.user_id,
            title: created.title.clone(),
        })
        .await;

        Ok(created.id)
    }

    async fn send_message(&self, command: SendTicketMessageCommand) -> Result<(), TicketError> {
        Self::validate(&command)?;

        let ticket = self
            .ticket_repo
            .find_by_id(command.ticket_id)
            .await
            .map_err(|e| TicketError::Internal(e.to_string()))?
            .ok_or(TicketError::NotFound)?;

        // A message from the owner puts the ball back in support's court; a
        // reply from anyone else answers it. Either way a closed ticket is
        // reopened.
        let new_status = if ticket.user_id == command.user_id {
            TicketStatus::Pending
        } else {
            TicketStatus::Answered
        };

        let message = TicketMessage {
            id: Uuid::new_v4(),
            ticket_id: command.ticket_id,
            user_id: command.user_id,
            user_full_name: command.owner_full_name,
            text: command.text,
            created_at: Utc::now(),
        };

        self.ticket_repo
            .add_message(&message, new_status)
            .await
            .map_err(|e| TicketError::Internal(e.to_string()))?;

        self.publish_event(TicketMessagePosted {
            ticket_id: command.ticket_id,
            user_id: command.user_id,
            new_status,
        })
        .await;

        Ok(())
    }

    async fn close_ticket(&self, ticket_id: Uuid) -> Result<(), TicketError> {
        self.ticket_repo
            .find_by_id(ticket_id)
            .await
            .map_err(|e| TicketError::Internal(e.to_string()))?
            .ok_or(TicketError::NotFound)?;

        self.ticket_repo
            .update_status(ticket_id, TicketStatus::Closed)
            .await
            .map_err(|e| TicketError::Internal(e.to_string()))?;

        self.publish_event(TicketClosed { ticket_id }).await;

        Ok(())
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<TicketDto, TicketError> {
        let ticket = self
            .ticket_repo
            .find_by_id(ticket_id)
            .await
            .map_err(|e| TicketError::Internal(e.to_string()))?
            .ok_or(TicketError::NotFound)?;

        let messages = self
            .ticket_repo
            .find_messages(ticket_id)
            .await
            .map_err(|e| TicketError::Internal(e.to_string()))?;

        Ok(TicketDto::from_parts(ticket, messages))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::events::{HandlerError, HandlerRegistry, NotificationHandler};
    use crate::shared::error::AppError;

    #[derive(Default)]
    struct InMemoryTicketRepository {
        tickets: Mutex<Vec<Ticket>>,
        messages: Mutex<Vec<TicketMessage>>,
    }

    #[async_trait]
    impl TicketRepository for InMemoryTicketRepository {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
            Ok(self.tickets.lock().iter().find(|t| t.id == id).cloned())
        }

        async fn find_messages(&self, ticket_id: Uuid) -> Result<Vec<TicketMessage>, AppError> {
            Ok(self
                .messages
                .lock()
                .iter()
                .filter(|m| m.ticket_id == ticket_id)
                .cloned()
                .collect())
        }

        async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
            self.tickets.lock().push(ticket.clone());
            Ok(ticket.clone())
        }

        async fn add_message(
            &self,
            message: &TicketMessage,
            status: TicketStatus,
        ) -> Result<(), AppError> {
            let mut tickets = self.tickets.lock();
            let ticket = tickets
                .iter_mut()
                .find(|t| t.id == message.ticket_id)
                .ok_or_else(|| AppError::NotFound("ticket".into()))?;
            ticket.status = status;
            self.messages.lock().push(message.clone());
            Ok(())
        }

        async fn update_status(&self, id: Uuid, status: TicketStatus) -> Result<(), AppError> {
            let mut tickets = self.tickets.lock();
            let ticket = tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| AppError::NotFound("ticket".into()))?;
            ticket.status = status;
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingHandler {
        opened: AtomicUsize,
        posted: AtomicUsize,
        closed: AtomicUsize,
    }

    #[async_trait]
    impl NotificationHandler<TicketOpened> for CountingHandler {
        async fn handle(
            &self,
            _notification: &TicketOpened,
            _cancellation: CancellationToken,
        ) -> Result<(), HandlerError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl NotificationHandler<TicketMessagePosted> for CountingHandler {
        async fn handle(
            &self,
            _notification: &TicketMessagePosted,
            _cancellation: CancellationToken,
        ) -> Result<(), HandlerError> {
            self.posted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl NotificationHandler<TicketClosed> for CountingHandler {
        async fn handle(
            &self,
            _notification: &TicketClosed,
            _cancellation: CancellationToken,
        ) -> Result<(), HandlerError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Fixture {
        tickets: Arc<InMemoryTicketRepository>,
        events: Arc<CountingHandler>,
        service: TicketServiceImpl<InMemoryTicketRepository>,
    }

    fn fixture() -> Fixture {
        let tickets = Arc::new(InMemoryTicketRepository::default());
        let events = Arc::new(CountingHandler::default());

        let mut registry = HandlerRegistry::new();
        registry.register::<TicketOpened, _>(Arc::clone(&events));
        registry.register::<TicketMessagePosted, _>(Arc::clone(&events));
        registry.register::<TicketClosed, _>(Arc::clone(&events));

        let service = TicketServiceImpl::new(
            Arc::clone(&tickets),
            Arc::new(Publisher::new(Arc::new(registry))),
        );

        Fixture {
            tickets,
            events,
            service,
        }
    }

    fn create_command(user_id: Uuid) -> CreateTicketCommand {
        CreateTicketCommand {
            user_id,
            owner_full_name: "Sam Customer".to_string(),
            phone_number: "09120000000".to_string(),
            title: "Cannot log in".to_string(),
            text: "The login page rejects my password.".to_string(),
        }
    }

    fn message_command(ticket_id: Uuid, user_id: Uuid) -> SendTicketMessageCommand {
        SendTicketMessageCommand {
            ticket_id,
            user_id,
            owner_full_name: "Riley Agent".to_string(),
            text: "Have you tried resetting it?".to_string(),
        }
    }

    #[tokio::test]
    async fn create_ticket_starts_pending_and_publishes() {
        let fx = fixture();
        let owner = Uuid::new_v4();

        let ticket_id = fx.service.create_ticket(create_command(owner)).await.unwrap();

        let stored = fx.tickets.tickets.lock()[0].clone();
        assert_eq!(stored.id, ticket_id);
        assert_eq!(stored.status, TicketStatus::Pending);
        assert_eq!(fx.events.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn create_ticket_rejects_an_overlong_phone_number() {
        let fx = fixture();
        let mut command = create_command(Uuid::new_v4());
        command.phone_number = "0".repeat(12);

        let error = fx.service.create_ticket(command).await.unwrap_err();

        assert!(matches!(error, TicketError::Validation(_)));
        assert_eq!(fx.events.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn message_from_a_support_agent_marks_the_ticket_answered() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ticket_id = fx.service.create_ticket(create_command(owner)).await.unwrap();

        fx.service
            .send_message(message_command(ticket_id, Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(fx.tickets.tickets.lock()[0].status, TicketStatus::Answered);
        assert_eq!(fx.events.posted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn message_from_the_owner_marks_the_ticket_pending_again() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ticket_id = fx.service.create_ticket(create_command(owner)).await.unwrap();
        fx.service
            .send_message(message_command(ticket_id, Uuid::new_v4()))
            .await
            .unwrap();

        fx.service
            .send_message(message_command(ticket_id, owner))
            .await
            .unwrap();

        assert_eq!(fx.tickets.tickets.lock()[0].status, TicketStatus::Pending);
    }

    #[tokio::test]
    async fn a_new_message_reopens_a_closed_ticket() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ticket_id = fx.service.create_ticket(create_command(owner)).await.unwrap();
        fx.service.close_ticket(ticket_id).await.unwrap();

        fx.service
            .send_message(message_command(ticket_id, owner))
            .await
            .unwrap();

        assert_eq!(fx.tickets.tickets.lock()[0].status, TicketStatus::Pending);
    }

    #[tokio::test]
    async fn send_message_to_an_unknown_ticket_is_not_found() {
        let fx = fixture();

        let error = fx
            .service
            .send_message(message_command(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(error, TicketError::NotFound));
        assert_eq!(fx.events.posted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn close_ticket_sets_closed_and_publishes() {
        let fx = fixture();
        let ticket_id = fx
            .service
            .create_ticket(create_command(Uuid::new_v4()))
            .await
            .unwrap();

        fx.service.close_ticket(ticket_id).await.unwrap();

        assert_eq!(fx.tickets.tickets.lock()[0].status, TicketStatus::Closed);
        assert_eq!(fx.events.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_ticket_returns_the_conversation_in_order() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let ticket_id = fx.service.create_ticket(create_command(owner)).await.unwrap();
        fx.service
            .send_message(message_command(ticket_id, Uuid::new_v4()))
            .await
            .unwrap();
        fx.service
            .send_message(message_command(ticket_id, owner))
            .await
            .unwrap();

        let dto = fx.service.get_ticket(ticket_id).await.unwrap();

        assert_eq!(dto.status, "pending");
        assert_eq!(dto.messages.len(), 2);
        assert_eq!(dto.messages[0].text, "Have you tried resetting it?");
    }
}
