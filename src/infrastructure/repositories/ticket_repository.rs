//! Ticket Repository Implementation
//!
//! PostgreSQL implementation of the TicketRepository trait. Message inserts
//! and the accompanying ticket status change share one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Ticket, TicketMessage, TicketRepository, TicketStatus};
use crate::shared::error::AppError;

/// Database row representation matching the tickets table schema.
#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    user_id: Uuid,
    owner_full_name: String,
    phone_number: String,
    title: String,
    text: String,
    status: String, // PostgreSQL ENUM comes as string
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> Ticket {
        Ticket {
            id: self.id,
            user_id: self.user_id,
            owner_full_name: self.owner_full_name,
            phone_number: self.phone_number,
            title: self.title,
            text: self.text,
            status: TicketStatus::from_str(&self.status),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row for ticket messages.
#[derive(Debug, sqlx::FromRow)]
struct TicketMessageRow {
    id: Uuid,
    ticket_id: Uuid,
    user_id: Uuid,
    user_full_name: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl TicketMessageRow {
    fn into_message(self) -> TicketMessage {
        TicketMessage {
            id: self.id,
            ticket_id: self.ticket_id,
            user_id: self.user_id,
            user_full_name: self.user_full_name,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL ticket repository implementation.
#[derive(Clone)]
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, AppError> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, user_id, owner_full_name, phone_number, title, text,
                   status::TEXT AS status, created_at, updated_at
            FROM tickets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_ticket()))
    }

    async fn find_messages(&self, ticket_id: Uuid) -> Result<Vec<TicketMessage>, AppError> {
        let rows = sqlx::query_as::<_, TicketMessageRow>(
            r#"
            SELECT id, ticket_id, user_id, user_full_name, text, created_at
            FROM ticket_messages
            WHERE ticket_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn create(&self, ticket: &Ticket) -> Result<Ticket, AppError> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            INSERT INTO tickets (id, user_id, owner_full_name, phone_number, title, text,
                                 status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7::ticket_status, $8, $9)
            RETURNING id, user_id, owner_full_name, phone_number, title, text,
                      status::TEXT AS status, created_at, updated_at
            "#,
        )
        .bind(ticket.id)
        .bind(ticket.user_id)
        .bind(&ticket.owner_full_name)
        .bind(&ticket.phone_number)
        .bind(&ticket.title)
        .bind(&ticket.text)
        .bind(ticket.status.as_str())
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_ticket())
    }

    /// Append a message and move the ticket in one transaction so a crash
    /// between the two writes cannot leave the status stale.
    async fn add_message(
        &self,
        message: &TicketMessage,
        status: TicketStatus,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO ticket_messages (id, ticket_id, user_id, user_full_name, text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(message.ticket_id)
        .bind(message.user_id)
        .bind(&message.user_full_name)
        .bind(&message.text)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = $2::ticket_status, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(message.ticket_id)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Ticket with id {} not found",
                message.ticket_id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: TicketStatus) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = $2::ticket_status, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Ticket with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
