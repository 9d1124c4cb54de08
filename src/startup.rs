//! Application Startup
//!
//! Module wiring for a host mounting the monolith's modules: repositories,
//! file storage, the handler registry, the publisher, and the services.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::application::handlers::{AuditLogHandler, SupportAlertHandler};
use crate::application::services::{
    BlogService, BlogServiceImpl, TicketService, TicketServiceImpl,
};
use crate::config::Settings;
use crate::domain::events::{
    PostCreated, PostDeleted, TicketClosed, TicketMessagePosted, TicketOpened,
};
use crate::events::{HandlerRegistry, Publisher};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    PgCategoryRepository, PgPostRepository, PgTicketRepository,
};
use crate::infrastructure::storage::LocalFileStore;

/// Application state shared by a host mounting the modules
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub publisher: Arc<Publisher>,
    pub blog: Arc<dyn BlogService>,
    pub tickets: Arc<dyn TicketService>,
    pub settings: Arc<Settings>,
}

/// Register every notification handler, in the order dispatch should
/// observe them.
pub fn build_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    let audit = Arc::new(AuditLogHandler);
    let support = Arc::new(SupportAlertHandler);

    registry.register::<PostCreated, _>(Arc::clone(&audit));
    registry.register::<PostDeleted, _>(Arc::clone(&audit));
    registry.register::<TicketOpened, _>(Arc::clone(&audit));
    registry.register::<TicketMessagePosted, _>(Arc::clone(&audit));
    registry.register::<TicketClosed, _>(Arc::clone(&audit));

    // The audit trail comes first for ticket activity; support alerts follow.
    registry.register::<TicketOpened, _>(Arc::clone(&support));
    registry.register::<TicketMessagePosted, _>(support);

    registry
}

impl AppState {
    /// Wire the modules against an existing connection pool.
    pub fn build(settings: Settings, db: PgPool) -> Self {
        let publisher = Arc::new(Publisher::with_default(
            Arc::new(build_registry()),
            settings.events.default_strategy,
        ));

        let blog = Arc::new(BlogServiceImpl::new(
            Arc::new(PgCategoryRepository::new(db.clone())),
            Arc::new(PgPostRepository::new(db.clone())),
            Arc::new(LocalFileStore::new(settings.storage.root.clone())),
            Arc::clone(&publisher),
        ));

        let tickets = Arc::new(TicketServiceImpl::new(
            Arc::new(PgTicketRepository::new(db.clone())),
            Arc::clone(&publisher),
        ));

        Self {
            db,
            publisher,
            blog,
            tickets,
            settings: Arc::new(settings),
        }
    }

    /// Connect to the database, apply migrations, and wire the modules.
    pub async fn connect(settings: Settings) -> Result<Self> {
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::build(settings, db))
    }
}
