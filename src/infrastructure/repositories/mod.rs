//! sqlx repository implementations for the blog and ticket modules.

pub mod category_repository;
pub mod post_repository;
pub mod ticket_repository;

pub use category_repository::PgCategoryRepository;
pub use post_repository::PgPostRepository;
pub use ticket_repository::PgTicketRepository;
