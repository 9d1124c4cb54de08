//! # Infrastructure Layer
//!
//! Implementations of the domain's data access contracts and the narrow
//! collaborator interfaces the services depend on.
//!
//! - **database**: PostgreSQL connection pool and migrations
//! - **repositories**: sqlx implementations of the repository traits
//! - **storage**: file-storage contract and local filesystem implementation

pub mod database;
pub mod repositories;
pub mod storage;
