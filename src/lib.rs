//! # Modulith
//!
//! This crate provides a modular monolith backend with:
//! - A blog module (categories and posts)
//! - A support-ticket module (tickets and conversations)
//! - A multi-strategy notification publisher fanning domain events out to
//!   their handlers
//! - PostgreSQL for persistent storage
//!
//! The modules are libraries; a host process mounts them through
//! [`startup::AppState`]. There is no HTTP surface in this crate.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities, repository traits, and events
//! - **Application Layer**: Module services, DTOs, and event handlers
//! - **Infrastructure Layer**: Database, repository, and storage implementations
//! - **Events Core**: Registry, strategies, and the publisher
//!
//! ## Module Structure
//!
//! ```text
//! modulith/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, repository traits, and events
//! +-- application/    Module services and notification handlers
//! +-- events/         Notification publisher and dispatch strategies
//! +-- infrastructure/ Database, repository, and storage implementations
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business model
pub mod domain;

// Application layer - Module services and handlers
pub mod application;

// Notification core - Publisher, registry, and strategies
pub mod events;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Shared utilities
pub mod shared;

// Module wiring for hosts
pub mod startup;

// Telemetry and observability
pub mod telemetry;
