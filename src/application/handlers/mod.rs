//! Notification handlers reacting to domain events.

pub mod audit;
pub mod support;

pub use audit::AuditLogHandler;
pub use support::SupportAlertHandler;
