//! In-process notification dispatch.
//!
//! This module implements a publisher/subscriber facility for domain events:
//! a module raises a [`Notification`] without knowing which handlers are
//! listening, and the [`Publisher`] fans it out to every handler registered
//! for that notification type.
//!
//! Dispatch behavior is selected per publish call through a
//! [`PublishStrategy`]: handlers can run one at a time or concurrently, and
//! failures can abort the dispatch, be collected into one aggregate, or be
//! ignored entirely. The fire-and-forget strategies (`ConcurrentWaitAny`,
//! `ConcurrentNoWait`) never surface handler failures to the caller; see the
//! strategy documentation before relying on them for anything that must not
//! fail silently.

pub mod error;
pub mod notification;
pub mod publisher;
pub mod registry;
pub mod strategy;

pub use error::{HandlerError, PublishError};
pub use notification::{Notification, NotificationHandler};
pub use publisher::Publisher;
pub use registry::HandlerRegistry;
pub use strategy::{ParseStrategyError, PublishStrategy};
