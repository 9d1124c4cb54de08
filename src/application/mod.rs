//! # Application Layer
//!
//! Module services orchestrating the domain through repository traits, and
//! the notification handlers subscribed to domain events.

pub mod handlers;
pub mod services;
