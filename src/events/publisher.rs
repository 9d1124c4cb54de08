//! The strategy-routing notification publisher.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use super::error::PublishError;
use super::notification::Notification;
use super::registry::HandlerRegistry;
use super::strategy::{DispatchFn, HandlerInvocation, PublishStrategy};

/// Fans a notification out to its registered handlers under a selectable
/// dispatch strategy.
///
/// The strategy table is built at construction and never mutated afterwards,
/// so concurrent publishes from any number of callers are safe without
/// locking; each call owns its own handler list and failure state. The only
/// mutable piece is the default strategy, a read-mostly field consulted once
/// per call on entry.
pub struct Publisher {
    registry: Arc<HandlerRegistry>,
    strategies: HashMap<PublishStrategy, DispatchFn>,
    default_strategy: RwLock<PublishStrategy>,
}

impl Publisher {
    /// A publisher over `registry` defaulting to
    /// [`PublishStrategy::SequentialContinueOnError`].
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self::with_default(registry, PublishStrategy::SequentialContinueOnError)
    }

    pub fn with_default(registry: Arc<HandlerRegistry>, default_strategy: PublishStrategy) -> Self {
        let strategies = PublishStrategy::ALL
            .iter()
            .map(|strategy| (*strategy, strategy.dispatcher()))
            .collect();

        Self {
            registry,
            strategies,
            default_strategy: RwLock::new(default_strategy),
        }
    }

    pub fn default_strategy(&self) -> PublishStrategy {
        *self.default_strategy.read()
    }

    /// Replaces the default strategy for subsequent `publish` calls.
    ///
    /// Changing the default concurrently with in-flight publishes is
    /// unordered with respect to those calls; each call reads the field once
    /// when it starts.
    pub fn set_default_strategy(&self, strategy: PublishStrategy) {
        *self.default_strategy.write() = strategy;
    }

    /// The strategies this publisher can dispatch with, in tag order.
    pub fn supported_strategies(&self) -> Vec<PublishStrategy> {
        let mut strategies: Vec<_> = self.strategies.keys().copied().collect();
        strategies.sort();
        strategies
    }

    /// Publishes with the default strategy and a fresh, never-cancelled
    /// token.
    pub async fn publish<N: Notification>(&self, notification: N) -> Result<(), PublishError> {
        self.publish_using(notification, self.default_strategy(), CancellationToken::new())
            .await
    }

    /// Publishes with an explicit strategy.
    pub async fn publish_with<N: Notification>(
        &self,
        notification: N,
        strategy: PublishStrategy,
    ) -> Result<(), PublishError> {
        self.publish_using(notification, strategy, CancellationToken::new())
            .await
    }

    /// Publishes with the default strategy and an explicit cancellation
    /// token.
    pub async fn publish_cancellable<N: Notification>(
        &self,
        notification: N,
        cancellation: CancellationToken,
    ) -> Result<(), PublishError> {
        self.publish_using(notification, self.default_strategy(), cancellation)
            .await
    }

    /// Canonical entry point; the other `publish` variants delegate here.
    ///
    /// Resolves the handler set exactly once and hands it to the selected
    /// dispatcher; each resolved handler is invoked exactly once regardless
    /// of strategy. An unknown strategy fails before any of that happens.
    pub async fn publish_using<N: Notification>(
        &self,
        notification: N,
        strategy: PublishStrategy,
        cancellation: CancellationToken,
    ) -> Result<(), PublishError> {
        let dispatch = *self
            .strategies
            .get(&strategy)
            .ok_or(PublishError::UnknownStrategy(strategy))?;

        let notification: Arc<dyn Any + Send + Sync> = Arc::new(notification);
        let invocations: Vec<HandlerInvocation> = self
            .registry
            .resolve(TypeId::of::<N>())
            .iter()
            .map(|handler| {
                let handler = handler.clone();
                let notification = Arc::clone(&notification);
                HandlerInvocation::new(move |cancellation| {
                    handler.start(notification, cancellation)
                })
            })
            .collect();

        dispatch(invocations, cancellation).await
    }
}
