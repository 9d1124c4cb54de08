//! Handler registry: notification type to ordered handler list.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::error::HandlerError;
use super::notification::{Notification, NotificationHandler};

/// The in-flight future of one handler invocation.
pub(crate) type HandlerFuture = BoxFuture<'static, Result<(), HandlerError>>;

type ErasedInvoke =
    dyn Fn(Arc<dyn Any + Send + Sync>, CancellationToken) -> HandlerFuture + Send + Sync;

/// A handler stored with its notification type erased.
///
/// The closure downcasts the payload back to the concrete type it was
/// registered for; the registry only hands it payloads resolved under that
/// same `TypeId`.
#[derive(Clone)]
pub(crate) struct RegisteredHandler {
    invoke: Arc<ErasedInvoke>,
}

impl RegisteredHandler {
    pub(crate) fn start(
        &self,
        notification: Arc<dyn Any + Send + Sync>,
        cancellation: CancellationToken,
    ) -> HandlerFuture {
        (self.invoke)(notification, cancellation)
    }
}

/// Maps each notification type to the handlers registered for it.
///
/// Built once during module wiring and frozen behind an `Arc` afterwards;
/// lookups need no locking because nothing mutates the table after startup.
/// Lookup itself never fails: a type with no registrations resolves to an
/// empty list, which every strategy dispatches as a trivial success.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TypeId, Vec<RegisteredHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for notifications of type `N`.
    ///
    /// Handlers run in registration order under the sequential strategies;
    /// the concurrent strategies start them in registration order but make
    /// no guarantee about completion order.
    pub fn register<N, H>(&mut self, handler: Arc<H>)
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let invoke = move |notification: Arc<dyn Any + Send + Sync>,
                           cancellation: CancellationToken|
              -> HandlerFuture {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let notification = notification.downcast::<N>().map_err(|_| {
                    HandlerError::message("notification payload does not match registered type")
                })?;
                handler.handle(notification.as_ref(), cancellation).await
            })
        };

        self.handlers
            .entry(TypeId::of::<N>())
            .or_default()
            .push(RegisteredHandler {
                invoke: Arc::new(invoke),
            });
    }

    /// The ordered handlers for `notification_type`; empty when none are
    /// registered.
    pub(crate) fn resolve(&self, notification_type: TypeId) -> &[RegisteredHandler] {
        self.handlers
            .get(&notification_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of handlers registered for `N`.
    pub fn handler_count<N: Notification>(&self) -> usize {
        self.handlers.get(&TypeId::of::<N>()).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Ping;
    impl Notification for Ping {}

    struct Pong;
    impl Notification for Pong {}

    struct OrderedHandler {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl NotificationHandler<Ping> for OrderedHandler {
        async fn handle(
            &self,
            _notification: &Ping,
            _cancellation: CancellationToken,
        ) -> Result<(), HandlerError> {
            self.log.lock().push(self.tag);
            Ok(())
        }
    }

    #[tokio::test]
    async fn resolve_returns_handlers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        for tag in ["first", "second", "third"] {
            registry.register::<Ping, _>(Arc::new(OrderedHandler {
                tag,
                log: Arc::clone(&log),
            }));
        }

        let notification: Arc<dyn Any + Send + Sync> = Arc::new(Ping);
        for handler in registry.resolve(TypeId::of::<Ping>()) {
            handler
                .start(Arc::clone(&notification), CancellationToken::new())
                .await
                .unwrap();
        }

        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn resolve_of_unregistered_type_is_empty() {
        let registry = HandlerRegistry::new();
        assert!(registry.resolve(TypeId::of::<Pong>()).is_empty());
        assert_eq!(registry.handler_count::<Pong>(), 0);
    }

    #[test]
    fn handler_count_tracks_registrations_per_type() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry.register::<Ping, _>(Arc::new(OrderedHandler {
            tag: "only",
            log: Arc::clone(&log),
        }));

        assert_eq!(registry.handler_count::<Ping>(), 1);
        assert_eq!(registry.handler_count::<Pong>(), 0);
    }
}
