//! Common Test Utilities
//!
//! Scripted handlers and a sample notification for exercising the
//! notification core through the public API.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use modulith::events::{HandlerError, Notification, NotificationHandler};

/// A sample domain event for dispatch tests.
pub struct InvoiceRaised {
    pub amount_cents: u64,
}

impl Notification for InvoiceRaised {}

/// What a scripted handler does when invoked.
pub enum Mode {
    Succeed,
    Fail(&'static str),
    Sleep(Duration),
    FailIfCancelled,
}

/// A handler that follows a script and records what happened to it.
pub struct ScriptedHandler {
    name: &'static str,
    mode: Mode,
    log: Arc<Mutex<Vec<&'static str>>>,
    completions: AtomicUsize,
    last_amount: AtomicU64,
}

impl ScriptedHandler {
    pub fn new(name: &'static str, mode: Mode, log: Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
        Arc::new(Self {
            name,
            mode,
            log,
            completions: AtomicUsize::new(0),
            last_amount: AtomicU64::new(0),
        })
    }

    /// How many invocations ran to completion (successfully or not).
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    /// Amount carried by the most recent notification this handler saw.
    pub fn last_amount(&self) -> u64 {
        self.last_amount.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationHandler<InvoiceRaised> for ScriptedHandler {
    async fn handle(
        &self,
        notification: &InvoiceRaised,
        cancellation: CancellationToken,
    ) -> Result<(), HandlerError> {
        self.log.lock().push(self.name);
        self.last_amount
            .store(notification.amount_cents, Ordering::SeqCst);
        let result = match &self.mode {
            Mode::Succeed => Ok(()),
            Mode::Fail(message) => Err(HandlerError::message(*message)),
            Mode::Sleep(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(())
            }
            Mode::FailIfCancelled => {
                if cancellation.is_cancelled() {
                    Err(HandlerError::Cancelled)
                } else {
                    Ok(())
                }
            }
        };
        self.completions.fetch_add(1, Ordering::SeqCst);
        result
    }
}
