//! End-to-end dispatch behavior of the notification publisher, driven
//! entirely through the public API.

mod common;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use modulith::events::{
    HandlerError, HandlerRegistry, PublishError, PublishStrategy, Publisher,
};

use common::{InvoiceRaised, Mode, ScriptedHandler};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn build(
    scripts: Vec<(&'static str, Mode)>,
) -> (Publisher, Vec<Arc<ScriptedHandler>>, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    let handlers: Vec<_> = scripts
        .into_iter()
        .map(|(name, mode)| {
            let handler = ScriptedHandler::new(name, mode, Arc::clone(&log));
            registry.register::<InvoiceRaised, _>(Arc::clone(&handler));
            handler
        })
        .collect();
    (Publisher::new(Arc::new(registry)), handlers, log)
}

fn invoice() -> InvoiceRaised {
    InvoiceRaised { amount_cents: 1250 }
}

#[tokio::test]
async fn sequential_dispatch_follows_registration_order() {
    let (publisher, handlers, log) = build(vec![
        ("ledger", Mode::Succeed),
        ("mailer", Mode::Succeed),
        ("archive", Mode::Succeed),
    ]);

    publisher.publish(invoice()).await.unwrap();

    assert_eq!(*log.lock(), vec!["ledger", "mailer", "archive"]);
    for handler in &handlers {
        assert_eq!(handler.last_amount(), 1250);
    }
}

#[tokio::test]
async fn the_default_strategy_collects_all_failures_without_stopping() {
    let (publisher, handlers, _) = build(vec![
        ("ledger", Mode::Fail("ledger offline")),
        ("mailer", Mode::Fail("smtp refused")),
        ("archive", Mode::Succeed),
    ]);

    let error = publisher.publish(invoice()).await.unwrap_err();

    match error {
        PublishError::Aggregate(causes) => {
            assert_eq!(causes.len(), 2);
        }
        other => panic!("expected aggregate, got {other:?}"),
    }
    for handler in &handlers {
        assert_eq!(handler.completions(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn wait_all_only_returns_once_every_handler_is_done() {
    let (publisher, handlers, _) = build(vec![
        ("fast", Mode::Succeed),
        ("slow", Mode::Sleep(Duration::from_secs(30))),
    ]);

    publisher
        .publish_with(invoice(), PublishStrategy::ConcurrentWaitAll)
        .await
        .unwrap();

    for handler in &handlers {
        assert_eq!(handler.completions(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn fire_and_forget_strategies_swallow_handler_failures() {
    for strategy in [
        PublishStrategy::ConcurrentWaitAny,
        PublishStrategy::ConcurrentNoWait,
    ] {
        let (publisher, _, _) = build(vec![
            ("broken", Mode::Fail("always broken")),
            ("slow", Mode::Sleep(Duration::from_secs(5))),
        ]);

        publisher
            .publish_with(invoice(), strategy)
            .await
            .unwrap_or_else(|e| panic!("{strategy} surfaced a handler failure: {e}"));
    }
}

#[tokio::test(start_paused = true)]
async fn no_wait_handlers_still_run_after_the_call_returns() {
    let (publisher, handlers, _) = build(vec![("slow", Mode::Sleep(Duration::from_secs(5)))]);

    publisher
        .publish_with(invoice(), PublishStrategy::ConcurrentNoWait)
        .await
        .unwrap();
    assert_eq!(handlers[0].completions(), 0);

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(handlers[0].completions(), 1);
}

#[tokio::test]
async fn a_cancelled_token_turns_into_per_handler_failures() {
    let (publisher, _, _) = build(vec![
        ("first", Mode::FailIfCancelled),
        ("second", Mode::FailIfCancelled),
    ]);

    let token = CancellationToken::new();
    token.cancel();

    let error = publisher
        .publish_cancellable(invoice(), token)
        .await
        .unwrap_err();

    match error {
        PublishError::Aggregate(causes) => {
            assert_eq!(causes.len(), 2);
            assert!(causes.iter().all(|c| matches!(c, HandlerError::Cancelled)));
        }
        other => panic!("expected aggregate, got {other:?}"),
    }
}

#[tokio::test]
async fn changing_the_default_applies_to_later_publishes() {
    let (publisher, _, log) = build(vec![
        ("breaks", Mode::Fail("boom")),
        ("after", Mode::Succeed),
    ]);

    publisher.set_default_strategy(PublishStrategy::SequentialStopOnError);
    let error = publisher.publish(invoice()).await.unwrap_err();

    assert!(matches!(error, PublishError::Handler(_)));
    assert_eq!(*log.lock(), vec!["breaks"]);
}

#[test]
fn the_publisher_exposes_its_full_strategy_table() {
    let publisher = Publisher::new(Arc::new(HandlerRegistry::new()));
    let supported = publisher.supported_strategies();

    assert_eq!(supported.len(), PublishStrategy::ALL.len());
    for strategy in PublishStrategy::ALL {
        assert!(supported.contains(&strategy), "missing {strategy}");
    }
}
