mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use nsregistry::registry::Condition;
use nsregistry::{NamespaceError, Value};
use tokio::time::sleep;

use common::polling_registry;

const POLL: Duration = Duration::from_millis(5);

#[tokio::test]
async fn test_condition_already_true_runs_once_inline() {
    let registry = polling_registry(POLL);
    registry.create_namespace("Lib.Loaded").unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let outcome = registry
        .wait("Lib.Loaded", move |value| {
            assert!(value.as_namespace().is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    // ran before wait returned, no handle to poll with
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(outcome.is_ready());

    sleep(POLL * 6).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_eventually_true_condition_fires_exactly_once() {
    let registry = polling_registry(POLL);
    let flag = Arc::new(AtomicBool::new(false));
    let calls = Arc::new(AtomicUsize::new(0));

    let handle = {
        let flag = flag.clone();
        let counter = calls.clone();
        registry
            .wait(
                Condition::when(move || flag.load(Ordering::SeqCst)),
                move |value| {
                    assert_eq!(value, Value::data(true));
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            )
            .unwrap()
            .into_handle()
            .expect("condition is false, wait must be pending")
    };

    sleep(POLL * 6).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!handle.is_fired());

    flag.store(true, Ordering::SeqCst);
    tokio::time::timeout(Duration::from_secs(1), async {
        while calls.load(Ordering::SeqCst) == 0 {
            sleep(POLL).await;
        }
    })
    .await
    .expect("callback did not fire");

    sleep(POLL * 10).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(handle.is_fired());
    assert!(handle.is_finished());
}

#[tokio::test]
async fn test_wait_for_namespace_created_later() {
    let registry = polling_registry(POLL);
    let (tx, rx) = tokio::sync::oneshot::channel();

    let handle = registry
        .wait(Condition::namespace("Plugins.Charts"), move |value| {
            let _ = tx.send(value);
        })
        .unwrap()
        .into_handle()
        .unwrap();

    let loader = registry.clone();
    tokio::spawn(async move {
        sleep(POLL * 4).await;
        loader
            .create_namespace_with("Plugins.Charts", |ns| {
                ns.set("version", Value::data(2)).unwrap();
            })
            .unwrap();
    });

    let value = tokio::time::timeout(Duration::from_secs(1), rx)
        .await
        .unwrap()
        .unwrap();
    let charts = value.as_namespace().unwrap();
    assert_eq!(charts.get("version"), Some(Value::data(2)));
    assert!(handle.join().await);
}

#[tokio::test]
async fn test_cancelled_wait_never_fires() {
    let registry = polling_registry(POLL);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let handle = registry
        .wait("Late.Arrival", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap()
        .into_handle()
        .unwrap();
    sleep(POLL * 2).await;
    assert!(handle.cancel());

    registry.create_namespace("Late.Arrival").unwrap();
    sleep(POLL * 10).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!handle.join().await);
}

#[test]
fn test_pending_wait_needs_runtime() {
    let registry = polling_registry(POLL);
    assert!(matches!(
        registry.wait("Nowhere", |_| {}),
        Err(NamespaceError::Scheduler(_))
    ));
}
