//! Integration tests for overlapping navigations
//!
//! A gate interceptor holds the first navigation in Intercepting so a second
//! call can arrive while it is in flight.

mod common;

use async_trait::async_trait;
use common::*;
use screen_navigator::*;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Parks every navigation until released, recording arrival order.
struct GateInterceptor {
    arrived: Arc<Notify>,
    release: Arc<Notify>,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Interceptor for GateInterceptor {
    async fn perform(&self, context: &RoutingContext) -> Result<(), RoutingError> {
        let hex = context.downcast_ref::<String>().cloned().unwrap_or_default();
        self.log.lock().unwrap().push(hex);
        self.arrived.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

struct Harness {
    router: Arc<dyn Router>,
    arrived: Arc<Notify>,
    release: Arc<Notify>,
    log: Arc<Mutex<Vec<String>>>,
    builds: Arc<BuildCounter>,
}

fn harness(policy: ConcurrencyPolicy) -> Harness {
    let arrived = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let log = Arc::new(Mutex::new(Vec::new()));
    let router = RouterBuilder::over(home_stack())
        .policy(policy)
        .global_interceptor(GateInterceptor {
            arrived: arrived.clone(),
            release: release.clone(),
            log: log.clone(),
        })
        .build();
    Harness {
        router,
        arrived,
        release,
        log,
        builds: Arc::new(BuildCounter::default()),
    }
}

#[tokio::test]
async fn test_queue_policy_runs_calls_fifo() {
    let h = harness(ConcurrencyPolicy::Queue);

    let mut tasks = Vec::new();
    for hex in ["#000001", "#000002", "#000003"] {
        let router = h.router.clone();
        let destination = color_destination(&h.builds);
        tasks.push(tokio::spawn(async move {
            router.commit(&destination, hex.to_string(), false).await
        }));
        // let each call reach the gate in order
        tokio::task::yield_now().await;
    }

    for _ in 0..3 {
        h.arrived.notified().await;
        h.release.notify_one();
    }
    for task in tasks {
        assert!(task.await.unwrap().is_success());
    }

    assert_eq!(*h.log.lock().unwrap(), vec!["#000001", "#000002", "#000003"]);
    assert_eq!(h.builds.get(), 1);
}

#[tokio::test]
async fn test_reject_policy_fails_overlap_with_busy() {
    let h = harness(ConcurrencyPolicy::Reject);

    let first = {
        let router = h.router.clone();
        let destination = color_destination(&h.builds);
        tokio::spawn(async move { router.commit(&destination, "#FFAA00".to_string(), false).await })
    };
    h.arrived.notified().await;

    let second = h
        .router
        .commit(&color_destination(&h.builds), "#00AAFF".to_string(), false)
        .await;
    assert!(matches!(second.error(), Some(RoutingError::Busy)));

    h.release.notify_one();
    assert!(first.await.unwrap().is_success());
    assert_eq!(*h.log.lock().unwrap(), vec!["#FFAA00"]);
}

#[tokio::test]
async fn test_dropped_navigation_releases_the_router() {
    let h = harness(ConcurrencyPolicy::Reject);

    let first = {
        let router = h.router.clone();
        let destination = color_destination(&h.builds);
        tokio::spawn(async move { router.commit(&destination, "#FFAA00".to_string(), false).await })
    };
    h.arrived.notified().await;
    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());

    let retry = {
        let router = h.router.clone();
        let destination = color_destination(&h.builds);
        tokio::spawn(async move { router.commit(&destination, "#00AAFF".to_string(), false).await })
    };
    h.arrived.notified().await;
    h.release.notify_one();

    assert!(retry.await.unwrap().is_success());
    assert_eq!(h.builds.get(), 1);
}

#[tokio::test]
async fn test_delaying_interceptor_wait_strategy_holds_until_ready() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let signal = ReadinessSignal::new(false);
    let router = RouterBuilder::over(stack.clone())
        .global_interceptor(NavigationDelayingInterceptor::new(
            signal.clone(),
            DelayStrategy::Wait,
        ))
        .build();

    let pending = {
        let router = router.clone();
        let destination = color_destination(&builds);
        tokio::spawn(async move { router.commit(&destination, "#FFAA00".to_string(), false).await })
    };
    tokio::task::yield_now().await;
    assert!(!pending.is_finished());
    assert_eq!(stack.len(), 1);

    signal.set_ready(true);
    assert!(pending.await.unwrap().is_success());
    assert_eq!(stack.len(), 2);
}

#[tokio::test]
async fn test_suspended_interceptor_holds_back_the_next() {
    let arrived = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let started = call_log();
    let router = RouterBuilder::over(home_stack())
        .global_interceptor(GateInterceptor {
            arrived: arrived.clone(),
            release: release.clone(),
            log: Arc::new(Mutex::new(Vec::new())),
        })
        .interceptor(RecordingInterceptor::new("second", &started))
        .build();
    let builds = Arc::new(BuildCounter::default());

    let pending = {
        let router = router.clone();
        let destination = color_destination(&builds);
        tokio::spawn(async move { router.commit(&destination, "#FFAA00".to_string(), false).await })
    };
    arrived.notified().await;
    tokio::task::yield_now().await;
    assert!(started.lock().unwrap().is_empty());
    assert_eq!(builds.get(), 0);

    release.notify_one();
    assert!(pending.await.unwrap().is_success());
    assert_eq!(*started.lock().unwrap(), vec!["second"]);
    assert_eq!(builds.get(), 1);
}
