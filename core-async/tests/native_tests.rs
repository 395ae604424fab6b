//! Integration tests for the runtime seam.

use core_async::{task, time};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[core_async::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[core_async::test]
async fn test_timeout_success() {
    let result = time::timeout(time::Duration::from_millis(100), async {
        time::sleep(time::Duration::from_millis(10)).await;
        42
    })
    .await;

    assert_eq!(result.unwrap(), 42);
}

#[core_async::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(100)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[core_async::test]
async fn test_with_deadline_none_never_elapses() {
    let result = time::with_deadline(None, async {
        time::sleep(time::Duration::from_millis(20)).await;
        "done"
    })
    .await;

    assert_eq!(result.unwrap(), "done");
}

#[core_async::test]
async fn test_with_deadline_elapses() {
    let result = time::with_deadline(Some(time::Duration::from_millis(5)), async {
        time::sleep(time::Duration::from_millis(200)).await;
    })
    .await;

    assert!(result.is_err());
}

#[core_async::test]
async fn test_timeout_drops_inner_future() {
    struct DropFlag(Arc<AtomicUsize>);
    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let drops = Arc::new(AtomicUsize::new(0));
    let flag = DropFlag(drops.clone());

    let result = time::timeout(time::Duration::from_millis(5), async move {
        let _held = flag;
        time::sleep(time::Duration::from_millis(200)).await;
    })
    .await;

    assert!(result.is_err());
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[core_async::test(multi_thread)]
async fn test_concurrent_task_execution() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for _ in 0..10 {
        let counter_clone = counter.clone();
        handles.push(task::spawn(async move {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[core_async::test]
async fn test_yield_now() {
    task::yield_now().await;
}
