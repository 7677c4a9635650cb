use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use urlsync_engine::Debouncer;

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn bump(count: &Arc<AtomicUsize>, by: usize) -> impl std::future::Future<Output = ()> + Send + 'static {
    let count = Arc::clone(count);
    async move {
        count.fetch_add(by, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn fires_after_the_delay() {
    let debouncer = Debouncer::new();
    let count = counter();

    debouncer.schedule(Duration::from_millis(100), bump(&count, 1));
    assert!(debouncer.is_pending());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(!debouncer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn only_the_latest_schedule_fires() {
    let debouncer = Debouncer::new();
    let count = counter();

    debouncer.schedule(Duration::from_millis(100), bump(&count, 1));
    tokio::time::sleep(Duration::from_millis(60)).await;
    debouncer.schedule(Duration::from_millis(100), bump(&count, 10));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(count.load(Ordering::SeqCst), 10);
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_the_pending_action() {
    let debouncer = Debouncer::new();
    let count = counter();

    debouncer.schedule(Duration::from_millis(100), bump(&count, 1));
    debouncer.cancel();
    assert!(!debouncer.is_pending());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn drop_cancels() {
    let count = counter();
    {
        let debouncer = Debouncer::new();
        debouncer.schedule(Duration::from_millis(100), bump(&count, 1));
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn running_action_is_not_interrupted() {
    let debouncer = Debouncer::new();
    let count = counter();
    let slow = {
        let count = Arc::clone(&count);
        async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            count.fetch_add(1, Ordering::SeqCst);
        }
    };

    debouncer.schedule(Duration::from_millis(100), slow);
    tokio::time::sleep(Duration::from_millis(150)).await;
    debouncer.schedule(Duration::from_millis(100), bump(&count, 10));
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(count.load(Ordering::SeqCst), 11);
}
