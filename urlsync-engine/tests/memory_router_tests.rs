use urlsync_engine::{MemoryRouter, NavigationTarget, Navigator, RouteSource};
use urlsync_types::Query;

#[tokio::test]
async fn replace_keeps_history_length() {
    let router = MemoryRouter::at("/items?page=1");
    let mut rx = router.watch();

    router
        .replace(NavigationTarget::query(Query::parse("page=2")))
        .await
        .unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().to_string(), "/items?page=2");
    assert_eq!(router.history_len(), 1);
    assert_eq!(router.replace_count(), 1);
}

#[tokio::test]
async fn identical_replace_does_not_notify() {
    let router = MemoryRouter::at("/?page=1");
    let rx = router.watch();

    router
        .replace(NavigationTarget::query(Query::parse("page=1")))
        .await
        .unwrap();
    assert!(!rx.has_changed().unwrap());
    assert_eq!(router.replace_count(), 1);
}

#[tokio::test]
async fn push_adds_history() {
    let router = MemoryRouter::at("/");
    router.push(Query::parse("a=1"));
    router.push(Query::parse("a=2"));
    assert_eq!(router.history_len(), 3);
    assert_eq!(router.current().to_string(), "/?a=2");
}

#[tokio::test]
async fn failing_replace_leaves_location() {
    let router = MemoryRouter::at("/?a=1");
    router.set_fail_replace(true);
    let result = router
        .replace(NavigationTarget::query(Query::parse("a=2")))
        .await;
    assert!(result.is_err());
    assert_eq!(router.current().to_string(), "/?a=1");
}
