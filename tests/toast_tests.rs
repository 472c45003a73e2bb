use shift_grid::{ToastKind, ToastStore};
use std::time::{Duration, Instant};

#[test]
fn notifications_arrive_through_the_notifier() {
    let mut store = ToastStore::new(Duration::from_millis(4000));
    let notifier = store.notifier();
    notifier.success("Shift created");
    notifier.clone().error("Failed to save shift");

    assert_eq!(store.drain(), 2);
    let kinds: Vec<ToastKind> = store.toasts().iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![ToastKind::Success, ToastKind::Error]);
    assert_eq!(store.latest().unwrap().message, "Failed to save shift");
    assert_eq!(store.toasts()[0].duration, Some(Duration::from_millis(4000)));
}

#[test]
fn toasts_expire_after_their_duration() {
    let mut store = ToastStore::new(Duration::from_secs(4));
    store.push(ToastKind::Info, "short", Some(Duration::from_secs(1)));
    store.push(ToastKind::Info, "default", None);
    store.push(ToastKind::Warning, "sticky", Some(Duration::ZERO));

    let later = Instant::now() + Duration::from_secs(2);
    assert_eq!(store.expire(later), 1);
    let much_later = Instant::now() + Duration::from_secs(3600);
    assert_eq!(store.expire(much_later), 1);

    let remaining: Vec<&str> = store.toasts().iter().map(|t| t.message.as_str()).collect();
    assert_eq!(remaining, vec!["sticky"]);
    assert_eq!(store.toasts()[0].duration, None);
}

#[test]
fn dismiss_and_clear_remove_toasts() {
    let mut store = ToastStore::new(Duration::from_secs(4));
    let first = store.push(ToastKind::Success, "one", None);
    let second = store.push(ToastKind::Success, "two", None);
    assert_ne!(first, second);

    assert!(store.dismiss(first));
    assert!(!store.dismiss(first));
    assert_eq!(store.toasts().len(), 1);

    store.clear();
    assert!(store.toasts().is_empty());
    assert!(store.latest().is_none());
}

#[test]
fn notifier_outliving_the_store_is_harmless() {
    let store = ToastStore::new(Duration::from_secs(4));
    let notifier = store.notifier();
    drop(store);
    notifier.warning("nobody is listening");
}
