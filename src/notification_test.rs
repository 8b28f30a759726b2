use super::*;

// =============================================================
// add / remove
// =============================================================

#[tokio::test]
async fn add_records_message_fields() {
    let store = NotificationStore::new();
    let id = store.add("Saved", NotificationKind::Success, Some("Clients".into()), Duration::ZERO);

    let messages = store.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, id);
    assert_eq!(messages[0].message, "Saved");
    assert_eq!(messages[0].title.as_deref(), Some("Clients"));
    assert_eq!(messages[0].kind, NotificationKind::Success);
}

#[tokio::test]
async fn ids_are_unique() {
    let store = NotificationStore::new();
    let a = store.add("a", NotificationKind::Info, None, Duration::ZERO);
    let b = store.add("a", NotificationKind::Info, None, Duration::ZERO);
    assert_ne!(a, b);
}

#[tokio::test]
async fn remove_filters_only_that_message() {
    let store = NotificationStore::new();
    let a = store.add("a", NotificationKind::Info, None, Duration::ZERO);
    let b = store.add("b", NotificationKind::Info, None, Duration::ZERO);

    store.remove(a);

    let ids: Vec<Uuid> = store.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![b]);
}

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let store = NotificationStore::new();
    store.add("a", NotificationKind::Info, None, Duration::ZERO);
    store.remove(Uuid::new_v4());
    assert_eq!(store.messages().len(), 1);
}

// =============================================================
// Expiry
// =============================================================

#[tokio::test]
async fn zero_timeout_is_never_removed() {
    let store = NotificationStore::new();
    store.add("x", NotificationKind::Error, Some("T".into()), Duration::ZERO);

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.messages().len(), 1);
}

#[tokio::test]
async fn positive_timeout_expires() {
    let store = NotificationStore::new();
    store.add("x", NotificationKind::Info, None, Duration::from_millis(100));
    assert_eq!(store.messages().len(), 1);

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(store.messages().is_empty());
}

#[tokio::test]
async fn manual_remove_cancels_expiry_timer() {
    let store = NotificationStore::new();
    let id = store.add("x", NotificationKind::Info, None, Duration::from_millis(50));
    store.remove(id);

    assert!(store.inner.lock().unwrap().timers.is_empty());
}

#[tokio::test]
async fn expiry_after_store_drop_is_harmless() {
    let store = NotificationStore::new();
    store.add("x", NotificationKind::Info, None, Duration::from_millis(20));
    drop(store);
    tokio::time::sleep(Duration::from_millis(80)).await;
}

#[test]
fn without_runtime_message_persists() {
    let store = NotificationStore::new();
    store.info("no runtime", None, None);
    assert_eq!(store.messages().len(), 1);
    assert!(store.inner.lock().unwrap().timers.is_empty());
}

// =============================================================
// Convenience wrappers
// =============================================================

#[tokio::test]
async fn wrappers_fix_kind() {
    let store = NotificationStore::new();
    store.info("i", None, Some(Duration::ZERO));
    store.error("e", None, Some(Duration::ZERO));
    store.success("s", None, Some(Duration::ZERO));
    store.warning("w", None, Some(Duration::ZERO));

    let kinds: Vec<NotificationKind> = store.messages().iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::Info, NotificationKind::Error, NotificationKind::Success, NotificationKind::Warning]
    );
}

#[tokio::test]
async fn wrappers_default_to_five_second_timeout() {
    let store = NotificationStore::new();
    store.warning("w", None, None);
    assert_eq!(store.inner.lock().unwrap().timers.len(), 1);
}

// =============================================================
// Subscription / wire shape
// =============================================================

#[tokio::test]
async fn subscribers_see_changes() {
    let store = NotificationStore::new();
    let mut rx = store.subscribe();

    let id = store.error("boom", None, Some(Duration::ZERO));
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);

    store.remove(id);
    rx.changed().await.unwrap();
    assert!(rx.borrow().is_empty());
}

#[test]
fn message_serializes_kind_as_type() {
    let msg = NotificationMessage {
        id: Uuid::nil(),
        message: "m".into(),
        title: None,
        kind: NotificationKind::Warning,
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["type"], "warning");
    assert!(json.get("title").is_none());
}
