use super::*;
use crate::error::StoreErrorKind;
use crate::request::{HttpMethod, MockHttpClient};
use crate::session::MemoryTokenStore;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

// =========================================================
// Helpers
// =========================================================

const BASE: &str = "http://backend/api";

type TestStore = Store<MockHttpClient, MemoryTokenStore>;

fn setup(token: Option<&str>) -> (TestStore, MemoryTokenStore) {
    let tokens = match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    };
    let gateway = GatewayClient::new(MockHttpClient::new(), BASE);
    (Store::new(gateway, tokens.clone()), tokens)
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

fn http(store: &TestStore) -> &MockHttpClient {
    store.gateway().client()
}

fn nid(id: i64) -> NotificationId {
    NotificationId::Number(id)
}

fn note(id: i64, status: &str) -> Notification {
    Notification::new(nid(id), status)
}

fn notification_ids(store: &TestStore) -> Vec<NotificationId> {
    store.notifications().into_iter().map(|n| n.id).collect()
}

fn sent_body(store: &TestStore) -> Value {
    let req = http(store).last_request().unwrap();
    serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
}

fn credentials() -> Credentials {
    Credentials {
        username: "dispatcher".into(),
        password: "hunter2".into(),
    }
}

// =========================================================
// Session
// =========================================================

#[tokio::test]
async fn login_sets_user_and_token_and_persists() {
    let (store, tokens) = setup(None);
    http(&store).mock_response(
        HttpMethod::Post,
        &url("/login"),
        200,
        json!({ "token": "jwt-1", "user": { "id": 7, "username": "dispatcher" } }),
    );

    let resp = store.login(credentials()).await.unwrap();

    assert_eq!(resp.token, "jwt-1");
    assert!(store.is_authenticated());
    assert_eq!(store.token().as_deref(), Some("jwt-1"));
    assert_eq!(store.user().unwrap().username.as_deref(), Some("dispatcher"));
    assert_eq!(tokens.load().as_deref(), Some("jwt-1"));
    assert!(!store.is_loading());
    assert!(store.error().is_none());
    assert_eq!(
        sent_body(&store),
        json!({ "username": "dispatcher", "password": "hunter2" })
    );
}

#[tokio::test]
async fn login_failure_commits_server_message() {
    let (store, tokens) = setup(None);
    http(&store).mock_response(
        HttpMethod::Post,
        &url("/login"),
        401,
        json!({ "message": "Invalid credentials" }),
    );

    let err = store.login(credentials()).await.unwrap_err();

    assert_eq!(err.kind, StoreErrorKind::Rejected);
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(store.error().as_deref(), Some("Invalid credentials"));
    assert!(!store.is_authenticated());
    assert!(store.user().is_none());
    assert_eq!(tokens.load(), None);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn login_without_user_in_response_still_authenticates() {
    let (store, tokens) = setup(None);
    http(&store).mock_response(HttpMethod::Post, &url("/login"), 200, json!({ "token": "t" }));

    let resp = store.login(credentials()).await.unwrap();

    assert!(resp.user.is_none());
    assert!(store.is_authenticated());
    assert!(store.user().is_none());
    assert_eq!(tokens.load().as_deref(), Some("t"));
    assert!(store.error().is_none());
}

#[tokio::test]
async fn logout_clears_session_and_persisted_token() {
    let (store, tokens) = setup(None);
    http(&store).mock_response(
        HttpMethod::Post,
        &url("/login"),
        200,
        json!({ "token": "jwt-1", "user": { "username": "dispatcher" } }),
    );
    store.login(credentials()).await.unwrap();

    let before = http(&store).request_count();
    store.logout();

    assert!(!store.is_authenticated());
    assert!(store.user().is_none());
    assert_eq!(tokens.load(), None);
    assert_eq!(http(&store).request_count(), before);
}

#[test]
fn persisted_token_is_restored_without_user() {
    let (store, _) = setup(Some("from-last-run"));
    assert!(store.is_authenticated());
    assert_eq!(store.token().as_deref(), Some("from-last-run"));
    assert!(store.user().is_none());
}

// =========================================================
// Precondition & error protocol
// =========================================================

#[tokio::test]
async fn actions_without_token_never_reach_gateway() {
    let (store, _) = setup(None);

    let err = store.fetch_devices().await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::Unauthenticated);
    assert_eq!(store.error().as_deref(), Some("Failed to fetch devices"));

    let err = store.delete_notification(nid(3)).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::Unauthenticated);
    assert_eq!(store.error().as_deref(), Some("Failed to delete notification"));

    assert_eq!(http(&store).request_count(), 0);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn fetch_devices_failure_keeps_previous_devices() {
    let (store, _) = setup(Some("tok"));
    http(&store).mock_response(
        HttpMethod::Get,
        &url("/devices"),
        200,
        json!([{ "id": 1, "name": "Reefer 1" }]),
    );
    let first = store.fetch_devices().await.unwrap();
    assert_eq!(first.len(), 1);

    http(&store).mock_response(
        HttpMethod::Get,
        &url("/devices"),
        503,
        json!({ "message": "Device service unavailable" }),
    );
    let err = store.fetch_devices().await.unwrap_err();

    assert_eq!(err.message(), "Device service unavailable");
    assert_eq!(store.error().as_deref(), Some("Device service unavailable"));
    assert_eq!(store.devices(), first);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn transport_failure_uses_default_message() {
    let (store, _) = setup(Some("tok"));
    http(&store).fail_transport(HttpMethod::Get, &url("/notifications/pending"));

    let err = store.fetch_pending_notifications().await.unwrap_err();

    assert_eq!(err.kind, StoreErrorKind::Transport);
    assert_eq!(
        store.error().as_deref(),
        Some("Failed to fetch pending notifications")
    );
}

#[tokio::test]
async fn next_action_clears_previous_error() {
    let (store, _) = setup(Some("tok"));
    store.fetch_devices().await.unwrap_err();
    assert!(store.error().is_some());

    http(&store).mock_response(HttpMethod::Get, &url("/devices"), 200, json!([]));
    store.fetch_devices().await.unwrap();
    assert!(store.error().is_none());
}

#[tokio::test]
async fn every_action_attaches_bearer_token() {
    let (store, _) = setup(Some("tok-9"));
    http(&store).mock_response(HttpMethod::Get, &url("/devices"), 200, json!([]));
    store.fetch_devices().await.unwrap();

    let req = http(&store).last_request().unwrap();
    assert_eq!(req.url, url("/devices"));
    assert_eq!(
        req.headers.get("Authorization").map(String::as_str),
        Some("Bearer tok-9")
    );
}

#[tokio::test]
async fn commits_follow_the_action_protocol() {
    let (store, _) = setup(None);
    http(&store).mock_response(
        HttpMethod::Post,
        &url("/login"),
        200,
        json!({ "token": "jwt", "user": {} }),
    );
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    store.subscribe(move |m, state| {
        sink.borrow_mut()
            .push((m.name(), state.is_loading()));
    });

    store.login(credentials()).await.unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            ("set_loading", true),
            ("set_error", true),
            ("set_user", true),
            ("set_token", true),
            ("set_loading", false),
        ]
    );
}

#[tokio::test]
async fn failed_action_commits_error_before_loading_reset() {
    let (store, _) = setup(Some("tok"));
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    store.subscribe(move |m, _| sink.borrow_mut().push(m.clone()));

    store.acknowledge_notification(nid(5)).await.unwrap_err();

    assert_eq!(
        *log.borrow(),
        vec![
            Mutation::SetLoading(true),
            Mutation::SetError(None),
            Mutation::SetError(Some("Failed to acknowledge notification".into())),
            Mutation::SetLoading(false),
        ]
    );
}

// =========================================================
// Devices
// =========================================================

#[tokio::test]
async fn device_caches_are_independent_per_device() {
    let (store, _) = setup(Some("tok"));
    let a = DeviceId::from("a");
    let b = DeviceId::from("b");
    http(&store).mock_response(
        HttpMethod::Get,
        &url("/devices/a/last-data"),
        200,
        json!({ "temperature": 4.5 }),
    );
    http(&store).mock_response(
        HttpMethod::Get,
        &url("/devices/b/last-data"),
        200,
        json!({ "temperature": -18.0 }),
    );
    http(&store).mock_response(
        HttpMethod::Get,
        &url("/devices/a/locations"),
        200,
        json!([{ "latitude": 48.1, "longitude": 11.5 }, { "latitude": 48.2, "longitude": 11.6 }]),
    );

    store.fetch_device_last_data(&a).await.unwrap();
    store.fetch_device_last_data(&b).await.unwrap();
    let points = store.fetch_device_locations(&a).await.unwrap();

    assert_eq!(
        store.device_last_data(&a).unwrap().get("temperature"),
        Some(&json!(4.5))
    );
    assert_eq!(
        store.device_last_data(&b).unwrap().get("temperature"),
        Some(&json!(-18.0))
    );
    assert_eq!(points.len(), 2);
    assert_eq!(store.device_locations(&a).unwrap()[1].coordinates(), Some((48.2, 11.6)));
    assert!(store.device_locations(&b).is_none());
    // Uncached lookups never fetch.
    let before = http(&store).request_count();
    assert!(store.device_last_data(&DeviceId::from("zzz")).is_none());
    assert_eq!(http(&store).request_count(), before);
}

#[tokio::test]
async fn failed_last_data_fetch_keeps_cached_entry() {
    let (store, _) = setup(Some("tok"));
    let a = DeviceId::from("a");
    http(&store).mock_response(
        HttpMethod::Get,
        &url("/devices/a/last-data"),
        200,
        json!({ "speed": 60 }),
    );
    store.fetch_device_last_data(&a).await.unwrap();

    http(&store).mock_response(HttpMethod::Get, &url("/devices/a/last-data"), 500, json!({}));
    store.fetch_device_last_data(&a).await.unwrap_err();

    assert_eq!(store.device_last_data(&a).unwrap().get("speed"), Some(&json!(60)));
    assert_eq!(store.error().as_deref(), Some("Failed to fetch device last data"));
}

// =========================================================
// Notifications
// =========================================================

async fn seed_notifications(store: &TestStore, list: Value) {
    http(store).mock_response(
        HttpMethod::Get,
        &url("/devices/d1/notifications"),
        200,
        list,
    );
    store
        .fetch_device_notifications(&DeviceId::from("d1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn device_and_pending_lists_are_tracked_separately() {
    let (store, _) = setup(Some("tok"));
    seed_notifications(&store, json!([{ "id": 1, "status": "pending" }])).await;
    http(&store).mock_response(
        HttpMethod::Get,
        &url("/notifications/pending"),
        200,
        json!([{ "id": 1, "status": "pending" }, { "id": 2, "status": "pending" }]),
    );
    store.fetch_pending_notifications().await.unwrap();

    http(&store).mock_response(
        HttpMethod::Put,
        &url("/notifications/1/acknowledge"),
        200,
        json!({ "id": 1, "status": "acknowledged" }),
    );
    store.acknowledge_notification(nid(1)).await.unwrap();

    assert_eq!(store.notification_by_id(&nid(1)).unwrap().status, "acknowledged");
    assert_eq!(store.pending_notifications().len(), 2);
    assert_eq!(store.pending_notifications()[0].status, "pending");
    assert_eq!(sent_body(&store), json!({}));
}

#[tokio::test]
async fn create_notification_appends() {
    let (store, _) = setup(Some("tok"));
    seed_notifications(&store, json!([{ "id": 1, "status": "pending" }])).await;
    http(&store).mock_response(
        HttpMethod::Post,
        &url("/notifications"),
        201,
        json!({
            "id": 2, "device_id": "d1", "type": "maintenance",
            "message": "Replace filter", "status": "pending", "asset_data_id": 77
        }),
    );

    let created = store
        .create_notification(CreateNotificationRequest {
            device_id: "d1".into(),
            kind: "maintenance".into(),
            message: "Replace filter".into(),
            asset_data_id: Some(json!(77)),
        })
        .await
        .unwrap();

    assert_eq!(created.id, nid(2));
    assert_eq!(notification_ids(&store), vec![nid(1), nid(2)]);
    assert_eq!(
        sent_body(&store),
        json!({
            "device_id": "d1", "type": "maintenance",
            "message": "Replace filter", "asset_data_id": 77
        })
    );
}

#[tokio::test]
async fn batch_acknowledge_updates_each_returned_notification() {
    let (store, _) = setup(Some("tok"));
    seed_notifications(
        &store,
        json!([
            { "id": 1, "status": "pending" },
            { "id": 2, "status": "pending" },
            { "id": 3, "status": "pending" }
        ]),
    )
    .await;
    http(&store).mock_response(
        HttpMethod::Put,
        &url("/notifications/batch/acknowledge"),
        200,
        json!({ "notifications": [{ "id": 1, "status": "ack" }, { "id": 2, "status": "ack" }] }),
    );

    let resp = store
        .batch_acknowledge_notifications(vec![nid(1), nid(2)])
        .await
        .unwrap();

    assert_eq!(resp.notifications.len(), 2);
    assert_eq!(store.notification_by_id(&nid(1)).unwrap().status, "ack");
    assert_eq!(store.notification_by_id(&nid(2)).unwrap().status, "ack");
    assert_eq!(store.notification_by_id(&nid(3)).unwrap().status, "pending");
    assert_eq!(sent_body(&store), json!({ "notification_ids": [1, 2] }));
}

#[tokio::test]
async fn update_status_replaces_matching_entry() {
    let (store, _) = setup(Some("tok"));
    seed_notifications(
        &store,
        json!([{ "id": 4, "status": "pending", "message": "old" }, { "id": 5, "status": "pending" }]),
    )
    .await;
    http(&store).mock_response(
        HttpMethod::Put,
        &url("/notifications/4"),
        200,
        json!({ "id": 4, "status": "resolved", "message": "fixed on site" }),
    );

    store
        .update_notification_status(UpdateNotificationRequest {
            id: nid(4),
            status: "resolved".into(),
            message: Some("fixed on site".into()),
        })
        .await
        .unwrap();

    let updated = store.notification_by_id(&nid(4)).unwrap();
    assert_eq!(updated.status, "resolved");
    assert_eq!(updated.message, "fixed on site");
    assert_eq!(store.notifications()[1], note(5, "pending"));
    assert_eq!(
        sent_body(&store),
        json!({ "status": "resolved", "message": "fixed on site" })
    );
}

#[tokio::test]
async fn update_for_unknown_id_leaves_list_unchanged() {
    let (store, _) = setup(Some("tok"));
    seed_notifications(&store, json!([{ "id": 1, "status": "pending" }])).await;
    http(&store).mock_response(
        HttpMethod::Put,
        &url("/notifications/9/acknowledge"),
        200,
        json!({ "id": 9, "status": "ack" }),
    );

    store.acknowledge_notification(nid(9)).await.unwrap();

    assert_eq!(store.notifications(), vec![note(1, "pending")]);
}

#[tokio::test]
async fn delete_removes_only_after_remote_success() {
    let (store, _) = setup(Some("tok"));
    seed_notifications(
        &store,
        json!([{ "id": 1, "status": "p" }, { "id": 2, "status": "p" }, { "id": 3, "status": "p" }]),
    )
    .await;

    http(&store).mock_response(
        HttpMethod::Delete,
        &url("/notifications/2"),
        403,
        json!({ "message": "Not allowed" }),
    );
    store.delete_notification(nid(2)).await.unwrap_err();
    assert_eq!(store.notifications().len(), 3);
    assert_eq!(store.error().as_deref(), Some("Not allowed"));

    http(&store).mock_raw(HttpMethod::Delete, &url("/notifications/2"), 204, "");
    store.delete_notification(nid(2)).await.unwrap();
    assert_eq!(notification_ids(&store), vec![nid(1), nid(3)]);
    assert!(store.error().is_none());
}

#[tokio::test]
async fn delete_ignores_whatever_body_the_server_returns() {
    let (store, _) = setup(Some("tok"));
    seed_notifications(
        &store,
        json!([{ "id": 1, "status": "p" }, { "id": 2, "status": "p" }, { "id": 3, "status": "p" }]),
    )
    .await;

    http(&store).mock_response(
        HttpMethod::Delete,
        &url("/notifications/1"),
        200,
        json!({ "message": "deleted" }),
    );
    store.delete_notification(nid(1)).await.unwrap();
    assert_eq!(notification_ids(&store), vec![nid(2), nid(3)]);
    assert!(store.error().is_none());

    http(&store).mock_response(HttpMethod::Delete, &url("/notifications/3"), 200, json!(true));
    store.delete_notification(nid(3)).await.unwrap();
    assert_eq!(notification_ids(&store), vec![nid(2)]);
    assert!(store.error().is_none());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn string_notification_ids_flow_through_every_call() {
    let (store, _) = setup(Some("tok"));
    seed_notifications(
        &store,
        json!([
            { "id": "c0ffee-01", "status": "pending" },
            { "id": 2, "status": "pending" }
        ]),
    )
    .await;
    let uuid = NotificationId::from("c0ffee-01");
    assert_eq!(notification_ids(&store), vec![uuid.clone(), nid(2)]);

    http(&store).mock_response(
        HttpMethod::Put,
        &url("/notifications/batch/acknowledge"),
        200,
        json!({ "notifications": [{ "id": "c0ffee-01", "status": "ack" }] }),
    );
    store
        .batch_acknowledge_notifications(vec![uuid.clone(), nid(2)])
        .await
        .unwrap();
    assert_eq!(
        sent_body(&store),
        json!({ "notification_ids": ["c0ffee-01", 2] })
    );
    assert_eq!(store.notification_by_id(&uuid).unwrap().status, "ack");

    http(&store).mock_raw(HttpMethod::Delete, &url("/notifications/c0ffee-01"), 204, "");
    store.delete_notification(uuid).await.unwrap();
    assert_eq!(notification_ids(&store), vec![nid(2)]);
}

// =========================================================
// Interleaving
// =========================================================

#[tokio::test]
async fn overlapping_actions_share_the_loading_flag() {
    let (store, _) = setup(Some("tok"));
    let a = DeviceId::from("a");
    let b = DeviceId::from("b");
    http(&store).mock_response(
        HttpMethod::Get,
        &url("/devices/a/last-data"),
        200,
        json!({ "v": 1 }),
    );
    http(&store).mock_response(
        HttpMethod::Get,
        &url("/devices/b/last-data"),
        200,
        json!({ "v": 2 }),
    );
    let release_a = http(&store).hold(HttpMethod::Get, &url("/devices/a/last-data"));

    let store_ref = &store;
    let a_ref = &a;
    let (ra, rb, observed) = futures::join!(
        store.fetch_device_last_data(&a),
        store.fetch_device_last_data(&b),
        async move {
            // `b` has finished, `a` is still suspended in the gateway.
            let observed = (
                store_ref.is_loading(),
                store_ref.device_last_data(a_ref).is_some(),
            );
            let _ = release_a.send(());
            observed
        }
    );

    assert_eq!(observed, (false, false));
    assert!(ra.is_ok());
    assert!(rb.is_ok());
    assert!(!store.is_loading());
    assert_eq!(store.device_last_data(&a).unwrap().get("v"), Some(&json!(1)));
    assert_eq!(store.device_last_data(&b).unwrap().get("v"), Some(&json!(2)));
}
