//! Integration tests for `PointsStore` against a scripted backend.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use tripboard_board::{PointsStore, StoreChange, StoreError};
use tripboard_core::{PointDraft, PointType};
use tripboard_events::{Received, Signal, UpdateScope};
use tripboard_remote::{PointsApi, RemoteError};

use common::{id, FakeApi, Op, FUTURE, PAST, PRESENT};

fn store(api: &Arc<FakeApi>) -> PointsStore {
    let api: Arc<dyn PointsApi> = api.clone();
    PointsStore::new(api, 16)
}

async fn loaded_store(api: &Arc<FakeApi>) -> PointsStore {
    let store = store(api);
    store.init().await;
    store
}

fn only_signal(received: Vec<Received<StoreChange>>) -> Signal<StoreChange> {
    assert_eq!(received.len(), 1, "expected exactly one signal, got {received:?}");
    match received.into_iter().next() {
        Some(Received::Signal(signal)) => signal,
        other => panic!("expected a signal, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: init loads all three collections and emits Init
// ---------------------------------------------------------------------------

#[tokio::test]
async fn init_loads_everything_and_emits_init() {
    let api = FakeApi::seeded();
    let store = store(&api);
    let mut rx = store.subscribe();

    store.init().await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.points.len(), 3);
    assert_eq!(snapshot.destinations.len(), 3);
    assert_eq!(snapshot.offers.offers_for(PointType::Flight).len(), 2);
    assert!(!snapshot.load_failed);

    let signal = only_signal(rx.drain());
    assert_eq!(signal.scope, UpdateScope::Init);
    assert_eq!(signal.payload, StoreChange::Loaded);
}

// ---------------------------------------------------------------------------
// Test: any failed fetch leaves all collections empty
// ---------------------------------------------------------------------------

#[tokio::test]
async fn init_failure_clears_everything_and_still_emits_init() {
    let api = FakeApi::seeded();
    api.fail(Op::FetchOffers);
    let store = store(&api);
    let mut rx = store.subscribe();

    store.init().await;

    assert!(store.is_load_failed().await);
    assert!(store.points().await.is_empty());
    assert!(store.destinations().await.is_empty());
    assert!(store.offers_by_type().await.is_empty());
    assert_eq!(only_signal(rx.drain()).scope, UpdateScope::Init);
}

// ---------------------------------------------------------------------------
// Test: update replaces in place and emits Patch with the saved point
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_replaces_in_place_and_emits_patch() {
    let api = FakeApi::seeded();
    let store = loaded_store(&api).await;
    let mut rx = store.subscribe();

    let mut point = store.points().await[1].clone();
    assert_eq!(point.id, id(PAST));
    point.base_price = 999;

    let saved = store.update_point(&point).await.unwrap();
    assert_eq!(saved.base_price, 999);

    let points = store.points().await;
    assert_eq!(points.len(), 3);
    assert_eq!(points[1], saved);

    let signal = only_signal(rx.drain());
    assert_eq!(signal.scope, UpdateScope::Patch);
    assert_eq!(signal.payload, StoreChange::Updated(saved));
}

// ---------------------------------------------------------------------------
// Test: failed update leaves the collection identical and emits nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_update_changes_nothing() {
    let api = FakeApi::seeded();
    let store = loaded_store(&api).await;
    let before = store.points().await;
    let mut rx = store.subscribe();
    api.fail(Op::Update);

    let mut point = before[0].clone();
    point.is_favorite = !point.is_favorite;
    let err = store.update_point(&point).await.unwrap_err();

    assert_matches!(err, StoreError::Remote(RemoteError::Status { status: 500, .. }));
    assert_eq!(store.points().await, before);
    assert!(rx.drain().is_empty());
}

// ---------------------------------------------------------------------------
// Test: update of a point missing locally never reaches the backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_of_unknown_point_is_not_found() {
    let api = FakeApi::seeded();
    let store = loaded_store(&api).await;

    let mut ghost = store.points().await[0].clone();
    ghost.id = id("ghost");

    assert_matches!(store.update_point(&ghost).await, Err(StoreError::NotFound(missing)) if missing == id("ghost"));
    assert_eq!(api.calls(Op::Update), 0);
}

// ---------------------------------------------------------------------------
// Test: add prepends the created point and emits Major
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_prepends_and_emits_major() {
    let api = FakeApi::seeded();
    let store = loaded_store(&api).await;
    let mut rx = store.subscribe();

    let mut draft = PointDraft::blank();
    draft.base_price = 42;
    let created = store.add_point(&draft).await.unwrap();

    assert_eq!(created.id, id("srv-1"));
    let points = store.points().await;
    assert_eq!(points.len(), 4);
    assert_eq!(points[0], created);

    let signal = only_signal(rx.drain());
    assert_eq!(signal.scope, UpdateScope::Major);
    assert_eq!(signal.payload, StoreChange::Added(created));
}

#[tokio::test]
async fn failed_add_changes_nothing() {
    let api = FakeApi::seeded();
    let store = loaded_store(&api).await;
    let mut rx = store.subscribe();
    api.fail(Op::Create);

    assert_matches!(
        store.add_point(&PointDraft::blank()).await,
        Err(StoreError::Remote(_))
    );
    assert_eq!(store.points().await.len(), 3);
    assert!(rx.drain().is_empty());
}

// ---------------------------------------------------------------------------
// Test: delete removes the point and emits Major
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_and_emits_major() {
    let api = FakeApi::seeded();
    let store = loaded_store(&api).await;
    let mut rx = store.subscribe();

    let target = store.points().await[2].clone();
    assert_eq!(target.id, id(PRESENT));
    store.delete_point(&target).await.unwrap();

    let remaining: Vec<String> = store
        .points()
        .await
        .iter()
        .map(|p| p.id.to_string())
        .collect();
    assert_eq!(remaining, vec![FUTURE, PAST]);

    let signal = only_signal(rx.drain());
    assert_eq!(signal.scope, UpdateScope::Major);
    assert_eq!(signal.payload, StoreChange::Deleted(id(PRESENT)));
}

#[tokio::test]
async fn delete_of_absent_point_is_not_found_and_unchanged() {
    let api = FakeApi::seeded();
    let store = loaded_store(&api).await;
    let mut rx = store.subscribe();

    let mut ghost = store.points().await[0].clone();
    ghost.id = id("ghost");

    assert_matches!(store.delete_point(&ghost).await, Err(StoreError::NotFound(_)));
    assert_eq!(store.points().await.len(), 3);
    assert_eq!(api.calls(Op::Delete), 0);
    assert!(rx.drain().is_empty());
}
