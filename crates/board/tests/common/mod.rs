//! Shared fixtures for board integration tests.
//!
//! [`FakeApi`] is an in-memory backend whose calls can be scripted to fail
//! or to stay open until the test releases them.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;
use tripboard_board::{BoardConfig, BoardController, BoardSnapshot, ItemView};
use tripboard_core::{
    Destination, DestinationId, FixedClock, Offer, OfferGroup, OfferId, Point, PointDraft,
    PointId, PointType, Timestamp,
};
use tripboard_remote::{PointsApi, RemoteError};

/// Backend operations a test can observe and script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchPoints,
    FetchDestinations,
    FetchOffers,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
pub struct FakeApi {
    points: Mutex<Vec<Point>>,
    destinations: Vec<Destination>,
    offers: Vec<OfferGroup>,
    calls: Mutex<Vec<Op>>,
    failing: Mutex<HashSet<Op>>,
    holds: Mutex<HashMap<Op, Arc<Semaphore>>>,
    next_id: AtomicUsize,
}

impl FakeApi {
    pub fn new(points: Vec<Point>) -> Arc<Self> {
        Arc::new(Self {
            points: Mutex::new(points),
            destinations: destinations(),
            offers: offer_groups(),
            ..Self::default()
        })
    }

    /// Backend holding [`fixture_points`].
    pub fn seeded() -> Arc<Self> {
        Self::new(fixture_points())
    }

    /// Make every call of `op` fail until [`recover`](Self::recover).
    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    /// Keep calls of `op` open until [`release`](Self::release) is called
    /// once per call.
    pub fn hold(&self, op: Op) {
        self.holds
            .lock()
            .unwrap()
            .insert(op, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, op: Op) {
        if let Some(gate) = self.holds.lock().unwrap().get(&op) {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    /// Yield until at least `count` calls of `op` have started.
    pub async fn wait_for_calls(&self, op: Op, count: usize) {
        for _ in 0..10_000 {
            if self.calls(op) >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("timed out waiting for {count} {op:?} calls");
    }

    pub fn backend_points(&self) -> Vec<Point> {
        self.points.lock().unwrap().clone()
    }

    async fn enter(&self, op: Op) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(op);

        let gate = self.holds.lock().unwrap().get(&op).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if self.failing.lock().unwrap().contains(&op) {
            return Err(RemoteError::Status {
                status: 500,
                body: format!("scripted {op:?} failure"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PointsApi for FakeApi {
    async fn fetch_points(&self) -> Result<Vec<Point>, RemoteError> {
        self.enter(Op::FetchPoints).await?;
        Ok(self.backend_points())
    }

    async fn fetch_destinations(&self) -> Result<Vec<Destination>, RemoteError> {
        self.enter(Op::FetchDestinations).await?;
        Ok(self.destinations.clone())
    }

    async fn fetch_offers(&self) -> Result<Vec<OfferGroup>, RemoteError> {
        self.enter(Op::FetchOffers).await?;
        Ok(self.offers.clone())
    }

    async fn create_point(&self, draft: &PointDraft) -> Result<Point, RemoteError> {
        self.enter(Op::Create).await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut assigned = draft.clone();
        assigned.id = Some(PointId::new(format!("srv-{n}")));
        let point = assigned
            .to_point()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        self.points.lock().unwrap().insert(0, point.clone());
        Ok(point)
    }

    async fn update_point(&self, point: &Point) -> Result<Point, RemoteError> {
        self.enter(Op::Update).await?;
        let mut points = self.points.lock().unwrap();
        match points.iter_mut().find(|p| p.id == point.id) {
            Some(slot) => {
                *slot = point.clone();
                Ok(point.clone())
            }
            None => Err(RemoteError::Status {
                status: 404,
                body: "Not found".to_string(),
            }),
        }
    }

    async fn delete_point(&self, id: &PointId) -> Result<(), RemoteError> {
        self.enter(Op::Delete).await?;
        self.points.lock().unwrap().retain(|p| &p.id != id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixture data
// ---------------------------------------------------------------------------

pub fn at(day: u32, hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

/// The instant every test board evaluates filters at.
pub fn now() -> Timestamp {
    at(10, 12)
}

pub const PAST: &str = "p-past";
pub const PRESENT: &str = "p-present";
pub const FUTURE: &str = "p-future";

fn point(
    id: &str,
    point_type: PointType,
    destination: &str,
    from: Timestamp,
    to: Timestamp,
    price: u32,
) -> Point {
    Point {
        id: PointId::new(id),
        point_type,
        destination: Some(DestinationId::new(destination)),
        date_from: Some(from),
        date_to: Some(to),
        base_price: price,
        is_favorite: false,
        offers: Vec::new(),
    }
}

/// Three points in backend order future, past, present.
///
/// | id          | dates                | duration | price |
/// |-------------|----------------------|----------|-------|
/// | `p-past`    | 1 Mar 10:00-11:00    | 1 h      | 20    |
/// | `p-present` | 10 Mar 08:00-11 Mar  | 26 h     | 300   |
/// | `p-future`  | 20 Mar 14:00-22 Mar  | 46 h     | 150   |
pub fn fixture_points() -> Vec<Point> {
    let mut past = point(PAST, PointType::Taxi, "d-ams", at(1, 10), at(1, 11), 20);
    past.offers = vec![OfferId::new("o-taxi-1")];

    let present = point(PRESENT, PointType::Flight, "d-gva", at(10, 8), at(11, 10), 300);

    let mut future = point(FUTURE, PointType::CheckIn, "d-cha", at(20, 14), at(22, 12), 150);
    future.is_favorite = true;

    vec![future, past, present]
}

pub fn destinations() -> Vec<Destination> {
    [("d-ams", "Amsterdam"), ("d-gva", "Geneva"), ("d-cha", "Chamonix")]
        .into_iter()
        .map(|(id, name)| Destination {
            id: DestinationId::new(id),
            name: name.to_string(),
            description: format!("{name} is lovely"),
            pictures: Vec::new(),
        })
        .collect()
}

pub fn offer_groups() -> Vec<OfferGroup> {
    let offer = |id: &str, title: &str, price: u32| Offer {
        id: OfferId::new(id),
        title: title.to_string(),
        price,
    };
    vec![
        OfferGroup {
            point_type: PointType::Taxi,
            offers: vec![offer("o-taxi-1", "Upgrade to business", 20)],
        },
        OfferGroup {
            point_type: PointType::Flight,
            offers: vec![
                offer("o-fl-1", "Add luggage", 30),
                offer("o-fl-2", "Switch to comfort", 100),
            ],
        },
        OfferGroup {
            point_type: PointType::CheckIn,
            offers: vec![offer("o-ci-1", "Add breakfast", 50)],
        },
    ]
}

// ---------------------------------------------------------------------------
// Board helpers
// ---------------------------------------------------------------------------

/// A board over `api` that has not loaded yet.
pub fn board(api: &Arc<FakeApi>) -> Arc<BoardController> {
    let api: Arc<dyn PointsApi> = api.clone();
    Arc::new(BoardController::from_config(
        api,
        &BoardConfig::default(),
        &FixedClock(now()),
    ))
}

pub async fn loaded_board(api: &Arc<FakeApi>) -> Arc<BoardController> {
    let board = board(api);
    board.load().await;
    board
}

pub fn id(raw: &str) -> PointId {
    PointId::new(raw)
}

/// Point ids of the rendered items, in list order.
pub fn item_ids(snapshot: &BoardSnapshot) -> Vec<String> {
    snapshot
        .items
        .iter()
        .map(|item| match item {
            ItemView::Display { point, .. } => point.id.to_string(),
            ItemView::Editing { point_id, .. } => point_id.to_string(),
        })
        .collect()
}

pub fn item_view<'a>(snapshot: &'a BoardSnapshot, raw: &str) -> &'a ItemView {
    snapshot
        .items
        .iter()
        .find(|item| match item {
            ItemView::Display { point, .. } => point.id.as_str() == raw,
            ItemView::Editing { point_id, .. } => point_id.as_str() == raw,
        })
        .unwrap_or_else(|| panic!("no item {raw}"))
}
