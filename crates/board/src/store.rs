//! Observable store for points and reference data.
//!
//! Every command follows the same order: remote call first, local mutation
//! second, one signal last. A failed remote call leaves the collection
//! untouched and emits nothing. The local mutation and the signal happen
//! under the same write lock, so subscribers never observe a signal whose
//! change is not yet visible.

use std::sync::Arc;

use tokio::sync::RwLock;
use tripboard_core::{Destination, OffersByType, Point, PointDraft, PointId};
use tripboard_events::{SignalBus, SignalReceiver, UpdateScope};
use tripboard_remote::PointsApi;

use crate::error::StoreError;

/// Payload of every signal emitted by [`PointsStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    /// Initial load finished, successfully or not.
    Loaded,
    /// A point was replaced in place (`Patch`).
    Updated(Point),
    /// A point was prepended (`Major`).
    Added(Point),
    /// A point was removed (`Major`).
    Deleted(PointId),
}

/// A consistent copy of everything the store holds.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub points: Vec<Point>,
    pub destinations: Vec<Destination>,
    pub offers: OffersByType,
    pub load_failed: bool,
}

#[derive(Default)]
struct StoreState {
    points: Vec<Point>,
    destinations: Vec<Destination>,
    offers: OffersByType,
    load_failed: bool,
}

/// Authoritative local copy of the backend's points.
pub struct PointsStore {
    api: Arc<dyn PointsApi>,
    state: RwLock<StoreState>,
    bus: SignalBus<StoreChange>,
}

impl PointsStore {
    pub fn new(api: Arc<dyn PointsApi>, signal_capacity: usize) -> Self {
        Self {
            api,
            state: RwLock::new(StoreState::default()),
            bus: SignalBus::new(signal_capacity),
        }
    }

    pub fn subscribe(&self) -> SignalReceiver<StoreChange> {
        self.bus.subscribe()
    }

    pub async fn points(&self) -> Vec<Point> {
        self.state.read().await.points.clone()
    }

    pub async fn destinations(&self) -> Vec<Destination> {
        self.state.read().await.destinations.clone()
    }

    pub async fn offers_by_type(&self) -> OffersByType {
        self.state.read().await.offers.clone()
    }

    pub async fn is_load_failed(&self) -> bool {
        self.state.read().await.load_failed
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            points: state.points.clone(),
            destinations: state.destinations.clone(),
            offers: state.offers.clone(),
            load_failed: state.load_failed,
        }
    }

    /// Load points, destinations and offers concurrently.
    ///
    /// If any of the three fetches fails, all three collections are left
    /// empty and the load-failed flag is set. An `Init` signal is emitted
    /// either way.
    pub async fn init(&self) {
        let fetched = tokio::try_join!(
            self.api.fetch_points(),
            self.api.fetch_destinations(),
            self.api.fetch_offers(),
        );

        let mut state = self.state.write().await;
        match fetched {
            Ok((points, destinations, offer_groups)) => {
                tracing::info!(
                    points = points.len(),
                    destinations = destinations.len(),
                    offer_groups = offer_groups.len(),
                    "Trip data loaded",
                );
                *state = StoreState {
                    points,
                    destinations,
                    offers: OffersByType::from(offer_groups),
                    load_failed: false,
                };
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load trip data");
                *state = StoreState {
                    load_failed: true,
                    ..StoreState::default()
                };
            }
        }
        self.bus.publish(UpdateScope::Init, StoreChange::Loaded);
    }

    /// Replace a point with the backend's stored version. Emits `Patch`.
    pub async fn update_point(&self, point: &Point) -> Result<Point, StoreError> {
        self.ensure_present(&point.id).await?;

        let saved = self.api.update_point(point).await?;

        let mut state = self.state.write().await;
        let slot = state
            .points
            .iter_mut()
            .find(|p| p.id == point.id)
            .ok_or_else(|| StoreError::NotFound(point.id.clone()))?;
        *slot = saved.clone();
        self.bus
            .publish(UpdateScope::Patch, StoreChange::Updated(saved.clone()));

        tracing::info!(point_id = %saved.id, "Point updated");
        Ok(saved)
    }

    /// Create a point and prepend it to the collection. Emits `Major`.
    pub async fn add_point(&self, draft: &PointDraft) -> Result<Point, StoreError> {
        let created = self.api.create_point(draft).await?;

        let mut state = self.state.write().await;
        state.points.insert(0, created.clone());
        self.bus
            .publish(UpdateScope::Major, StoreChange::Added(created.clone()));

        tracing::info!(point_id = %created.id, "Point added");
        Ok(created)
    }

    /// Delete a point. Emits `Major`.
    pub async fn delete_point(&self, point: &Point) -> Result<(), StoreError> {
        self.ensure_present(&point.id).await?;

        self.api.delete_point(&point.id).await?;

        let mut state = self.state.write().await;
        let index = state
            .points
            .iter()
            .position(|p| p.id == point.id)
            .ok_or_else(|| StoreError::NotFound(point.id.clone()))?;
        state.points.remove(index);
        self.bus
            .publish(UpdateScope::Major, StoreChange::Deleted(point.id.clone()));

        tracing::info!(point_id = %point.id, "Point deleted");
        Ok(())
    }

    async fn ensure_present(&self, id: &PointId) -> Result<(), StoreError> {
        let state = self.state.read().await;
        if state.points.iter().any(|p| &p.id == id) {
            Ok(())
        } else {
            tracing::warn!(point_id = %id, "Command for a point missing from the store");
            Err(StoreError::NotFound(id.clone()))
        }
    }
}
