//! Trip points and the immutable reference data they point into.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DestinationId, OfferId, PointId, Timestamp};

// ---------------------------------------------------------------------------
// Point type
// ---------------------------------------------------------------------------

/// Travel or activity category of a point.
///
/// Offers are partitioned by this value, so changing it invalidates any
/// offers already selected on a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointType {
    Taxi,
    Bus,
    Train,
    Ship,
    Drive,
    Flight,
    CheckIn,
    Sightseeing,
    Restaurant,
}

impl PointType {
    /// Every category, in the order the type picker lists them.
    pub const ALL: [PointType; 9] = [
        PointType::Taxi,
        PointType::Bus,
        PointType::Train,
        PointType::Ship,
        PointType::Drive,
        PointType::Flight,
        PointType::CheckIn,
        PointType::Sightseeing,
        PointType::Restaurant,
    ];

    /// Wire name of the category, e.g. `"check-in"`.
    pub fn as_str(self) -> &'static str {
        match self {
            PointType::Taxi => "taxi",
            PointType::Bus => "bus",
            PointType::Train => "train",
            PointType::Ship => "ship",
            PointType::Drive => "drive",
            PointType::Flight => "flight",
            PointType::CheckIn => "check-in",
            PointType::Sightseeing => "sightseeing",
            PointType::Restaurant => "restaurant",
        }
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A committed trip leg as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub id: PointId,
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub destination: Option<DestinationId>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    pub base_price: u32,
    pub is_favorite: bool,
    pub offers: Vec<OfferId>,
}

impl Point {
    /// Time spent on this leg, if both ends are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) => Some(to - from),
            _ => None,
        }
    }

    /// Copy of this point with the favorite flag flipped.
    pub fn with_favorite_toggled(&self) -> Point {
        Point {
            is_favorite: !self.is_favorite,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A picture attached to a destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub src: String,
    pub description: String,
}

/// A place a point can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

/// Optional add-on with its own price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    pub price: u32,
}

/// Offers available for one point type, as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferGroup {
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub offers: Vec<Offer>,
}

/// Offers indexed by the point type they apply to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OffersByType(HashMap<PointType, Vec<Offer>>);

impl OffersByType {
    /// Offers for `point_type`; empty when the type has none.
    pub fn offers_for(&self, point_type: PointType) -> &[Offer] {
        self.0.get(&point_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a single offer of `point_type` by id.
    pub fn find(&self, point_type: PointType, offer_id: &OfferId) -> Option<&Offer> {
        self.offers_for(point_type)
            .iter()
            .find(|offer| &offer.id == offer_id)
    }

    /// Returns `true` if `offer_id` is available for `point_type`.
    pub fn contains(&self, point_type: PointType, offer_id: &OfferId) -> bool {
        self.find(point_type, offer_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<OfferGroup>> for OffersByType {
    fn from(groups: Vec<OfferGroup>) -> Self {
        let mut map: HashMap<PointType, Vec<Offer>> = HashMap::new();
        for group in groups {
            map.entry(group.point_type).or_default().extend(group.offers);
        }
        Self(map)
    }
}

/// Find a destination by id.
pub fn find_destination<'a>(
    destinations: &'a [Destination],
    id: &DestinationId,
) -> Option<&'a Destination> {
    destinations.iter().find(|d| &d.id == id)
}
