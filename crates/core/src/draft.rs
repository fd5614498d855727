//! Edit-form state for a point being created or edited.
//!
//! A [`PointDraft`] may be transiently invalid (missing destination, end
//! before start) while the user types. [`PointDraft::validate`] is the gate
//! before a draft is sent anywhere.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::point::{Destination, OffersByType, Point, PointType};
use crate::types::{DestinationId, OfferId, PointId, Timestamp};

/// Type preselected in a blank draft.
pub const DEFAULT_DRAFT_TYPE: PointType = PointType::Flight;

/// Mutable working copy of a point inside the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDraft {
    /// `None` until the backend assigns an id.
    pub id: Option<PointId>,
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub destination: Option<DestinationId>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    pub base_price: u32,
    pub is_favorite: bool,
    pub offers: Vec<OfferId>,
}

impl PointDraft {
    /// An empty draft for the "new point" form.
    pub fn blank() -> Self {
        Self {
            id: None,
            point_type: DEFAULT_DRAFT_TYPE,
            destination: None,
            date_from: None,
            date_to: None,
            base_price: 0,
            is_favorite: false,
            offers: Vec::new(),
        }
    }

    /// Working copy of an existing point.
    pub fn from_point(point: &Point) -> Self {
        Self {
            id: Some(point.id.clone()),
            point_type: point.point_type,
            destination: point.destination.clone(),
            date_from: point.date_from,
            date_to: point.date_to,
            base_price: point.base_price,
            is_favorite: point.is_favorite,
            offers: point.offers.clone(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Change the point type. Selected offers belong to the old type, so
    /// they are always cleared, even when the type is unchanged.
    pub fn set_type(&mut self, point_type: PointType) {
        self.point_type = point_type;
        self.offers.clear();
    }

    /// Select or deselect an offer of the current type.
    ///
    /// Offers that do not belong to the current type are rejected.
    pub fn toggle_offer(&mut self, offer_id: &OfferId, offers: &OffersByType) -> Result<(), CoreError> {
        if !offers.contains(self.point_type, offer_id) {
            return Err(CoreError::Validation(format!(
                "Offer '{offer_id}' is not available for type '{}'",
                self.point_type
            )));
        }

        if let Some(pos) = self.offers.iter().position(|id| id == offer_id) {
            self.offers.remove(pos);
        } else {
            self.offers.push(offer_id.clone());
        }
        Ok(())
    }

    /// Pick a destination by its display name. An unknown name clears the
    /// selection so the form cannot be submitted with stale data.
    pub fn set_destination_by_name(&mut self, name: &str, destinations: &[Destination]) {
        let name = name.trim();
        self.destination = destinations
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.id.clone());
    }

    pub fn set_dates(&mut self, date_from: Option<Timestamp>, date_to: Option<Timestamp>) {
        self.date_from = date_from;
        self.date_to = date_to;
    }

    pub fn set_price(&mut self, base_price: u32) {
        self.base_price = base_price;
    }

    /// Check that the draft can be committed.
    ///
    /// Requires a destination, both dates with `date_to >= date_from`, and
    /// every selected offer to belong to the current type.
    pub fn validate(&self, offers: &OffersByType) -> Result<(), CoreError> {
        if self.destination.is_none() {
            return Err(CoreError::Validation("destination is required".to_string()));
        }

        let (Some(from), Some(to)) = (self.date_from, self.date_to) else {
            return Err(CoreError::Validation(
                "both start and end dates are required".to_string(),
            ));
        };
        if to < from {
            return Err(CoreError::Validation(format!(
                "end date {to} is before start date {from}"
            )));
        }

        if let Some(stray) = self
            .offers
            .iter()
            .find(|id| !offers.contains(self.point_type, id))
        {
            return Err(CoreError::Validation(format!(
                "Offer '{stray}' is not available for type '{}'",
                self.point_type
            )));
        }

        Ok(())
    }

    /// Convert a draft of an existing point back into a [`Point`].
    pub fn to_point(&self) -> Result<Point, CoreError> {
        let id = self
            .id
            .clone()
            .ok_or_else(|| CoreError::Internal("draft has no id yet".to_string()))?;

        Ok(Point {
            id,
            point_type: self.point_type,
            destination: self.destination.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
            base_price: self.base_price,
            is_favorite: self.is_favorite,
            offers: self.offers.clone(),
        })
    }
}

impl Default for PointDraft {
    fn default() -> Self {
        Self::blank()
    }
}
