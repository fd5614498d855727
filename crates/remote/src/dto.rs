//! Wire representation of a point.
//!
//! The backend uses snake_case field names (`base_price`, `date_from`,
//! `is_favorite`) and some deployments send the price as a string. Both
//! directions are handled here so the rest of the workspace only sees
//! [`Point`] and [`PointDraft`].

use serde::{Deserialize, Deserializer, Serialize};
use tripboard_core::{DestinationId, OfferId, Point, PointDraft, PointId, PointType, Timestamp};

use crate::api::RemoteError;

/// A point as sent to and received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDto {
    /// Omitted when creating a point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub destination: Option<String>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    #[serde(deserialize_with = "price_from_number_or_string")]
    pub base_price: u32,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub offers: Vec<String>,
}

impl PointDto {
    /// Body for a create request. Any local id is dropped.
    pub fn from_draft(draft: &PointDraft) -> Self {
        Self {
            id: None,
            point_type: draft.point_type,
            destination: draft.destination.as_ref().map(|d| d.to_string()),
            date_from: draft.date_from,
            date_to: draft.date_to,
            base_price: draft.base_price,
            is_favorite: draft.is_favorite,
            offers: draft.offers.iter().map(|o| o.to_string()).collect(),
        }
    }

    /// Translate into the domain model. The backend must have assigned an id.
    pub fn into_point(self) -> Result<Point, RemoteError> {
        let id = self
            .id
            .ok_or_else(|| RemoteError::Decode("point without id".to_string()))?;

        Ok(Point {
            id: PointId::new(id),
            point_type: self.point_type,
            destination: self.destination.map(DestinationId::new),
            date_from: self.date_from,
            date_to: self.date_to,
            base_price: self.base_price,
            is_favorite: self.is_favorite,
            offers: self.offers.into_iter().map(OfferId::new).collect(),
        })
    }
}

impl From<&Point> for PointDto {
    fn from(point: &Point) -> Self {
        Self {
            id: Some(point.id.to_string()),
            point_type: point.point_type,
            destination: point.destination.as_ref().map(|d| d.to_string()),
            date_from: point.date_from,
            date_to: point.date_to,
            base_price: point.base_price,
            is_favorite: point.is_favorite,
            offers: point.offers.iter().map(|o| o.to_string()).collect(),
        }
    }
}

fn price_from_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(u32),
        Text(String),
    }

    match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(n) => Ok(n),
        RawPrice::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_backend_field_names() {
        let dto: PointDto = serde_json::from_value(json!({
            "id": "p1",
            "type": "check-in",
            "destination": "d1",
            "date_from": "2024-01-05T10:00:00Z",
            "date_to": "2024-01-05T12:00:00Z",
            "base_price": 120,
            "is_favorite": true,
            "offers": ["o1", "o2"]
        }))
        .unwrap();

        let point = dto.into_point().unwrap();
        assert_eq!(point.id, PointId::new("p1"));
        assert_eq!(point.point_type, PointType::CheckIn);
        assert_eq!(point.base_price, 120);
        assert!(point.is_favorite);
        assert_eq!(point.offers, vec![OfferId::new("o1"), OfferId::new("o2")]);
        assert_eq!(
            point.date_from,
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn accepts_price_as_string() {
        let dto: PointDto = serde_json::from_value(json!({
            "id": "p1",
            "type": "bus",
            "destination": null,
            "date_from": null,
            "date_to": null,
            "base_price": " 45 ",
        }))
        .unwrap();
        assert_eq!(dto.base_price, 45);
        assert!(dto.offers.is_empty());
    }

    #[test]
    fn create_body_has_no_id_and_snake_case_fields() {
        let mut draft = PointDraft::blank();
        draft.id = Some(PointId::new("local-1"));
        draft.base_price = 30;

        let body = serde_json::to_value(PointDto::from_draft(&draft)).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["base_price"], 30);
        assert_eq!(body["is_favorite"], false);
        assert_eq!(body["type"], "flight");
        assert!(body.get("basePrice").is_none());
    }

    #[test]
    fn response_without_id_is_rejected() {
        let dto = PointDto::from_draft(&PointDraft::blank());
        assert!(matches!(dto.into_point(), Err(RemoteError::Decode(_))));
    }
}
