use async_trait::async_trait;
use tripboard_core::{Destination, OfferGroup, Point, PointDraft, PointId};

/// Errors from the remote sync layer.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend answered with data the adapter cannot translate.
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// CRUD contract between the board and its backend.
///
/// Implementations translate between wire DTOs and domain types; callers
/// never see field naming conventions. A failed call must not leave any
/// partial state on the caller's side, so every method either returns the
/// complete result or an error.
#[async_trait]
pub trait PointsApi: Send + Sync {
    async fn fetch_points(&self) -> Result<Vec<Point>, RemoteError>;

    async fn fetch_destinations(&self) -> Result<Vec<Destination>, RemoteError>;

    async fn fetch_offers(&self) -> Result<Vec<OfferGroup>, RemoteError>;

    /// Persist a new point. The backend assigns the id.
    async fn create_point(&self, draft: &PointDraft) -> Result<Point, RemoteError>;

    /// Replace an existing point, returning the stored version.
    async fn update_point(&self, point: &Point) -> Result<Point, RemoteError>;

    async fn delete_point(&self, id: &PointId) -> Result<(), RemoteError>;
}
