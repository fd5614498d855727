//! REST client for the trip backend.
//!
//! Wraps the backend's HTTP endpoints using [`reqwest`]:
//!
//! | Operation           | Request                    |
//! |---------------------|----------------------------|
//! | fetch points        | `GET {base}/points`        |
//! | fetch destinations  | `GET {base}/destinations`  |
//! | fetch offers        | `GET {base}/offers`        |
//! | create point        | `POST {base}/points`       |
//! | update point        | `PUT {base}/points/{id}`   |
//! | delete point        | `DELETE {base}/points/{id}`|
//!
//! Every request carries the configured `Authorization` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};
use tripboard_core::{Destination, OfferGroup, Point, PointDraft, PointId};

use crate::api::{PointsApi, RemoteError};
use crate::dto::PointDto;

/// HTTP client for a single backend.
pub struct HttpPointsApi {
    client: reqwest::Client,
    base_url: String,
    authorization: String,
}

impl HttpPointsApi {
    /// Create a client for `base_url` (e.g. `https://host/big-trip`).
    ///
    /// Requests that take longer than `timeout` fail with
    /// [`RemoteError::Request`].
    pub fn new(
        base_url: impl Into<String>,
        authorization: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, authorization))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        authorization: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            authorization: authorization.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "Backend request");
        self.client
            .request(method, format!("{}/{}", self.base_url, path))
            .header(AUTHORIZATION, &self.authorization)
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`RemoteError::Status`] carrying the
    /// status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "Backend returned an error");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Send `request` and parse a successful JSON response body.
    async fn send_json<T: serde::de::DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = Self::ensure_success(request.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PointsApi for HttpPointsApi {
    async fn fetch_points(&self) -> Result<Vec<Point>, RemoteError> {
        let dtos: Vec<PointDto> = Self::send_json(self.request(Method::GET, "points")).await?;
        dtos.into_iter().map(PointDto::into_point).collect()
    }

    async fn fetch_destinations(&self) -> Result<Vec<Destination>, RemoteError> {
        Self::send_json(self.request(Method::GET, "destinations")).await
    }

    async fn fetch_offers(&self) -> Result<Vec<OfferGroup>, RemoteError> {
        Self::send_json(self.request(Method::GET, "offers")).await
    }

    async fn create_point(&self, draft: &PointDraft) -> Result<Point, RemoteError> {
        let body = PointDto::from_draft(draft);
        let created: PointDto =
            Self::send_json(self.request(Method::POST, "points").json(&body)).await?;
        created.into_point()
    }

    async fn update_point(&self, point: &Point) -> Result<Point, RemoteError> {
        let body = PointDto::from(point);
        let path = format!("points/{}", point.id);
        let updated: PointDto = Self::send_json(self.request(Method::PUT, &path).json(&body)).await?;
        updated.into_point()
    }

    async fn delete_point(&self, id: &PointId) -> Result<(), RemoteError> {
        let path = format!("points/{id}");
        let response = self.request(Method::DELETE, &path).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
