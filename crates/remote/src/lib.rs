//! Remote sync adapter for the trip board backend.
//!
//! The board core only sees the [`PointsApi`] trait and the domain types
//! from `tripboard-core`. Wire naming ([`dto::PointDto`]) and HTTP details
//! ([`HttpPointsApi`]) stay inside this crate.

pub mod api;
pub mod dto;
pub mod http;

pub use api::{PointsApi, RemoteError};
pub use dto::PointDto;
pub use http::HttpPointsApi;
