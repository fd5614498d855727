//! Domain model and pure projection logic for the trip board.
//!
//! Everything in this crate is synchronous and free of I/O so that the
//! store, the controllers and the remote adapter can all share the same
//! point model, filter/sort rules and edit-form invariants.

pub mod clock;
pub mod draft;
pub mod error;
pub mod filter;
pub mod point;
pub mod projection;
pub mod sort;
pub mod trip_info;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use draft::PointDraft;
pub use error::CoreError;
pub use filter::{FilterKind, FilterTab};
pub use point::{Destination, Offer, OfferGroup, OffersByType, Picture, Point, PointType};
pub use projection::project;
pub use sort::SortKind;
pub use trip_info::TripSummary;
pub use types::{DestinationId, OfferId, PointId, Timestamp};
