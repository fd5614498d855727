//! Reactive board-and-item controller for the trip board.
//!
//! - [`store::PointsStore`]: observable owner of the point collection and
//!   reference data; every mutation goes remote first, then local, then
//!   emits exactly one signal.
//! - [`filter_store::FilterStore`]: active filter plus the instant filters
//!   are evaluated at.
//! - [`blocker::UiBlocker`]: gate serializing mutating commands, with a
//!   delayed lock indicator.
//! - [`keys::KeyCaptureRegistry`]: scoped Escape-key captures.
//! - [`item::ItemController`]: per-point display/edit state machine.
//! - [`board::BoardController`]: list reconciliation, the create overlay
//!   and command dispatch.

pub mod blocker;
pub mod board;
pub mod config;
pub mod error;
pub mod filter_store;
pub mod item;
pub mod keys;
pub mod overlay;
pub mod store;

pub use blocker::{BlockGuard, BlockerConfig, LockIndicator, UiBlocker};
pub use board::{BoardController, BoardSnapshot, DraftTarget, EmptyState};
pub use config::{BoardConfig, ConfigError};
pub use error::{BoardError, StoreError};
pub use filter_store::FilterStore;
pub use item::{BusyState, ItemController, ItemView};
pub use keys::{CaptureOwner, KeyCapture, KeyCaptureRegistry};
pub use overlay::{CreateOverlay, OverlayView};
pub use store::{PointsStore, StoreChange, StoreSnapshot};
