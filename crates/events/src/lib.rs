//! Change-signal infrastructure for the trip board.
//!
//! - [`SignalBus`]: typed in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`Signal`] / [`UpdateScope`]: the change envelope every store emits.
//! - [`SignalReceiver`]: subscription handle with blocking and draining reads.

pub mod bus;

pub use bus::{Received, Signal, SignalBus, SignalReceiver, UpdateScope};
