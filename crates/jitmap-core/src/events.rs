//! Bridge event types and helpers.
//!
//! Embedders that want to observe image lifecycle changes (for diagnostics or
//! to keep their own indexes in sync) attach a sender to the listener and
//! drain the receiver at their own pace. Sending never blocks and a dropped
//! receiver is ignored.

use std::sync::mpsc;

use crate::symbols::ImageKey;
use crate::types::Address;

/// Event emitted by a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent
{
    /// An offset-mapping table was handed to the engine.
    BoundariesReported
    {
        /// Start of the function the table describes.
        function: Address,
        /// Number of records delivered.
        count: usize,
    },
    /// An image finished registration.
    ObjectEmitted
    {
        /// Raw key of the executed image.
        key: ImageKey,
        /// Number of functions recorded for it.
        functions: usize,
    },
    /// An image was released.
    ObjectFreed
    {
        /// Raw key of the executed image.
        key: ImageKey,
        /// Number of functions that were recorded for it.
        functions: usize,
    },
}

impl BridgeEvent
{
    /// Human-readable description of the event.
    #[must_use]
    pub fn describe(&self) -> String
    {
        match self {
            Self::BoundariesReported { function, count } => {
                format!("Reported {count} offset mappings for {function}")
            }
            Self::ObjectEmitted { key, functions } => format!("Registered {key} with {functions} functions"),
            Self::ObjectFreed { key, functions } => format!("Released {key} and its {functions} functions"),
        }
    }
}

/// Sender side of the bridge event channel.
pub type BridgeEventSender = mpsc::Sender<BridgeEvent>;
/// Receiver side of the bridge event channel.
pub type BridgeEventReceiver = mpsc::Receiver<BridgeEvent>;

/// Create a new bridge event channel.
#[must_use]
pub fn event_channel() -> (BridgeEventSender, BridgeEventReceiver)
{
    mpsc::channel()
}
