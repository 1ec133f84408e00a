//! Notification bridge between the BLE stream and the serial host.
//!
//! The bridge owns the buffered/forward policy for notification
//! payloads and interprets the host's single-byte commands. All three
//! event sources (notifications, host bytes, subscription status) are
//! funnelled through one [`BridgeInput`] queue, so a single task applies
//! them to the state in arrival order.

pub mod buffer;
pub mod engine;

pub use buffer::BridgeBuffer;
pub use engine::{Bridge, BridgeMode, GateEffect};

use crate::config::MAX_NOTIFICATION_LEN;
use defmt::Format;
use heapless::Vec;

/// One unit of work for the bridge task.
#[derive(Clone, Format)]
pub enum BridgeInput {
    /// Notification payload received from the stream peripheral.
    Notification(Vec<u8, MAX_NOTIFICATION_LEN>),
    /// One raw byte read from the host UART.
    HostByte(u8),
    /// The stream subscription came up; the host gets told.
    Subscribed,
}
