//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Central** role:
//!
//! 1. **Advertisement Filter** - inspects raw advertising payloads for
//!    the vendor stream service UUID.
//! 2. **Link Supervisor** - the connection lifecycle state machine.
//!    Pure logic, no SoftDevice types, host-testable.
//! 3. **Stream Client** - performs GATT service/characteristic discovery
//!    on a connected peripheral and subscribes to stream notifications.
//! 4. **Central Driver** - executes the supervisor's actions against the
//!    SoftDevice and feeds milestones back in as events.
//!
//! Notification payloads leave this module through the bridge queue
//! defined in the crate root.

pub mod adv_filter;
pub mod central;
pub mod link;
pub mod stream_client;

use defmt::Format;

/// Lightweight error tag for log output (no dynamic alloc).
#[derive(Clone, Copy, Format)]
pub enum BleErrorTag {
    ScanFailed,
    StreamServiceNotFound,
    SubscribeFailed,
}
