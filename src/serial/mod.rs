//! Serial host link.
//!
//! The host side of the bridge: a UARTE peripheral carrying
//! terminator-framed payloads outward and single-byte commands inward.

pub mod frame;
pub mod uart;
