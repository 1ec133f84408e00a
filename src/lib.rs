//! Host-testable library interface for bt2uart.
//!
//! This module re-exports the pure logic modules that can be tested
//! on the host (no embedded hardware required): the link supervisor,
//! the notification bridge, the advertisement filter, and the serial
//! framing.
//!
//! Usage: `cargo test` or `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].
//! This lib.rs provides a separate entry point for host-based testing.

#![cfg_attr(not(test), no_std)]

pub mod config;

// Internal module paths for the actual implementations
#[path = "ble/adv_filter.rs"]
mod ble_adv_filter_impl;
#[path = "ble/link.rs"]
mod ble_link_impl;

#[path = "bridge/buffer.rs"]
mod bridge_buffer_impl;
#[path = "bridge/engine.rs"]
mod bridge_engine_impl;

#[path = "serial/frame.rs"]
mod serial_frame_impl;

// ═══════════════════════════════════════════════════════════════════════════
// Module Re-exports (paths mirror the embedded binary's module tree)
// ═══════════════════════════════════════════════════════════════════════════

pub mod ble {
    pub mod adv_filter {
        pub use crate::ble_adv_filter_impl::*;
    }
    pub mod link {
        pub use crate::ble_link_impl::*;
    }

    pub use link::{LinkAction, LinkEvent, LinkState, LinkSupervisor};
}

pub mod bridge {
    pub mod buffer {
        pub use crate::bridge_buffer_impl::*;
    }
    pub mod engine {
        pub use crate::bridge_engine_impl::*;
    }

    pub use buffer::BridgeBuffer;
    pub use engine::{Bridge, BridgeMode, GateEffect};
}

pub mod serial {
    pub mod frame {
        pub use crate::serial_frame_impl::*;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
