//! The notification bridge: couples the BLE notification stream to the
//! serial host protocol.
//!
//! `Bridge` owns everything the two outside event sources share - the
//! operating mode, the accumulate buffer, and the one-shot start flag.
//! Both sources (BLE notifications and host command bytes) must be
//! funneled through one consumer of this struct; the firmware does that
//! with a single input queue owned by the bridge task.

use crate::bridge::buffer::BridgeBuffer;
use crate::config;
use crate::serial::frame;

/// What happens to an inbound notification payload.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeMode {
    /// Frame and transmit each payload as it arrives.
    Forward,
    /// Append payloads to the buffer until the host asks for a flush.
    Accumulate,
}

/// Result of feeding one host byte through the command gate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateEffect {
    /// Unknown command byte, or a repeated START: nothing to do.
    None,
    /// First START seen; the scan/connect sequence may begin.
    ReleaseStart,
    /// SEND_DATA: a frame of `len` bytes was written out.
    Flush { len: usize },
}

pub struct Bridge<const CAP: usize> {
    mode: BridgeMode,
    buffer: BridgeBuffer<CAP>,
    started: bool,
}

impl<const CAP: usize> Bridge<CAP> {
    /// Boots in `Forward` mode with the start gate closed; the first
    /// START command opens the gate and switches to `Accumulate`.
    pub const fn new() -> Self {
        Self {
            mode: BridgeMode::Forward,
            buffer: BridgeBuffer::new(),
            started: false,
        }
    }

    pub fn mode(&self) -> BridgeMode {
        self.mode
    }

    /// Bytes currently held for the next flush.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed one notification payload. In `Forward` mode the framed
    /// message is written to `out` and its length returned; in
    /// `Accumulate` mode the payload goes to the buffer (truncating
    /// silently at capacity) and 0 is returned. Zero-length payloads
    /// are the stack's unsubscribe marker, not data, and are dropped.
    pub fn on_notification(&mut self, payload: &[u8], out: &mut [u8]) -> usize {
        if payload.is_empty() {
            return 0;
        }
        match self.mode {
            BridgeMode::Forward => frame::encode(payload, out),
            BridgeMode::Accumulate => {
                let _ = self.buffer.extend_truncating(payload);
                0
            }
        }
    }

    /// Feed one host command byte. A flush frame, if any, is written to
    /// `out`. Unrecognized bytes are ignored without an answer.
    pub fn on_host_byte(&mut self, byte: u8, out: &mut [u8]) -> GateEffect {
        match byte {
            config::CMD_START => {
                self.mode = BridgeMode::Accumulate;
                if self.started {
                    GateEffect::None
                } else {
                    self.started = true;
                    GateEffect::ReleaseStart
                }
            }
            config::CMD_SEND_DATA => {
                // An empty buffer still answers with a terminator-only
                // frame, and the cursor reset is unconditional.
                let len = frame::encode(self.buffer.as_slice(), out);
                self.buffer.clear();
                GateEffect::Flush { len }
            }
            _ => GateEffect::None,
        }
    }

    /// Frame the subscription-up status byte. Status signalling goes
    /// straight to the wire regardless of mode.
    pub fn subscribed_frame(&self, out: &mut [u8]) -> usize {
        frame::encode(&[config::MSG_CONN_OK], out)
    }
}
