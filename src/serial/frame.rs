//! Host-link framing.
//!
//! Every message to the host is the raw payload followed by one
//! terminator byte. No length prefix, no escaping: a payload byte equal
//! to the terminator cannot be represented and a receiver will read it
//! as end-of-message.

use crate::config;

/// Frame `payload` into `out` and return the total length written.
/// Returns 0 if `out` cannot hold payload + terminator.
pub fn encode(payload: &[u8], out: &mut [u8]) -> usize {
    let total = payload.len() + 1;
    if out.len() < total {
        return 0;
    }
    out[..payload.len()].copy_from_slice(payload);
    out[payload.len()] = config::FRAME_TERMINATOR;
    total
}
