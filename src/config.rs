//! Application-wide constants and compile-time configuration.
//!
//! All protocol constants, timing parameters, and hardware pin
//! assignments live here so they can be tuned in one place.

// Target peripheral
//
// The GATT client macro in `ble::stream_client` needs the same two
// UUIDs as string literals; keep the byte arrays and the macro
// strings in sync.

/// Vendor stream service `12345678-1234-5678-1234-56789abcdef0` in
/// little-endian wire order, as it appears inside a 128-bit
/// service-UUID advertisement record.
pub const STREAM_SERVICE_UUID_LE: [u8; 16] = [
    0xf0, 0xde, 0xbc, 0x9a, 0x78, 0x56, 0x34, 0x12,
    0x78, 0x56, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12,
];

/// Stream characteristic `12345678-1234-5678-1234-56789abcdef1` in
/// little-endian wire order.
pub const STREAM_CHR_UUID_LE: [u8; 16] = [
    0xf1, 0xde, 0xbc, 0x9a, 0x78, 0x56, 0x34, 0x12,
    0x78, 0x56, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12,
];

/// Client Characteristic Configuration descriptor (Bluetooth SIG assigned).
pub const CCC_DESCRIPTOR_UUID: u16 = 0x2902;

// Serial protocol

/// Terminator byte appended to every message sent to the host. Payload
/// bytes equal to this value cannot be represented (no escaping).
pub const FRAME_TERMINATOR: u8 = 0x00;

/// Host command: release the start gate and switch to accumulate mode.
pub const CMD_START: u8 = 0x01;

/// Host command: flush the accumulated buffer and reset its cursor.
pub const CMD_SEND_DATA: u8 = 0x02;

/// Outbound status byte: BLE subscription is up, notifications will flow.
pub const MSG_CONN_OK: u8 = 0x03;

// Bridge sizing

/// Capacity of the accumulate-mode buffer (bytes).
pub const BRIDGE_BUFFER_CAPACITY: usize = 256;

/// Largest notification payload we accept (ATT MTU 247 minus the 3-byte
/// notification header).
pub const MAX_NOTIFICATION_LEN: usize = 244;

/// Largest framed message: a full buffer flush plus the terminator.
pub const MAX_FRAME_LEN: usize = BRIDGE_BUFFER_CAPACITY + 1;

/// Depth of the serialized bridge input queue (notifications, host bytes,
/// status markers all flow through it).
pub const BRIDGE_QUEUE_DEPTH: usize = 16;

// Link policy

/// Wait for the host's START command before the first scan. Set false to
/// start scanning unconditionally at boot.
pub const WAIT_FOR_START_COMMAND: bool = true;

/// Delay before scanning is restarted after a disconnect or failed
/// connect (ms). 0 = immediate rescan.
pub const RESCAN_DELAY_MS: u32 = 0;

// BLE connection parameters

/// Connection interval range (in 1.25 ms units). 24..40 = 30-50 ms.
pub const BLE_CONN_INTERVAL_MIN: u16 = 24;
pub const BLE_CONN_INTERVAL_MAX: u16 = 40;

/// Peripheral latency (connection events the peer may skip).
pub const BLE_PERIPHERAL_LATENCY: u16 = 0;

/// Supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// ATT MTU requested from the SoftDevice.
pub const BLE_ATT_MTU: u16 = 247;

/// GAP device name.
pub const BLE_DEVICE_NAME: &[u8] = b"bt2uart";

// UART (nRF52840-DK virtual COM port defaults)
//
//   TXD → P0.06
//   RXD → P0.08
//
// Actual `embassy_nrf::peripherals::*` pins are selected in `main.rs`;
// adjust for your custom PCB. Baud rate is fixed at 115200 8N1.
